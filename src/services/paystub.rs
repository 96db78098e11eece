// src/services/paystub.rs
//
// Paystub aggregation. A paystub is the derived sum of sale invoices,
// overrides, and expenses sharing one (agent, vendor, issue date) key; it is
// never stored as a row of its own until a payroll snapshot commits it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::errors::{AppError, AppResult};
use crate::models::{Expense, Override, PaystubDetail, PaystubSummary, SaleInvoice};
use crate::repos::{EmployeeRepo, LedgerFilter, LedgerRepo, VendorRepo};
use crate::services::access::{ANY_AGENT_ID, AccessScope};

/// Label shown when a referenced agent or vendor no longer resolves. Rows
/// with dangling references stay in the listing rather than hiding money.
pub const UNKNOWN_LABEL: &str = "(unknown)";

#[derive(Debug, Clone, Default)]
pub struct PaystubFilters {
    pub issue_date: Option<NaiveDate>,
    pub vendor_id: Option<i64>,
    pub agent_ids: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PaystubKey {
    agent_id: i64,
    vendor_id: i64,
    issue_date: NaiveDate,
}

#[derive(Default)]
struct KeyTotals {
    invoice_sum: Decimal,
    override_sum: Decimal,
    expense_sum: Decimal,
    weekending_date: Option<NaiveDate>,
    modified_by: Option<String>,
    modified_at: Option<DateTime<Utc>>,
}

impl KeyTotals {
    fn total(&self) -> Decimal {
        self.invoice_sum + self.override_sum + self.expense_sum
    }
}

pub struct PaystubService<'a> {
    employees: &'a dyn EmployeeRepo,
    vendors: &'a dyn VendorRepo,
    ledger: &'a dyn LedgerRepo,
}

impl<'a> PaystubService<'a> {
    pub fn new(
        employees: &'a dyn EmployeeRepo,
        vendors: &'a dyn VendorRepo,
        ledger: &'a dyn LedgerRepo,
    ) -> Self {
        Self {
            employees,
            vendors,
            ledger,
        }
    }

    /// Per-key totals over the three ledger tables, filtered by scope plus
    /// request filters (narrowing only), ordered by agent name then issue
    /// date descending. Read-only and idempotent against unchanged data.
    pub async fn list(
        &self,
        scope: &AccessScope,
        filters: &PaystubFilters,
    ) -> AppResult<Vec<PaystubSummary>> {
        let scope = scope.narrow_agents(&filters.agent_ids)?;
        let scope = match filters.vendor_id {
            Some(vendor_id) => scope.narrow_vendors(&[vendor_id])?,
            None => scope,
        };

        let explicitly_requested: BTreeSet<i64> = filters
            .agent_ids
            .iter()
            .copied()
            .filter(|id| *id != ANY_AGENT_ID)
            .collect();

        let filter = LedgerFilter {
            agent_ids: scope.agents.to_id_vec(),
            vendor_ids: scope.vendors.to_id_vec(),
            issue_date: filters.issue_date,
        };

        let invoices = self.ledger.invoices(&filter).await?;
        let overrides = self.ledger.overrides(&filter).await?;
        let expenses = self.ledger.expenses(&filter).await?;

        let totals = accumulate(&invoices, &overrides, &expenses);

        let agent_ids: Vec<i64> = totals
            .keys()
            .map(|k| k.agent_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let vendor_ids: Vec<i64> = totals
            .keys()
            .map(|k| k.vendor_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let agents: HashMap<i64, _> = self
            .employees
            .find_by_ids(&agent_ids)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();
        let vendors: HashMap<i64, _> = self
            .vendors
            .find_by_ids(&vendor_ids)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect();

        let mut rows = Vec::with_capacity(totals.len());
        for (key, t) in &totals {
            let agent = agents.get(&key.agent_id);

            // Hidden agents stay out of default listings; naming them
            // explicitly brings them back.
            if let Some(agent) = agent {
                if agent.hidden_payroll && !explicitly_requested.contains(&key.agent_id) {
                    continue;
                }
            }

            rows.push(PaystubSummary {
                agent_id: key.agent_id,
                agent_name: agent
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                vendor_id: key.vendor_id,
                vendor_name: vendors
                    .get(&key.vendor_id)
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                amount: t.total(),
                issue_date: key.issue_date,
                weekending_date: t.weekending_date,
                modified_by: t.modified_by.clone(),
            });
        }

        rows.sort_by(|a, b| {
            a.agent_name
                .cmp(&b.agent_name)
                .then_with(|| b.issue_date.cmp(&a.issue_date))
        });

        Ok(rows)
    }

    /// Full row detail plus edit resources for one paystub key. Scope is
    /// checked before any data read; a key with rows but a zero net total is
    /// a valid paystub, only a key with no rows at all is NotFound.
    pub async fn detail(
        &self,
        scope: &AccessScope,
        agent_id: i64,
        vendor_id: i64,
        issue_date: NaiveDate,
    ) -> AppResult<PaystubDetail> {
        validate_key_ids(agent_id, vendor_id)?;
        scope.ensure_agent(agent_id)?;
        scope.ensure_vendor(vendor_id)?;

        let filter = LedgerFilter::for_key(agent_id, vendor_id, issue_date);
        let invoices = self.ledger.invoices(&filter).await?;
        let overrides = self.ledger.overrides(&filter).await?;
        let expenses = self.ledger.expenses(&filter).await?;

        if invoices.is_empty() && overrides.is_empty() && expenses.is_empty() {
            return Err(AppError::NotFound(format!(
                "No paystub for agent {} / vendor {} / {}",
                agent_id, vendor_id, issue_date
            )));
        }

        let totals = accumulate(&invoices, &overrides, &expenses);
        let total: Decimal = totals.values().map(KeyTotals::total).sum();

        let available_vendors = self.vendors.list_active().await?;
        let available_issue_dates = self.ledger.issue_dates_for_agent(agent_id).await?;

        Ok(PaystubDetail {
            agent_id,
            vendor_id,
            issue_date,
            invoices,
            overrides,
            expenses,
            total,
            available_vendors,
            available_issue_dates,
        })
    }

    /// Pure existence probe for a key, used as the duplicate guard before a
    /// batch insert. No amounts are computed.
    pub async fn exists(
        &self,
        agent_id: i64,
        vendor_id: i64,
        issue_date: NaiveDate,
    ) -> AppResult<bool> {
        validate_key_ids(agent_id, vendor_id)?;
        self.ledger.key_exists(agent_id, vendor_id, issue_date).await
    }
}

fn validate_key_ids(agent_id: i64, vendor_id: i64) -> AppResult<()> {
    if agent_id <= 0 {
        return Err(AppError::Validation(format!(
            "Invalid agent id: {}",
            agent_id
        )));
    }
    if vendor_id <= 0 {
        return Err(AppError::Validation(format!(
            "Invalid vendor id: {}",
            vendor_id
        )));
    }
    Ok(())
}

// NULL amounts sum as zero. The weekending date and modified-by columns come
// off the invoice rows: latest weekending, most recently updated editor.
fn accumulate(
    invoices: &[SaleInvoice],
    overrides: &[Override],
    expenses: &[Expense],
) -> BTreeMap<PaystubKey, KeyTotals> {
    let mut totals: BTreeMap<PaystubKey, KeyTotals> = BTreeMap::new();

    for row in invoices {
        let entry = totals
            .entry(PaystubKey {
                agent_id: row.agent_id,
                vendor_id: row.vendor_id,
                issue_date: row.issue_date,
            })
            .or_default();
        entry.invoice_sum += row.amount.unwrap_or_default();
        if entry.weekending_date.is_none_or(|w| row.weekending_date > w) {
            entry.weekending_date = Some(row.weekending_date);
        }
        if entry.modified_at.is_none_or(|t| row.updated_at > t) {
            entry.modified_at = Some(row.updated_at);
            entry.modified_by = row.modified_by.clone();
        }
    }

    for row in overrides {
        let entry = totals
            .entry(PaystubKey {
                agent_id: row.agent_id,
                vendor_id: row.vendor_id,
                issue_date: row.issue_date,
            })
            .or_default();
        entry.override_sum += row.total.unwrap_or_default();
    }

    for row in expenses {
        let entry = totals
            .entry(PaystubKey {
                agent_id: row.agent_id,
                vendor_id: row.vendor_id,
                issue_date: row.issue_date,
            })
            .or_default();
        entry.expense_sum += row.amount.unwrap_or_default();
    }

    totals
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::models::EmployeeStatus;
    use crate::services::access::ScopeSet;
    use crate::testing::*;
    use rust_decimal_macros::dec;

    fn service<'a>(
        employees: &'a MemEmployeeRepo,
        vendors: &'a MemVendorRepo,
        ledger: &'a MemLedgerRepo,
    ) -> PaystubService<'a> {
        PaystubService::new(employees, vendors, ledger)
    }

    fn admin_scope() -> AccessScope {
        AccessScope {
            agents: ScopeSet::All,
            vendors: ScopeSet::All,
            is_admin: true,
        }
    }

    #[tokio::test]
    async fn detail_sums_invoices_overrides_and_expenses() {
        let employees = MemEmployeeRepo::new(vec![employee(7, "Gina")]);
        let vendors = MemVendorRepo::new(vec![vendor(3, "Acme Media")]);
        let ledger = MemLedgerRepo::new(
            vec![
                invoice(1, 7, 3, "2024-01-15", Some(dec!(60.00))),
                invoice(2, 7, 3, "2024-01-15", Some(dec!(40.00))),
            ],
            vec![override_row(1, 7, 3, "2024-01-15", Some(dec!(25.50)))],
            vec![expense(1, 7, 3, "2024-01-15", Some(dec!(-10.00)))],
        );

        let svc = service(&employees, &vendors, &ledger);
        let detail = svc
            .detail(&admin_scope(), 7, 3, date("2024-01-15"))
            .await
            .unwrap();

        assert_eq!(detail.total, dec!(115.50));
        assert_eq!(detail.invoices.len(), 2);
        assert_eq!(detail.overrides.len(), 1);
        assert_eq!(detail.expenses.len(), 1);
    }

    #[tokio::test]
    async fn missing_amounts_count_as_zero() {
        let employees = MemEmployeeRepo::new(vec![employee(7, "Gina")]);
        let vendors = MemVendorRepo::new(vec![vendor(3, "Acme Media")]);
        let ledger = MemLedgerRepo::new(
            vec![
                invoice(1, 7, 3, "2024-01-15", None),
                invoice(2, 7, 3, "2024-01-15", Some(dec!(50.00))),
            ],
            vec![override_row(1, 7, 3, "2024-01-15", None)],
            vec![expense(1, 7, 3, "2024-01-15", None)],
        );

        let svc = service(&employees, &vendors, &ledger);
        let detail = svc
            .detail(&admin_scope(), 7, 3, date("2024-01-15"))
            .await
            .unwrap();

        assert_eq!(detail.total, dec!(50.00));
    }

    #[tokio::test]
    async fn zero_total_key_exists_but_empty_key_is_not_found() {
        let employees = MemEmployeeRepo::new(vec![employee(7, "Gina")]);
        let vendors = MemVendorRepo::new(vec![vendor(3, "Acme Media")]);
        let ledger = MemLedgerRepo::new(
            vec![],
            vec![],
            vec![expense(1, 7, 3, "2024-01-15", Some(dec!(0.00)))],
        );

        let svc = service(&employees, &vendors, &ledger);

        let detail = svc
            .detail(&admin_scope(), 7, 3, date("2024-01-15"))
            .await
            .unwrap();
        assert_eq!(detail.total, dec!(0.00));

        let err = svc
            .detail(&admin_scope(), 7, 3, date("2024-02-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn existence_probe_matches_ledger_contents() {
        let employees = MemEmployeeRepo::new(vec![employee(7, "Gina")]);
        let vendors = MemVendorRepo::new(vec![vendor(3, "Acme Media")]);
        let ledger = MemLedgerRepo::new(
            vec![],
            vec![],
            vec![expense(1, 7, 3, "2024-01-15", Some(dec!(0.00)))],
        );

        let svc = service(&employees, &vendors, &ledger);
        assert!(svc.exists(7, 3, date("2024-01-15")).await.unwrap());
        assert!(!svc.exists(7, 3, date("2024-02-01")).await.unwrap());
    }

    #[tokio::test]
    async fn listing_is_idempotent_and_grouped_per_key() {
        let employees = MemEmployeeRepo::new(vec![employee(7, "Gina"), employee(8, "Hal")]);
        let vendors = MemVendorRepo::new(vec![vendor(3, "Acme Media")]);
        let ledger = MemLedgerRepo::new(
            vec![
                invoice(1, 7, 3, "2024-01-15", Some(dec!(100.00))),
                invoice(2, 7, 3, "2024-01-22", Some(dec!(75.00))),
                invoice(3, 8, 3, "2024-01-15", Some(dec!(30.00))),
            ],
            vec![override_row(1, 7, 3, "2024-01-15", Some(dec!(5.00)))],
            vec![],
        );

        let svc = service(&employees, &vendors, &ledger);
        let first = svc
            .list(&admin_scope(), &PaystubFilters::default())
            .await
            .unwrap();
        let second = svc
            .list(&admin_scope(), &PaystubFilters::default())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 3);

        let gina_jan15 = first
            .iter()
            .find(|r| r.agent_id == 7 && r.issue_date == date("2024-01-15"))
            .unwrap();
        assert_eq!(gina_jan15.amount, dec!(105.00));
    }

    #[tokio::test]
    async fn listing_orders_by_agent_name_then_issue_date_desc() {
        let employees = MemEmployeeRepo::new(vec![employee(2, "Zoe"), employee(1, "Abe")]);
        let vendors = MemVendorRepo::new(vec![vendor(3, "Acme Media")]);
        let ledger = MemLedgerRepo::new(
            vec![
                invoice(1, 2, 3, "2024-01-15", Some(dec!(10.00))),
                invoice(2, 1, 3, "2024-01-15", Some(dec!(10.00))),
                invoice(3, 1, 3, "2024-02-15", Some(dec!(10.00))),
            ],
            vec![],
            vec![],
        );

        let svc = service(&employees, &vendors, &ledger);
        let rows = svc
            .list(&admin_scope(), &PaystubFilters::default())
            .await
            .unwrap();

        let order: Vec<(String, NaiveDate)> = rows
            .iter()
            .map(|r| (r.agent_name.clone(), r.issue_date))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Abe".to_string(), date("2024-02-15")),
                ("Abe".to_string(), date("2024-01-15")),
                ("Zoe".to_string(), date("2024-01-15")),
            ]
        );
    }

    #[tokio::test]
    async fn unresolvable_references_keep_the_row_with_a_fallback_label() {
        let employees = MemEmployeeRepo::new(vec![]);
        let vendors = MemVendorRepo::new(vec![]);
        let ledger = MemLedgerRepo::new(
            vec![invoice(1, 999, 888, "2024-01-15", Some(dec!(42.00)))],
            vec![],
            vec![],
        );

        let svc = service(&employees, &vendors, &ledger);
        let rows = svc
            .list(&admin_scope(), &PaystubFilters::default())
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].agent_name, UNKNOWN_LABEL);
        assert_eq!(rows[0].vendor_name, UNKNOWN_LABEL);
        assert_eq!(rows[0].amount, dec!(42.00));
    }

    #[tokio::test]
    async fn hidden_agents_are_skipped_unless_requested_by_id() {
        let mut hidden = employee(7, "Gina");
        hidden.hidden_payroll = true;
        let employees = MemEmployeeRepo::new(vec![hidden, employee(8, "Hal")]);
        let vendors = MemVendorRepo::new(vec![vendor(3, "Acme Media")]);
        let ledger = MemLedgerRepo::new(
            vec![
                invoice(1, 7, 3, "2024-01-15", Some(dec!(100.00))),
                invoice(2, 8, 3, "2024-01-15", Some(dec!(30.00))),
            ],
            vec![],
            vec![],
        );

        let svc = service(&employees, &vendors, &ledger);

        let default_rows = svc
            .list(&admin_scope(), &PaystubFilters::default())
            .await
            .unwrap();
        assert_eq!(default_rows.len(), 1);
        assert_eq!(default_rows[0].agent_id, 8);

        let explicit = svc
            .list(
                &admin_scope(),
                &PaystubFilters {
                    agent_ids: vec![7],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(explicit.len(), 1);
        assert_eq!(explicit[0].agent_id, 7);
    }

    #[tokio::test]
    async fn manager_listing_with_unrelated_agent_is_denied() {
        let employees = MemEmployeeRepo::new(vec![
            manager(1, "Morgan"),
            employee(2, "Ana"),
            employee(9, "Rex"),
        ]);
        employees.assign(1, 2);
        let vendors = MemVendorRepo::new(vec![vendor(3, "Acme Media")]);
        let ledger = MemLedgerRepo::new(
            vec![invoice(1, 2, 3, "2024-01-15", Some(dec!(10.00)))],
            vec![],
            vec![],
        );

        let resolver = crate::services::access::AccessResolver::new(&employees);
        let scope = resolver.resolve(1).await.unwrap();

        let svc = service(&employees, &vendors, &ledger);
        let err = svc
            .list(
                &scope,
                &PaystubFilters {
                    agent_ids: vec![2, 9],
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn detail_checks_scope_before_reading_data() {
        let employees = MemEmployeeRepo::new(vec![employee(4, "Dana"), employee(5, "Eli")]);
        let vendors = MemVendorRepo::new(vec![vendor(3, "Acme Media")]);
        let ledger = MemLedgerRepo::new(
            vec![invoice(1, 5, 3, "2024-01-15", Some(dec!(10.00)))],
            vec![],
            vec![],
        );

        let resolver = crate::services::access::AccessResolver::new(&employees);
        let scope = resolver.resolve(4).await.unwrap();

        let svc = service(&employees, &vendors, &ledger);
        let err = svc
            .detail(&scope, 5, 3, date("2024-01-15"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn soft_deleted_agent_name_still_resolves_in_listing() {
        let mut gone = employee(7, "Gina");
        gone.status = EmployeeStatus::Deleted;
        let employees = MemEmployeeRepo::new(vec![gone]);
        let vendors = MemVendorRepo::new(vec![vendor(3, "Acme Media")]);
        let ledger = MemLedgerRepo::new(
            vec![invoice(1, 7, 3, "2024-01-15", Some(dec!(10.00)))],
            vec![],
            vec![],
        );

        let svc = service(&employees, &vendors, &ledger);
        let rows = svc
            .list(&admin_scope(), &PaystubFilters::default())
            .await
            .unwrap();
        assert_eq!(rows[0].agent_name, "Gina");
    }

    #[tokio::test]
    async fn detail_rejects_sentinel_and_nonsense_ids() {
        let employees = MemEmployeeRepo::new(vec![]);
        let vendors = MemVendorRepo::new(vec![]);
        let ledger = MemLedgerRepo::new(vec![], vec![], vec![]);

        let svc = service(&employees, &vendors, &ledger);
        let err = svc
            .detail(&admin_scope(), ANY_AGENT_ID, 3, date("2024-01-15"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
