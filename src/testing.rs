// src/testing.rs
//
// In-memory repository fakes and row builders for unit tests. The fakes
// mirror the filtering semantics of the Postgres implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::errors::AppResult;
use crate::models::{Employee, EmployeeStatus, Expense, Override, SaleInvoice, Vendor};
use crate::repos::{EmployeeRepo, LedgerFilter, LedgerRepo, VendorRepo};

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("test date literal")
}

fn ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

// ─── Row builders ─────────────────────────────────────────────────────────────

pub fn employee(id: i64, name: &str) -> Employee {
    Employee {
        id,
        name: name.to_string(),
        email: format!("{}@agency.test", name.to_lowercase()),
        password_hash: String::new(),
        is_active: true,
        is_admin: false,
        is_manager: false,
        sales_id1: None,
        sales_id2: None,
        sales_id3: None,
        hidden_payroll: false,
        status: EmployeeStatus::Active,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub fn manager(id: i64, name: &str) -> Employee {
    Employee {
        is_manager: true,
        ..employee(id, name)
    }
}

pub fn admin(id: i64, name: &str) -> Employee {
    Employee {
        is_admin: true,
        ..employee(id, name)
    }
}

pub fn vendor(id: i64, name: &str) -> Vendor {
    Vendor {
        id,
        name: name.to_string(),
        is_active: true,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub fn invoice(
    id: i64,
    agent_id: i64,
    vendor_id: i64,
    issue_date: &str,
    amount: Option<Decimal>,
) -> SaleInvoice {
    SaleInvoice {
        id,
        agent_id,
        vendor_id,
        issue_date: date(issue_date),
        weekending_date: date(issue_date),
        amount,
        status: "open".to_string(),
        modified_by: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub fn override_row(
    id: i64,
    agent_id: i64,
    vendor_id: i64,
    issue_date: &str,
    total: Option<Decimal>,
) -> Override {
    Override {
        id,
        agent_id,
        vendor_id,
        issue_date: date(issue_date),
        name: "override".to_string(),
        sales_count: 1,
        commission: None,
        total,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub fn expense(
    id: i64,
    agent_id: i64,
    vendor_id: i64,
    issue_date: &str,
    amount: Option<Decimal>,
) -> Expense {
    Expense {
        id,
        agent_id,
        vendor_id,
        issue_date: date(issue_date),
        amount,
        description: String::new(),
        created_at: ts(),
        updated_at: ts(),
    }
}

// ─── In-memory repositories ───────────────────────────────────────────────────

pub struct MemEmployeeRepo {
    employees: Vec<Employee>,
    assignments: Mutex<Vec<(i64, i64)>>,
}

impl MemEmployeeRepo {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self {
            employees,
            assignments: Mutex::new(Vec::new()),
        }
    }

    pub fn assign(&self, manager_id: i64, employee_id: i64) {
        self.assignments
            .lock()
            .unwrap()
            .push((manager_id, employee_id));
    }
}

#[async_trait]
impl EmployeeRepo for MemEmployeeRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Employee>> {
        Ok(self.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Employee>> {
        Ok(self
            .employees
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn subordinate_ids(&self, manager_id: i64) -> AppResult<Vec<i64>> {
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| *m == manager_id)
            .map(|(_, e)| *e)
            .collect())
    }
}

pub struct MemVendorRepo {
    vendors: Vec<Vendor>,
}

impl MemVendorRepo {
    pub fn new(vendors: Vec<Vendor>) -> Self {
        Self { vendors }
    }
}

#[async_trait]
impl VendorRepo for MemVendorRepo {
    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Vendor>> {
        Ok(self
            .vendors
            .iter()
            .filter(|v| ids.contains(&v.id))
            .cloned()
            .collect())
    }

    async fn list_active(&self) -> AppResult<Vec<Vendor>> {
        Ok(self
            .vendors
            .iter()
            .filter(|v| v.is_active)
            .cloned()
            .collect())
    }
}

pub struct MemLedgerRepo {
    invoices: Vec<SaleInvoice>,
    overrides: Vec<Override>,
    expenses: Vec<Expense>,
}

impl MemLedgerRepo {
    pub fn new(
        invoices: Vec<SaleInvoice>,
        overrides: Vec<Override>,
        expenses: Vec<Expense>,
    ) -> Self {
        Self {
            invoices,
            overrides,
            expenses,
        }
    }
}

fn matches_filter(
    filter: &LedgerFilter,
    agent_id: i64,
    vendor_id: i64,
    issue_date: NaiveDate,
) -> bool {
    filter
        .agent_ids
        .as_ref()
        .is_none_or(|ids| ids.contains(&agent_id))
        && filter
            .vendor_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&vendor_id))
        && filter.issue_date.is_none_or(|d| d == issue_date)
}

#[async_trait]
impl LedgerRepo for MemLedgerRepo {
    async fn invoices(&self, filter: &LedgerFilter) -> AppResult<Vec<SaleInvoice>> {
        Ok(self
            .invoices
            .iter()
            .filter(|r| matches_filter(filter, r.agent_id, r.vendor_id, r.issue_date))
            .cloned()
            .collect())
    }

    async fn overrides(&self, filter: &LedgerFilter) -> AppResult<Vec<Override>> {
        Ok(self
            .overrides
            .iter()
            .filter(|r| matches_filter(filter, r.agent_id, r.vendor_id, r.issue_date))
            .cloned()
            .collect())
    }

    async fn expenses(&self, filter: &LedgerFilter) -> AppResult<Vec<Expense>> {
        Ok(self
            .expenses
            .iter()
            .filter(|r| matches_filter(filter, r.agent_id, r.vendor_id, r.issue_date))
            .cloned()
            .collect())
    }

    async fn key_exists(
        &self,
        agent_id: i64,
        vendor_id: i64,
        issue_date: NaiveDate,
    ) -> AppResult<bool> {
        let hit = |a: i64, v: i64, d: NaiveDate| a == agent_id && v == vendor_id && d == issue_date;
        Ok(self
            .invoices
            .iter()
            .any(|r| hit(r.agent_id, r.vendor_id, r.issue_date))
            || self
                .overrides
                .iter()
                .any(|r| hit(r.agent_id, r.vendor_id, r.issue_date))
            || self
                .expenses
                .iter()
                .any(|r| hit(r.agent_id, r.vendor_id, r.issue_date)))
    }

    async fn issue_dates_for_agent(&self, agent_id: i64) -> AppResult<Vec<NaiveDate>> {
        let mut dates: Vec<NaiveDate> = self
            .invoices
            .iter()
            .filter(|r| r.agent_id == agent_id)
            .map(|r| r.issue_date)
            .chain(
                self.overrides
                    .iter()
                    .filter(|r| r.agent_id == agent_id)
                    .map(|r| r.issue_date),
            )
            .chain(
                self.expenses
                    .iter()
                    .filter(|r| r.agent_id == agent_id)
                    .map(|r| r.issue_date),
            )
            .collect();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates.dedup();
        Ok(dates)
    }
}
