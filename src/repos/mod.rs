// src/repos/mod.rs
//
// Repository seams for the scope resolver and paystub aggregator. The service
// layer only sees these traits; Postgres implementations live in `postgres`.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::AppResult;
use crate::models::{Employee, Expense, Override, SaleInvoice, Vendor};

pub mod postgres;

/// Read filter for the three ledger tables. `None` on an axis means
/// unrestricted; callers derive these from a resolved access scope, so an
/// empty id list is a valid (if pointless) restriction, not "all".
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub agent_ids: Option<Vec<i64>>,
    pub vendor_ids: Option<Vec<i64>>,
    pub issue_date: Option<NaiveDate>,
}

impl LedgerFilter {
    pub fn for_key(agent_id: i64, vendor_id: i64, issue_date: NaiveDate) -> Self {
        Self {
            agent_ids: Some(vec![agent_id]),
            vendor_ids: Some(vec![vendor_id]),
            issue_date: Some(issue_date),
        }
    }
}

#[async_trait]
pub trait EmployeeRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Employee>>;
    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Employee>>;
    /// Subordinates assigned to a manager via the manager-employee mapping.
    async fn subordinate_ids(&self, manager_id: i64) -> AppResult<Vec<i64>>;
}

#[async_trait]
pub trait VendorRepo: Send + Sync {
    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Vendor>>;
    async fn list_active(&self) -> AppResult<Vec<Vendor>>;
}

#[async_trait]
pub trait LedgerRepo: Send + Sync {
    async fn invoices(&self, filter: &LedgerFilter) -> AppResult<Vec<SaleInvoice>>;
    async fn overrides(&self, filter: &LedgerFilter) -> AppResult<Vec<Override>>;
    async fn expenses(&self, filter: &LedgerFilter) -> AppResult<Vec<Expense>>;
    /// True if any invoice, override, or expense row exists for the key.
    async fn key_exists(
        &self,
        agent_id: i64,
        vendor_id: i64,
        issue_date: NaiveDate,
    ) -> AppResult<bool>;
    /// Distinct issue dates on file for an agent, newest first.
    async fn issue_dates_for_agent(&self, agent_id: i64) -> AppResult<Vec<NaiveDate>>;
}
