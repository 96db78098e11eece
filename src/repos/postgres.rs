// src/repos/postgres.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::errors::{AppError, AppResult};
use crate::models::{
    CreatePaystubRequest, Employee, EmployeeStatus, Expense, Override, PayrollEntry, SaleInvoice,
    UpdateEmployeeRequest, Vendor,
};
use crate::repos::{EmployeeRepo, LedgerFilter, LedgerRepo, VendorRepo};

// ─── Employees ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgEmployeeRepo {
    pool: PgPool,
}

impl PgEmployeeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE email = $1 AND status = 'active'",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    pub async fn list(&self, include_deleted: bool) -> AppResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees
             WHERE $1::bool OR status = 'active'
             ORDER BY name ASC",
        )
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        is_admin: bool,
        is_manager: bool,
        sales_ids: (Option<&str>, Option<&str>, Option<&str>),
        hidden_payroll: bool,
    ) -> AppResult<Employee> {
        let employee = sqlx::query_as::<_, Employee>(
            "INSERT INTO employees (
                name, email, password_hash, is_active, is_admin, is_manager,
                sales_id1, sales_id2, sales_id3, hidden_payroll
             ) VALUES ($1, $2, $3, true, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(is_admin)
        .bind(is_manager)
        .bind(sales_ids.0)
        .bind(sales_ids.1)
        .bind(sales_ids.2)
        .bind(hidden_payroll)
        .fetch_one(&self.pool)
        .await?;
        Ok(employee)
    }

    pub async fn update(&self, id: i64, req: &UpdateEmployeeRequest) -> AppResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "UPDATE employees SET
                name = COALESCE($2, name),
                is_active = COALESCE($3, is_active),
                is_admin = COALESCE($4, is_admin),
                is_manager = COALESCE($5, is_manager),
                sales_id1 = COALESCE($6, sales_id1),
                sales_id2 = COALESCE($7, sales_id2),
                sales_id3 = COALESCE($8, sales_id3),
                hidden_payroll = COALESCE($9, hidden_payroll),
                updated_at = NOW()
             WHERE id = $1 AND status = 'active'
             RETURNING *",
        )
        .bind(id)
        .bind(req.name.as_deref())
        .bind(req.is_active)
        .bind(req.is_admin)
        .bind(req.is_manager)
        .bind(req.sales_id1.as_deref())
        .bind(req.sales_id2.as_deref())
        .bind(req.sales_id3.as_deref())
        .bind(req.hidden_payroll)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    pub async fn set_status(&self, id: i64, status: EmployeeStatus) -> AppResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "UPDATE employees SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    pub async fn assign(&self, manager_id: i64, employee_id: i64) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO manager_assignments (manager_id, employee_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(manager_id)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn unassign(&self, manager_id: i64, employee_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM manager_assignments WHERE manager_id = $1 AND employee_id = $2",
        )
        .bind(manager_id)
        .bind(employee_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn subordinates(&self, manager_id: i64) -> AppResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT e.* FROM employees e
             JOIN manager_assignments m ON m.employee_id = e.id
             WHERE m.manager_id = $1 AND e.status = 'active'
             ORDER BY e.name ASC",
        )
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    pub async fn any_admin_exists(&self) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM employees WHERE is_admin = true AND status = 'active')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

#[async_trait]
impl EmployeeRepo for PgEmployeeRepo {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Employee>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let employees =
            sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(employees)
    }

    async fn subordinate_ids(&self, manager_id: i64) -> AppResult<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT employee_id FROM manager_assignments WHERE manager_id = $1",
        )
        .bind(manager_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}

// ─── Vendors ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgVendorRepo {
    pool: PgPool,
}

impl PgVendorRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> AppResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(vendors)
    }

    pub async fn create(&self, name: &str) -> AppResult<Vendor> {
        let vendor = sqlx::query_as::<_, Vendor>(
            "INSERT INTO vendors (name) VALUES ($1) RETURNING *",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(vendor)
    }

    pub async fn deactivate(&self, id: i64) -> AppResult<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(
            "UPDATE vendors SET is_active = false, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vendor)
    }
}

#[async_trait]
impl VendorRepo for PgVendorRepo {
    async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Vendor>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let vendors = sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(vendors)
    }

    async fn list_active(&self) -> AppResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(
            "SELECT * FROM vendors WHERE is_active = true ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(vendors)
    }
}

// ─── Ledger ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgLedgerRepo {
    pool: PgPool,
}

impl PgLedgerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the full invoice/override/expense batch for one paystub key in
    /// a single transaction, re-checking the duplicate guard inside it so the
    /// existence check and the inserts are atomic.
    pub async fn create_paystub_batch(
        &self,
        req: &CreatePaystubRequest,
        modified_by: &str,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM sale_invoices WHERE agent_id = $1 AND vendor_id = $2 AND issue_date = $3)
                 OR EXISTS (SELECT 1 FROM overrides WHERE agent_id = $1 AND vendor_id = $2 AND issue_date = $3)
                 OR EXISTS (SELECT 1 FROM expenses WHERE agent_id = $1 AND vendor_id = $2 AND issue_date = $3)",
        )
        .bind(req.agent_id)
        .bind(req.vendor_id)
        .bind(req.issue_date)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            return Err(AppError::Conflict(format!(
                "A paystub already exists for agent {} / vendor {} / {}",
                req.agent_id, req.vendor_id, req.issue_date
            )));
        }

        for line in &req.invoices {
            sqlx::query(
                "INSERT INTO sale_invoices
                    (agent_id, vendor_id, issue_date, weekending_date, amount, status, modified_by)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(req.agent_id)
            .bind(req.vendor_id)
            .bind(req.issue_date)
            .bind(line.weekending_date)
            .bind(line.amount)
            .bind(line.status.as_deref().unwrap_or("open"))
            .bind(modified_by)
            .execute(&mut *tx)
            .await?;
        }

        for line in &req.overrides {
            sqlx::query(
                "INSERT INTO overrides
                    (agent_id, vendor_id, issue_date, name, sales_count, commission, total)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(req.agent_id)
            .bind(req.vendor_id)
            .bind(req.issue_date)
            .bind(&line.name)
            .bind(line.sales_count)
            .bind(line.commission)
            .bind(line.total)
            .execute(&mut *tx)
            .await?;
        }

        for line in &req.expenses {
            sqlx::query(
                "INSERT INTO expenses (agent_id, vendor_id, issue_date, amount, description)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(req.agent_id)
            .bind(req.vendor_id)
            .bind(req.issue_date)
            .bind(line.amount)
            .bind(&line.description)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

// Optional-array binds: `$n::bigint[] IS NULL` keeps the axis unrestricted
// when no scope narrowing applies.
const INVOICE_FILTER_SQL: &str = "SELECT * FROM sale_invoices
    WHERE ($1::bigint[] IS NULL OR agent_id = ANY($1))
      AND ($2::bigint[] IS NULL OR vendor_id = ANY($2))
      AND ($3::date IS NULL OR issue_date = $3)
    ORDER BY issue_date DESC, id ASC";

const OVERRIDE_FILTER_SQL: &str = "SELECT * FROM overrides
    WHERE ($1::bigint[] IS NULL OR agent_id = ANY($1))
      AND ($2::bigint[] IS NULL OR vendor_id = ANY($2))
      AND ($3::date IS NULL OR issue_date = $3)
    ORDER BY issue_date DESC, id ASC";

const EXPENSE_FILTER_SQL: &str = "SELECT * FROM expenses
    WHERE ($1::bigint[] IS NULL OR agent_id = ANY($1))
      AND ($2::bigint[] IS NULL OR vendor_id = ANY($2))
      AND ($3::date IS NULL OR issue_date = $3)
    ORDER BY issue_date DESC, id ASC";

#[async_trait]
impl LedgerRepo for PgLedgerRepo {
    async fn invoices(&self, filter: &LedgerFilter) -> AppResult<Vec<SaleInvoice>> {
        let rows = sqlx::query_as::<_, SaleInvoice>(INVOICE_FILTER_SQL)
            .bind(filter.agent_ids.as_deref())
            .bind(filter.vendor_ids.as_deref())
            .bind(filter.issue_date)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn overrides(&self, filter: &LedgerFilter) -> AppResult<Vec<Override>> {
        let rows = sqlx::query_as::<_, Override>(OVERRIDE_FILTER_SQL)
            .bind(filter.agent_ids.as_deref())
            .bind(filter.vendor_ids.as_deref())
            .bind(filter.issue_date)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn expenses(&self, filter: &LedgerFilter) -> AppResult<Vec<Expense>> {
        let rows = sqlx::query_as::<_, Expense>(EXPENSE_FILTER_SQL)
            .bind(filter.agent_ids.as_deref())
            .bind(filter.vendor_ids.as_deref())
            .bind(filter.issue_date)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn key_exists(
        &self,
        agent_id: i64,
        vendor_id: i64,
        issue_date: NaiveDate,
    ) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM sale_invoices WHERE agent_id = $1 AND vendor_id = $2 AND issue_date = $3)
                 OR EXISTS (SELECT 1 FROM overrides WHERE agent_id = $1 AND vendor_id = $2 AND issue_date = $3)
                 OR EXISTS (SELECT 1 FROM expenses WHERE agent_id = $1 AND vendor_id = $2 AND issue_date = $3)",
        )
        .bind(agent_id)
        .bind(vendor_id)
        .bind(issue_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn issue_dates_for_agent(&self, agent_id: i64) -> AppResult<Vec<NaiveDate>> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT DISTINCT issue_date FROM (
                SELECT issue_date FROM sale_invoices WHERE agent_id = $1
                UNION ALL SELECT issue_date FROM overrides WHERE agent_id = $1
                UNION ALL SELECT issue_date FROM expenses WHERE agent_id = $1
             ) AS dates
             ORDER BY issue_date DESC",
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(dates)
    }
}

// ─── Payroll snapshots ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgPayrollRepo {
    pool: PgPool,
}

impl PgPayrollRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn entry_exists(
        &self,
        agent_id: i64,
        vendor_id: i64,
        pay_date: NaiveDate,
    ) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM payroll_entries
                WHERE agent_id = $1 AND vendor_id = $2 AND pay_date = $3
             )",
        )
        .bind(agent_id)
        .bind(vendor_id)
        .bind(pay_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn insert_entry(
        &self,
        agent_id: i64,
        vendor_id: i64,
        amount: Decimal,
        pay_date: NaiveDate,
    ) -> AppResult<PayrollEntry> {
        let entry = sqlx::query_as::<_, PayrollEntry>(
            "INSERT INTO payroll_entries (agent_id, vendor_id, amount, pay_date, is_paid)
             VALUES ($1, $2, $3, $4, false)
             RETURNING *",
        )
        .bind(agent_id)
        .bind(vendor_id)
        .bind(amount)
        .bind(pay_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(entry)
    }

    pub async fn list(&self, agent_ids: Option<&[i64]>) -> AppResult<Vec<PayrollEntry>> {
        let entries = sqlx::query_as::<_, PayrollEntry>(
            "SELECT * FROM payroll_entries
             WHERE ($1::bigint[] IS NULL OR agent_id = ANY($1))
             ORDER BY pay_date DESC, id ASC",
        )
        .bind(agent_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<PayrollEntry>> {
        let entry =
            sqlx::query_as::<_, PayrollEntry>("SELECT * FROM payroll_entries WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(entry)
    }

    pub async fn mark_paid(&self, id: i64) -> AppResult<Option<PayrollEntry>> {
        let entry = sqlx::query_as::<_, PayrollEntry>(
            "UPDATE payroll_entries SET is_paid = true WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }
}
