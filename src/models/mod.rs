// src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// ─── Employee ─────────────────────────────────────────────────────────────────

// Soft delete is an explicit status, not a nullable timestamp. Deleted
// employees stay on file and can be restored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "employee_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Deleted,
}

/// "Agent" and "employee" are the same thing; sales rows reference this id.
/// `is_admin` and `is_manager` are independent capabilities — both may be set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_manager: bool,
    pub sales_id1: Option<String>,
    pub sales_id2: Option<String>,
    pub sales_id3: Option<String>,
    /// Excluded from default paystub listings unless requested by id.
    pub hidden_payroll: bool,
    pub status: EmployeeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_manager: bool,
    pub sales_id1: Option<String>,
    pub sales_id2: Option<String>,
    pub sales_id3: Option<String>,
    #[serde(default)]
    pub hidden_payroll: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
    pub is_manager: Option<bool>,
    pub sales_id1: Option<String>,
    pub sales_id2: Option<String>,
    pub sales_id3: Option<String>,
    pub hidden_payroll: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub employee: EmployeePublic,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EmployeePublic {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_manager: bool,
}

impl From<Employee> for EmployeePublic {
    fn from(e: Employee) -> Self {
        EmployeePublic {
            id: e.id,
            name: e.name,
            email: e.email,
            is_admin: e.is_admin,
            is_manager: e.is_manager,
        }
    }
}

// ─── Manager assignments ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignEmployeeRequest {
    pub employee_id: i64,
}

// ─── Vendor ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVendorRequest {
    pub name: String,
}

// ─── Ledger rows ──────────────────────────────────────────────────────────────
//
// Rows sharing the same (agent_id, vendor_id, issue_date) key belong to one
// logical paystub. Amounts are nullable: unparseable legacy imports land as
// NULL and count as zero when summed.

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SaleInvoice {
    pub id: i64,
    pub agent_id: i64,
    pub vendor_id: i64,
    pub issue_date: NaiveDate,
    pub weekending_date: NaiveDate,
    pub amount: Option<Decimal>,
    pub status: String,
    pub modified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Secondary commission adjustment layered onto a base sale for the same key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Override {
    pub id: i64,
    pub agent_id: i64,
    pub vendor_id: i64,
    pub issue_date: NaiveDate,
    pub name: String,
    pub sales_count: i32,
    pub commission: Option<Decimal>,
    pub total: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Expense {
    pub id: i64,
    pub agent_id: i64,
    pub vendor_id: i64,
    pub issue_date: NaiveDate,
    pub amount: Option<Decimal>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Paystub batch creation ───────────────────────────────────────────────────
//
// New data entering here is validated strictly; only legacy rows may carry
// NULL amounts.

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewInvoiceLine {
    pub weekending_date: NaiveDate,
    pub amount: Decimal,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewOverrideLine {
    pub name: String,
    pub sales_count: i32,
    pub commission: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewExpenseLine {
    pub amount: Decimal,
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePaystubRequest {
    pub agent_id: i64,
    pub vendor_id: i64,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub invoices: Vec<NewInvoiceLine>,
    #[serde(default)]
    pub overrides: Vec<NewOverrideLine>,
    #[serde(default)]
    pub expenses: Vec<NewExpenseLine>,
}

// ─── Paystub views ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
pub struct PaystubSummary {
    pub agent_id: i64,
    pub agent_name: String,
    pub vendor_id: i64,
    pub vendor_name: String,
    pub amount: Decimal,
    pub issue_date: NaiveDate,
    pub weekending_date: Option<NaiveDate>,
    pub modified_by: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaystubDetail {
    pub agent_id: i64,
    pub vendor_id: i64,
    pub issue_date: NaiveDate,
    pub invoices: Vec<SaleInvoice>,
    pub overrides: Vec<Override>,
    pub expenses: Vec<Expense>,
    pub total: Decimal,
    /// Edit resources for the presentation layer.
    pub available_vendors: Vec<Vendor>,
    pub available_issue_dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaystubExistsResponse {
    pub exists: bool,
}

// ─── Payroll snapshots ────────────────────────────────────────────────────────

/// Committed/paid snapshot of a paystub, decoupled from the live aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PayrollEntry {
    pub id: i64,
    pub agent_id: i64,
    pub vendor_id: i64,
    pub amount: Decimal,
    pub pay_date: NaiveDate,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommitPayrollRequest {
    pub agent_id: i64,
    pub vendor_id: i64,
    pub issue_date: NaiveDate,
    pub pay_date: NaiveDate,
}

// ─── JWT Claims ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub admin: bool,
    pub manager: bool,
    pub exp: usize,
    pub iat: usize,
}
