// src/handlers/payroll.rs
//
// Committed payroll snapshots. Committing freezes a paystub's aggregated
// total into a payroll_entries row; the live aggregation stays untouched.

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{CommitPayrollRequest, PayrollEntry},
    repos::postgres::{PgEmployeeRepo, PgLedgerRepo, PgPayrollRepo, PgVendorRepo},
    services::{access::AccessResolver, paystub::PaystubService},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

/// Commit a paystub's current total as a payroll entry
#[utoipa::path(
    post,
    path = "/api/v1/payroll/commit",
    request_body = CommitPayrollRequest,
    responses(
        (status = 201, description = "Payroll entry created", body = PayrollEntry),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No paystub rows for this key"),
        (status = 409, description = "Already committed for this pay date"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn commit_payroll(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CommitPayrollRequest>,
) -> AppResult<(StatusCode, Json<PayrollEntry>)> {
    let employees = PgEmployeeRepo::new(state.db.clone());
    let vendors = PgVendorRepo::new(state.db.clone());
    let ledger = PgLedgerRepo::new(state.db.clone());
    let payroll = PgPayrollRepo::new(state.db.clone());

    let scope = AccessResolver::new(&employees).resolve(auth.id).await?;
    scope.require_admin()?;

    if payroll
        .entry_exists(body.agent_id, body.vendor_id, body.pay_date)
        .await?
    {
        return Err(AppError::Conflict(format!(
            "Payroll already committed for agent {} / vendor {} on {}",
            body.agent_id, body.vendor_id, body.pay_date
        )));
    }

    let detail = PaystubService::new(&employees, &vendors, &ledger)
        .detail(&scope, body.agent_id, body.vendor_id, body.issue_date)
        .await?;

    let entry = payroll
        .insert_entry(body.agent_id, body.vendor_id, detail.total, body.pay_date)
        .await?;

    info!(
        "Committed payroll entry {} for agent {} vendor {}: {}",
        entry.id, entry.agent_id, entry.vendor_id, entry.amount
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

/// List payroll entries visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/payroll/entries",
    responses(
        (status = 200, description = "Payroll entries", body = Vec<PayrollEntry>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payroll_entries(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PayrollEntry>>> {
    let employees = PgEmployeeRepo::new(state.db.clone());
    let scope = AccessResolver::new(&employees).resolve(auth.id).await?;

    let agent_ids = scope.agents.to_id_vec();
    let entries = PgPayrollRepo::new(state.db.clone())
        .list(agent_ids.as_deref())
        .await?;
    Ok(Json(entries))
}

/// Mark a payroll entry as paid
#[utoipa::path(
    post,
    path = "/api/v1/payroll/entries/{entry_id}/pay",
    params(("entry_id" = i64, Path, description = "Payroll entry ID")),
    responses(
        (status = 200, description = "Entry marked paid", body = PayrollEntry),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Entry already paid"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn mark_entry_paid(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(entry_id): Path<i64>,
) -> AppResult<Json<PayrollEntry>> {
    let employees = PgEmployeeRepo::new(state.db.clone());
    AccessResolver::new(&employees).resolve(auth.id).await?.require_admin()?;

    let payroll = PgPayrollRepo::new(state.db.clone());
    let entry = payroll
        .find_by_id(entry_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payroll entry {} not found", entry_id)))?;

    if entry.is_paid {
        return Err(AppError::Conflict(format!(
            "Payroll entry {} is already paid",
            entry_id
        )));
    }

    let entry = payroll
        .mark_paid(entry_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payroll entry {} not found", entry_id)))?;

    Ok(Json(entry))
}
