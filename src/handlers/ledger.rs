// src/handlers/ledger.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{CreatePaystubRequest, PaystubDetail},
    repos::postgres::{PgEmployeeRepo, PgLedgerRepo, PgVendorRepo},
    services::{access::AccessResolver, paystub::PaystubService},
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};

fn validate_batch(body: &CreatePaystubRequest) -> AppResult<()> {
    if body.agent_id <= 0 {
        return Err(AppError::Validation(format!(
            "Invalid agent id: {}",
            body.agent_id
        )));
    }
    if body.vendor_id <= 0 {
        return Err(AppError::Validation(format!(
            "Invalid vendor id: {}",
            body.vendor_id
        )));
    }
    if body.invoices.is_empty() && body.overrides.is_empty() && body.expenses.is_empty() {
        return Err(AppError::Validation(
            "A paystub batch needs at least one invoice, override, or expense line".to_string(),
        ));
    }
    for line in &body.overrides {
        if line.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Override name must not be empty".to_string(),
            ));
        }
        if line.sales_count < 0 {
            return Err(AppError::Validation(
                "Override sales count cannot be negative".to_string(),
            ));
        }
    }
    Ok(())
}

/// Create the invoice/override/expense batch for a new paystub key.
/// The duplicate guard and the inserts run in one database transaction.
#[utoipa::path(
    post,
    path = "/api/v1/paystubs",
    request_body = CreatePaystubRequest,
    responses(
        (status = 201, description = "Paystub rows created", body = PaystubDetail),
        (status = 403, description = "Agent or vendor outside caller scope"),
        (status = 409, description = "A paystub already exists for this key"),
    ),
    security(("bearer_auth" = [])),
    tag = "Paystubs"
)]
pub async fn create_paystub(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreatePaystubRequest>,
) -> AppResult<(StatusCode, Json<PaystubDetail>)> {
    validate_batch(&body)?;

    let employees = PgEmployeeRepo::new(state.db.clone());
    let vendors = PgVendorRepo::new(state.db.clone());
    let ledger = PgLedgerRepo::new(state.db.clone());

    let scope = AccessResolver::new(&employees).resolve(auth.id).await?;
    scope.ensure_agent(body.agent_id)?;
    scope.ensure_vendor(body.vendor_id)?;

    let svc = PaystubService::new(&employees, &vendors, &ledger);

    if svc.exists(body.agent_id, body.vendor_id, body.issue_date).await? {
        return Err(AppError::Conflict(format!(
            "A paystub already exists for agent {} / vendor {} / {}",
            body.agent_id, body.vendor_id, body.issue_date
        )));
    }

    ledger.create_paystub_batch(&body, &auth.name).await?;

    let detail = svc
        .detail(&scope, body.agent_id, body.vendor_id, body.issue_date)
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}
