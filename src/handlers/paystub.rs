// src/handlers/paystub.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{PaystubDetail, PaystubExistsResponse, PaystubSummary},
    repos::postgres::{PgEmployeeRepo, PgLedgerRepo, PgVendorRepo},
    services::{
        access::AccessResolver,
        paystub::{PaystubFilters, PaystubService},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;

/// Comma-separated agent id list, e.g. `7,12`. `-1` means "any".
fn parse_id_list(raw: &str) -> AppResult<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::Validation(format!("'{}' is not a valid agent id", s)))
        })
        .collect()
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListPaystubsQuery {
    /// Restrict to one issue date (YYYY-MM-DD)
    pub issue_date: Option<NaiveDate>,
    /// Restrict to one vendor
    pub vendor_id: Option<i64>,
    /// Comma-separated agent ids; -1 defers to the caller's resolved scope
    pub agent_ids: Option<String>,
}

/// List paystub summaries visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/paystubs",
    params(ListPaystubsQuery),
    responses(
        (status = 200, description = "Paystub summaries", body = Vec<PaystubSummary>),
        (status = 403, description = "Requested agents outside caller scope"),
    ),
    security(("bearer_auth" = [])),
    tag = "Paystubs"
)]
pub async fn list_paystubs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListPaystubsQuery>,
) -> AppResult<Json<Vec<PaystubSummary>>> {
    let employees = PgEmployeeRepo::new(state.db.clone());
    let vendors = PgVendorRepo::new(state.db.clone());
    let ledger = PgLedgerRepo::new(state.db.clone());

    let scope = AccessResolver::new(&employees).resolve(auth.id).await?;

    let agent_ids = match query.agent_ids.as_deref() {
        Some(raw) => parse_id_list(raw)?,
        None => Vec::new(),
    };

    let filters = PaystubFilters {
        issue_date: query.issue_date,
        vendor_id: query.vendor_id,
        agent_ids,
    };

    let rows = PaystubService::new(&employees, &vendors, &ledger)
        .list(&scope, &filters)
        .await?;
    Ok(Json(rows))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PaystubKeyQuery {
    pub agent_id: i64,
    pub vendor_id: i64,
    /// Issue date (YYYY-MM-DD)
    pub issue_date: NaiveDate,
}

/// Full detail for one paystub key, with edit resources
#[utoipa::path(
    get,
    path = "/api/v1/paystubs/detail",
    params(PaystubKeyQuery),
    responses(
        (status = 200, description = "Paystub detail", body = PaystubDetail),
        (status = 403, description = "Key outside caller scope"),
        (status = 404, description = "No rows for this key"),
    ),
    security(("bearer_auth" = [])),
    tag = "Paystubs"
)]
pub async fn get_paystub_detail(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PaystubKeyQuery>,
) -> AppResult<Json<PaystubDetail>> {
    let employees = PgEmployeeRepo::new(state.db.clone());
    let vendors = PgVendorRepo::new(state.db.clone());
    let ledger = PgLedgerRepo::new(state.db.clone());

    let scope = AccessResolver::new(&employees).resolve(auth.id).await?;

    let detail = PaystubService::new(&employees, &vendors, &ledger)
        .detail(&scope, query.agent_id, query.vendor_id, query.issue_date)
        .await?;
    Ok(Json(detail))
}

/// Check whether any rows already exist for a paystub key
#[utoipa::path(
    get,
    path = "/api/v1/paystubs/exists",
    params(PaystubKeyQuery),
    responses(
        (status = 200, description = "Existence flag", body = PaystubExistsResponse),
        (status = 403, description = "Key outside caller scope"),
    ),
    security(("bearer_auth" = [])),
    tag = "Paystubs"
)]
pub async fn paystub_exists(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PaystubKeyQuery>,
) -> AppResult<Json<PaystubExistsResponse>> {
    let employees = PgEmployeeRepo::new(state.db.clone());
    let vendors = PgVendorRepo::new(state.db.clone());
    let ledger = PgLedgerRepo::new(state.db.clone());

    let scope = AccessResolver::new(&employees).resolve(auth.id).await?;
    scope.ensure_agent(query.agent_id)?;
    scope.ensure_vendor(query.vendor_id)?;

    let exists = PaystubService::new(&employees, &vendors, &ledger)
        .exists(query.agent_id, query.vendor_id, query.issue_date)
        .await?;
    Ok(Json(PaystubExistsResponse { exists }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_list_parses_and_rejects_junk() {
        assert_eq!(parse_id_list("7,12").unwrap(), vec![7, 12]);
        assert_eq!(parse_id_list(" -1 , 7 ").unwrap(), vec![-1, 7]);
        assert!(matches!(
            parse_id_list("7,abc").unwrap_err(),
            AppError::Validation(_)
        ));
    }
}
