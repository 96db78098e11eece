use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{CreateVendorRequest, Vendor},
    repos::postgres::{PgEmployeeRepo, PgVendorRepo},
    services::access::AccessResolver,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// Register a new vendor
#[utoipa::path(
    post,
    path = "/api/v1/vendors",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created", body = Vendor),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn create_vendor(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateVendorRequest>,
) -> AppResult<(StatusCode, Json<Vendor>)> {
    let employees = PgEmployeeRepo::new(state.db.clone());
    AccessResolver::new(&employees).resolve(auth.id).await?.require_admin()?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Vendor name must not be empty".to_string(),
        ));
    }

    let vendor = PgVendorRepo::new(state.db.clone())
        .create(body.name.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

/// List all vendors
#[utoipa::path(
    get,
    path = "/api/v1/vendors",
    responses(
        (status = 200, description = "List of vendors", body = Vec<Vendor>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn list_vendors(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Vendor>>> {
    let employees = PgEmployeeRepo::new(state.db.clone());
    AccessResolver::new(&employees).resolve(auth.id).await?;

    let vendors = PgVendorRepo::new(state.db.clone()).list_all().await?;
    Ok(Json(vendors))
}

/// Deactivate a vendor
#[utoipa::path(
    delete,
    path = "/api/v1/vendors/{vendor_id}",
    params(("vendor_id" = i64, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor deactivated", body = Vendor),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Vendor not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Vendors"
)]
pub async fn deactivate_vendor(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vendor_id): Path<i64>,
) -> AppResult<Json<Vendor>> {
    let employees = PgEmployeeRepo::new(state.db.clone());
    AccessResolver::new(&employees).resolve(auth.id).await?.require_admin()?;

    let vendor = PgVendorRepo::new(state.db.clone())
        .deactivate(vendor_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vendor {} not found", vendor_id)))?;

    Ok(Json(vendor))
}
