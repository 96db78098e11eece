// src/handlers/auth.rs

use crate::{
    auth::generate_token,
    errors::{AppError, AppResult},
    models::{AuthResponse, EmployeePublic, LoginRequest},
    repos::postgres::PgEmployeeRepo,
    state::AppState,
};
use axum::{Json, extract::State};
use bcrypt::verify;

/// Login as an employee
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let repo = PgEmployeeRepo::new(state.db.clone());

    let employee = repo
        .find_by_email(&body.email)
        .await?
        .filter(|e| e.is_active)
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = verify(&body.password, &employee.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = generate_token(
        employee.id,
        &employee.name,
        employee.is_admin,
        employee.is_manager,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok(Json(AuthResponse {
        token,
        employee: EmployeePublic::from(employee),
    }))
}
