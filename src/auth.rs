use crate::{errors::AppError, models::Claims, state::AppState};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Authenticated employee extractor.
/// Add `auth: AuthUser` as a parameter in any handler that requires a caller.
/// The token's capability claims are informational; scope decisions always go
/// through the access resolver against current data.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let headers: &HeaderMap = &parts.headers;

        let auth_header = headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization format".to_string()))?;

        let secret = state.config.jwt_secret.as_bytes();
        let token_data =
            decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::default())
                .map_err(|_| AppError::InvalidToken)?;

        let employee_id: i64 = token_data
            .claims
            .sub
            .parse()
            .map_err(|_| AppError::InvalidToken)?;

        Ok(AuthUser {
            id: employee_id,
            name: token_data.claims.name,
        })
    }
}

pub fn generate_token(
    employee_id: i64,
    name: &str,
    is_admin: bool,
    is_manager: bool,
    secret: &str,
    expiry_hours: i64,
) -> Result<String, AppError> {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + chrono::Duration::hours(expiry_hours)).timestamp() as usize;

    let claims = Claims {
        sub: employee_id.to_string(),
        name: name.to_string(),
        admin: is_admin,
        manager: is_manager,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}
