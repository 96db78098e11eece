use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        AssignEmployeeRequest, CreateEmployeeRequest, Employee, EmployeeStatus,
        UpdateEmployeeRequest,
    },
    repos::{EmployeeRepo, postgres::PgEmployeeRepo},
    services::access::AccessResolver,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

fn validate_new_employee(body: &CreateEmployeeRequest) -> AppResult<()> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Name must not be empty".to_string()));
    }
    if !body.email.contains('@') {
        return Err(AppError::Validation(format!(
            "'{}' is not a valid email address",
            body.email
        )));
    }
    if body.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

/// Onboard a new employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Email already in use"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn create_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateEmployeeRequest>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    let repo = PgEmployeeRepo::new(state.db.clone());
    AccessResolver::new(&repo).resolve(auth.id).await?.require_admin()?;

    validate_new_employee(&body)?;

    if repo.find_by_email(&body.email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Employee with email '{}' already exists",
            body.email
        )));
    }

    let password_hash = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let employee = repo
        .create(
            body.name.trim(),
            &body.email,
            &password_hash,
            body.is_admin,
            body.is_manager,
            (
                body.sales_id1.as_deref(),
                body.sales_id2.as_deref(),
                body.sales_id3.as_deref(),
            ),
            body.hidden_payroll,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListEmployeesQuery {
    /// Include soft-deleted employees in the listing
    #[serde(default)]
    pub include_deleted: bool,
}

/// List employees (soft-deleted ones only on request)
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(ListEmployeesQuery),
    responses(
        (status = 200, description = "List of employees", body = Vec<Employee>),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListEmployeesQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    let repo = PgEmployeeRepo::new(state.db.clone());
    AccessResolver::new(&repo).resolve(auth.id).await?.require_admin()?;

    let employees = repo.list(query.include_deleted).await?;
    Ok(Json(employees))
}

/// Get a single employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee detail", body = Employee),
        (status = 403, description = "Employee outside caller scope"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn get_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<i64>,
) -> AppResult<Json<Employee>> {
    let repo = PgEmployeeRepo::new(state.db.clone());
    let scope = AccessResolver::new(&repo).resolve(auth.id).await?;
    scope.ensure_agent(employee_id)?;

    let employee = repo
        .find_by_id(employee_id)
        .await?
        .filter(|e| e.status == EmployeeStatus::Active)
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    Ok(Json(employee))
}

/// Update an employee's profile and capability flags
#[utoipa::path(
    patch,
    path = "/api/v1/employees/{employee_id}",
    request_body = UpdateEmployeeRequest,
    params(("employee_id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn update_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<i64>,
    Json(body): Json<UpdateEmployeeRequest>,
) -> AppResult<Json<Employee>> {
    let repo = PgEmployeeRepo::new(state.db.clone());
    AccessResolver::new(&repo).resolve(auth.id).await?.require_admin()?;

    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Name must not be empty".to_string()));
        }
    }

    let employee = repo
        .update(employee_id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    Ok(Json(employee))
}

/// Soft-delete an employee
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee soft-deleted", body = Employee),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn delete_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<i64>,
) -> AppResult<Json<Employee>> {
    let repo = PgEmployeeRepo::new(state.db.clone());
    AccessResolver::new(&repo).resolve(auth.id).await?.require_admin()?;

    if employee_id == auth.id {
        return Err(AppError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }

    let employee = repo
        .set_status(employee_id, EmployeeStatus::Deleted)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    Ok(Json(employee))
}

/// Restore a soft-deleted employee
#[utoipa::path(
    post,
    path = "/api/v1/employees/{employee_id}/restore",
    params(("employee_id" = i64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee restored", body = Employee),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn restore_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<i64>,
) -> AppResult<Json<Employee>> {
    let repo = PgEmployeeRepo::new(state.db.clone());
    AccessResolver::new(&repo).resolve(auth.id).await?.require_admin()?;

    let employee = repo
        .set_status(employee_id, EmployeeStatus::Active)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    Ok(Json(employee))
}

// ─── Manager assignments ──────────────────────────────────────────────────────

/// Assign a subordinate to a manager
#[utoipa::path(
    post,
    path = "/api/v1/employees/{employee_id}/assignments",
    request_body = AssignEmployeeRequest,
    params(("employee_id" = i64, Path, description = "Manager's employee ID")),
    responses(
        (status = 201, description = "Assignment created"),
        (status = 400, description = "Self-assignment or non-manager target"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Manager or subordinate not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn assign_subordinate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(manager_id): Path<i64>,
    Json(body): Json<AssignEmployeeRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let repo = PgEmployeeRepo::new(state.db.clone());
    AccessResolver::new(&repo).resolve(auth.id).await?.require_admin()?;

    if manager_id == body.employee_id {
        return Err(AppError::Validation(
            "An employee cannot be assigned as their own manager".to_string(),
        ));
    }

    let manager = repo
        .find_by_id(manager_id)
        .await?
        .filter(|e| e.status == EmployeeStatus::Active)
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", manager_id)))?;
    if !manager.is_manager {
        return Err(AppError::Validation(format!(
            "Employee {} is not a manager",
            manager_id
        )));
    }

    repo.find_by_id(body.employee_id)
        .await?
        .filter(|e| e.status == EmployeeStatus::Active)
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", body.employee_id)))?;

    repo.assign(manager_id, body.employee_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Assignment created" })),
    ))
}

/// Remove a subordinate from a manager
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}/assignments/{subordinate_id}",
    params(
        ("employee_id" = i64, Path, description = "Manager's employee ID"),
        ("subordinate_id" = i64, Path, description = "Subordinate's employee ID"),
    ),
    responses(
        (status = 200, description = "Assignment removed"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Assignment not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn unassign_subordinate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((manager_id, subordinate_id)): Path<(i64, i64)>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = PgEmployeeRepo::new(state.db.clone());
    AccessResolver::new(&repo).resolve(auth.id).await?.require_admin()?;

    let removed = repo.unassign(manager_id, subordinate_id).await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "No assignment of employee {} to manager {}",
            subordinate_id, manager_id
        )));
    }

    Ok(Json(serde_json::json!({ "message": "Assignment removed" })))
}

/// List a manager's subordinates
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/assignments",
    params(("employee_id" = i64, Path, description = "Manager's employee ID")),
    responses(
        (status = 200, description = "Subordinates", body = Vec<Employee>),
        (status = 403, description = "Caller may not view these assignments"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_subordinates(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(manager_id): Path<i64>,
) -> AppResult<Json<Vec<Employee>>> {
    let repo = PgEmployeeRepo::new(state.db.clone());
    let scope = AccessResolver::new(&repo).resolve(auth.id).await?;

    // Admins may inspect anyone; a manager may list their own team.
    if !scope.is_admin && manager_id != auth.id {
        return Err(AppError::AccessDenied(
            "You may only list your own assignments".to_string(),
        ));
    }

    let subordinates = repo.subordinates(manager_id).await?;
    Ok(Json(subordinates))
}
