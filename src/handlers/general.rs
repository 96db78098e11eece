use crate::state::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;

/// Root handler — returns an HTML landing page with project info and links
pub async fn root_handler() -> impl IntoResponse {
    Html(r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
  <title>Agency Payroll API</title>
  <style>
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: 'Segoe UI', system-ui, sans-serif; background: #0f172a; color: #e2e8f0; min-height: 100vh; padding: 40px 20px; }
    .container { max-width: 760px; margin: 0 auto; }
    header { text-align: center; margin-bottom: 40px; }
    header h1 { font-size: 2.4rem; font-weight: 800; background: linear-gradient(135deg, #34d399, #3b82f6); -webkit-background-clip: text; -webkit-text-fill-color: transparent; margin-bottom: 8px; }
    header p { color: #94a3b8; font-size: 1.05rem; }
    .badge { display: inline-block; background: #1e293b; border: 1px solid #334155; color: #38bdf8; padding: 4px 12px; border-radius: 20px; font-size: 0.8rem; margin-top: 12px; }
    .routes { background: #1e293b; border: 1px solid #334155; border-radius: 12px; padding: 24px; }
    .routes h2 { font-size: 1.1rem; font-weight: 700; color: #f1f5f9; margin-bottom: 16px; }
    .route-group { margin-bottom: 18px; }
    .route-group h4 { font-size: 0.8rem; font-weight: 600; text-transform: uppercase; letter-spacing: 0.1em; color: #64748b; margin-bottom: 8px; }
    .route-item { display: flex; align-items: flex-start; gap: 12px; padding: 7px 0; border-bottom: 1px solid #0f172a; }
    .route-item:last-child { border-bottom: none; }
    .method { font-size: 0.7rem; font-weight: 700; padding: 2px 8px; border-radius: 4px; min-width: 52px; text-align: center; font-family: monospace; }
    .get { background: #064e3b; color: #34d399; }
    .post { background: #1e3a5f; color: #60a5fa; }
    .patch { background: #451a03; color: #fb923c; }
    .delete { background: #4c0519; color: #fb7185; }
    .route-path { font-family: monospace; font-size: 0.85rem; color: #e2e8f0; flex: 1; }
    .route-desc { font-size: 0.8rem; color: #64748b; }
    footer { text-align: center; margin-top: 36px; color: #475569; font-size: 0.85rem; }
    footer a { color: #38bdf8; text-decoration: none; }
  </style>
</head>
<body>
<div class="container">
  <header>
    <h1>Agency Payroll API</h1>
    <p>Role-scoped paystub aggregation over sales, overrides, and expenses</p>
    <span class="badge">v0.1.0 · REST API · JSON</span>
  </header>

  <div class="routes">
    <h2>API Routes</h2>

    <div class="route-group">
      <h4>Auth</h4>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/auth/login</span><span class="route-desc">Login and get a JWT token</span></div>
    </div>

    <div class="route-group">
      <h4>Paystubs</h4>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/paystubs</span><span class="route-desc">List paystub summaries in your scope</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/paystubs/detail</span><span class="route-desc">Rows and total for one paystub key</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/paystubs/exists</span><span class="route-desc">Duplicate-key guard</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/paystubs</span><span class="route-desc">Create an invoice/override/expense batch</span></div>
    </div>

    <div class="route-group">
      <h4>Employees &amp; Vendors</h4>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/employees</span><span class="route-desc">Onboard an employee</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/employees</span><span class="route-desc">List employees</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/employees/:id/assignments</span><span class="route-desc">Assign a subordinate to a manager</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/vendors</span><span class="route-desc">List vendors</span></div>
    </div>

    <div class="route-group">
      <h4>Payroll</h4>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/payroll/commit</span><span class="route-desc">Freeze a paystub total into a payroll entry</span></div>
      <div class="route-item"><span class="method get">GET</span><span class="route-path">/api/v1/payroll/entries</span><span class="route-desc">List payroll entries in your scope</span></div>
      <div class="route-item"><span class="method post">POST</span><span class="route-path">/api/v1/payroll/entries/:id/pay</span><span class="route-desc">Mark an entry paid</span></div>
    </div>
  </div>

  <footer>
    <p><a href="/docs">Swagger UI</a> · <a href="/health">Health</a> · Built with Rust, Axum &amp; SQLx</p>
  </footer>
</div>
</body>
</html>"#)
}

/// Health check endpoint
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected",
                "service": "agency-payroll",
                "version": "0.1.0"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string()
            })),
        ),
    }
}
