use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod auth;
mod config;
mod errors;
mod handlers;
mod models;
mod openapi;
mod repos;
mod routes;
mod services;
mod state;
#[cfg(test)]
mod testing;

use config::Config;
use handlers::general::{health_handler, root_handler};
use openapi::ApiDoc;
use repos::postgres::PgEmployeeRepo;
use routes::api_routes;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ─── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("agency_payroll=debug,tower_http=info")),
        )
        .with_max_level(Level::TRACE)
        .init();

    // ─── Config ───────────────────────────────────────────────────────────────
    let config = Config::from_env();
    let addr = config.server_addr();

    // ─── Database ─────────────────────────────────────────────────────────────
    let db = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    info!("Database connected and migrations applied");

    seed_bootstrap_admin(&db, &config).await?;

    // ─── App State ────────────────────────────────────────────────────────────
    let state = AppState::new(db, config);

    // ─── Router ───────────────────────────────────────────────────────────────
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api/v1", api_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // ─── Start Server ─────────────────────────────────────────────────────────
    info!("Agency Payroll API listening on http://{}", addr);
    info!("Swagger UI: http://{}/docs", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Creates the first admin from BOOTSTRAP_ADMIN_EMAIL / BOOTSTRAP_ADMIN_PASSWORD
/// when no active admin exists yet, so a fresh deployment can log in.
async fn seed_bootstrap_admin(db: &sqlx::PgPool, config: &Config) -> anyhow::Result<()> {
    let repo = PgEmployeeRepo::new(db.clone());
    if repo.any_admin_exists().await? {
        return Ok(());
    }

    let (Some(email), Some(password)) = (
        config.bootstrap_admin_email.as_deref(),
        config.bootstrap_admin_password.as_deref(),
    ) else {
        warn!("No admin on file and no bootstrap credentials set; logins will fail");
        return Ok(());
    };

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    let admin = repo
        .create(
            "Administrator",
            email,
            &password_hash,
            true,
            false,
            (None, None, None),
            false,
        )
        .await?;
    info!("Seeded bootstrap admin {} ({})", admin.id, admin.email);
    Ok(())
}
