//! # gasdepot: gas-delivery customer administration
//!
//! `gasdepot` is a small business-administration backend for a gas-delivery
//! operation. It tracks customer accounts with a monthly liter allotment and
//! records the withdrawals staff make on their behalf, behind session-token
//! authentication.
//!
//! ## Overview
//!
//! Staff log in with username/password at `POST /login` and receive a signed
//! session token (also set as an http-only cookie for browser front-ends).
//! Every other endpoint requires the token in the `Authorization` header:
//!
//! - `GET /customers` lists active customers, with an optional
//!   case-insensitive `search` over name and address.
//! - `GET /customers/{id}` returns one active customer plus the sum of
//!   liters withdrawn in the current calendar month.
//! - `POST /customers` (administrators only) creates a customer whose
//!   available balance starts equal to its monthly quota.
//! - `POST /withdrawals` records a liter withdrawal for a customer, stamped
//!   with the server's date/time and the acting user.
//! - `GET /withdrawals` lists the withdrawal history joined with customer
//!   and staff names, filterable by customer and date range.
//!
//! Customers are soft-deleted via their `active` flag and disappear from
//! every read path while the row persists. The `available_liters` balance is
//! initialized at creation and deliberately never decremented or checked
//! when withdrawals are recorded; the quota is informational for now.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses a single SQLite store file via SQLx. The **API
//! layer** ([`api`]) holds the route handlers and wire models. The
//! **authentication layer** ([`auth`]) issues and verifies stateless session
//! tokens and hashes passwords with Argon2. The **database layer** ([`db`])
//! uses one repository per table over a pooled connection; the schema is
//! migrated idempotently at startup and an initial admin user is seeded when
//! the users table is empty.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use gasdepot::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = gasdepot::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     gasdepot::telemetry::init_telemetry();
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    auth::password,
    db::{handlers::Users, models::users::UserCreateDBRequest},
    openapi::ApiDoc,
};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use config::CorsOrigin;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument, warn};
pub use types::{CustomerId, UserId, WithdrawalId};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// Each handler acquires its own connection from the pool for the duration
/// of the request; there is no other cross-request shared mutable state.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the gasdepot database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Seed the initial admin user on first startup.
///
/// Runs only when the users table is empty, so existing deployments are
/// never touched. Credentials come from configuration; if no admin password
/// is configured the account is created without a usable login and a
/// warning is emitted.
///
/// Returns the id of the seeded user, or `None` if seeding was skipped.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(config: &Config, db: &SqlitePool) -> anyhow::Result<Option<UserId>> {
    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if user_repo.count().await? > 0 {
        return Ok(None);
    }

    let password_hash = match config.admin_password.as_deref() {
        Some(admin_password) => Some(
            password::hash_string_with_params(admin_password, Some(config.auth.password.argon2_params()))
                .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?,
        ),
        None => {
            warn!("No admin_password configured; seeding admin user without a usable login");
            None
        }
    };

    let created = user_repo
        .create(&UserCreateDBRequest {
            username: config.admin_username.clone(),
            password_hash,
            display_name: "Administrator".to_string(),
            is_admin: true,
        })
        .await?;

    tx.commit().await?;
    info!("Seeded initial admin user '{}'", created.username);

    Ok(Some(created.id))
}

/// Open the store file, run migrations, and seed initial data
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(&config.database.path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    migrator().run(&pool).await?;
    create_initial_admin_user(config, &pool).await?;

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.security.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            // Url serializes with a trailing slash, which Origin headers never carry
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.auth.security.cors.allow_credentials)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// Routes, CORS (including `OPTIONS` preflight handling), request tracing,
/// and the API docs UI at `/docs`.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/login", post(api::handlers::auth::login))
        .route(
            "/customers",
            get(api::handlers::customers::list_customers).post(api::handlers::customers::create_customer),
        )
        .route("/customers/{id}", get(api::handlers::customers::get_customer))
        .route(
            "/withdrawals",
            get(api::handlers::withdrawals::list_withdrawals).post(api::handlers::withdrawals::record_withdrawal),
        )
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] opens the store, runs migrations,
///    seeds the admin user, and builds the router
/// 2. **Serve**: [`Application::serve`] binds the TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = setup_database(&config).await?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("gasdepot listening on http://{}", bind_addr);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{auth_header, create_test_app, create_test_config, create_test_user};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn test_healthz_is_public(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server.get("/healthz").await;
        assert_eq!(response.status_code().as_u16(), 200);
        assert_eq!(response.text(), "OK");
    }

    #[sqlx::test]
    async fn test_protected_routes_require_token(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        for path in ["/customers", "/customers/1", "/withdrawals"] {
            let response = server.get(path).await;
            assert_eq!(response.status_code(), StatusCode::FORBIDDEN, "path: {path}");
        }
    }

    #[sqlx::test]
    async fn test_admin_seeding_runs_only_on_empty_table(pool: SqlitePool) {
        let config = create_test_config();

        let seeded = create_initial_admin_user(&config, &pool).await.unwrap();
        assert!(seeded.is_some());

        // Second boot: users table is not empty, nothing happens
        let seeded_again = create_initial_admin_user(&config, &pool).await.unwrap();
        assert!(seeded_again.is_none());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await.unwrap();
        assert_eq!(count, 1);

        let (is_admin, password_hash): (bool, Option<String>) =
            sqlx::query_as("SELECT is_admin, password_hash FROM users WHERE username = 'admin'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(is_admin);
        // Stored credential is an Argon2 hash, never the configured plaintext
        let password_hash = password_hash.unwrap();
        assert!(password_hash.starts_with("$argon2id$"));
        assert_ne!(password_hash, config.admin_password.unwrap());
    }

    #[sqlx::test]
    async fn test_seeded_admin_can_log_in_and_create_customers(pool: SqlitePool) {
        let config = create_test_config();
        create_initial_admin_user(&config, &pool).await.unwrap();
        let server = create_test_app(pool).await;

        let response = server
            .post("/login")
            .json(&json!({"username": "admin", "password": "admin-password-123"}))
            .await;
        response.assert_status_ok();
        let body: crate::api::models::auth::AuthResponse = response.json();
        assert!(body.user.is_admin);

        let response = server
            .post("/customers")
            .add_header("authorization", format!("Bearer {}", body.token))
            .json(&json!({"name": "Acme", "monthly_quota": 100.0}))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    #[sqlx::test]
    async fn test_cors_preflight_is_answered(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server
            .method(axum::http::Method::OPTIONS, "/customers")
            .add_header("origin", "http://localhost:3000")
            .add_header("access-control-request-method", "GET")
            .add_header("access-control-request-headers", "authorization")
            .await;

        // Preflight succeeds without hitting the auth gate
        assert!(response.status_code().is_success());
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(response.headers().get("access-control-allow-credentials").unwrap(), "true");
    }

    #[sqlx::test]
    async fn test_cors_headers_on_simple_request(pool: SqlitePool) {
        let staff = create_test_user(&pool, "clerk", "password-123", false).await;
        let server = create_test_app(pool).await;

        let response = server
            .get("/customers")
            .add_header("origin", "http://localhost:3000")
            .add_header("authorization", auth_header(&staff))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );

        // Unknown origins get no CORS grant
        let response = server
            .get("/customers")
            .add_header("origin", "http://evil.example.com")
            .add_header("authorization", auth_header(&staff))
            .await;
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_application_boots_from_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = create_test_config();
        config.database.path = dir.path().join("gasdepot-test.db");

        let app = Application::new(config).await.expect("Application::new should succeed");
        let server = app.into_test_server();

        let response = server.get("/healthz").await;
        assert_eq!(response.status_code().as_u16(), 200);

        // The seeded admin from the fresh store file can log in
        let response = server
            .post("/login")
            .json(&json!({"username": "admin", "password": "admin-password-123"}))
            .await;
        response.assert_status_ok();
    }

    #[sqlx::test]
    async fn test_docs_ui_is_served(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server.get("/docs").await;
        assert!(response.status_code().is_success());
    }
}
