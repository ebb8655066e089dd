//! Test utilities for integration testing (available with `test-utils` feature).

use axum_test::TestServer;
use sqlx::SqlitePool;

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{password, session},
    config::Config,
    db::{
        handlers::{Customers, Users},
        models::{
            customers::{CustomerCreateDBRequest, CustomerDBResponse},
            users::{UserCreateDBRequest, UserDBResponse},
        },
    },
};

pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        admin_username: "admin".to_string(),
        admin_password: Some("admin-password-123".to_string()),
        ..Default::default()
    }
}

pub fn create_test_state(pool: SqlitePool) -> AppState {
    AppState::builder().db(pool).config(create_test_config()).build()
}

pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    let state = create_test_state(pool);
    let router = crate::build_router(state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

pub async fn create_test_user(pool: &SqlitePool, username: &str, user_password: &str, is_admin: bool) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);

    let password_hash = password::hash_string(user_password).expect("Failed to hash test password");

    users_repo
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            password_hash: Some(password_hash),
            display_name: format!("{username} (test)"),
            is_admin,
        })
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_customer(pool: &SqlitePool, name: &str, monthly_quota: f64) -> CustomerDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut customers_repo = Customers::new(&mut conn);

    customers_repo
        .create(&CustomerCreateDBRequest {
            name: name.to_string(),
            address: None,
            phone: None,
            monthly_quota,
        })
        .await
        .expect("Failed to create test customer")
}

/// `Authorization` header value carrying a fresh session token for the user.
pub fn auth_header(user: &UserDBResponse) -> String {
    let token = session::create_session_token(&CurrentUser::from(user), &create_test_config()).expect("Failed to create session token");
    format!("Bearer {token}")
}
