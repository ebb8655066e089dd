use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, LoginRequest, LoginResponse},
        users::{CurrentUser, UserSummary},
    },
    auth::{password, session},
    db::handlers::Users,
    errors::{Error, Result},
};

/// Login with username and password
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse> {
    let (Some(username), Some(login_password)) = (request.username, request.password) else {
        return Err(Error::BadRequest {
            message: "username and password are required".to_string(),
        });
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut conn);

    let user = user_repo.get_by_username(&username).await?.ok_or(Error::InvalidCredentials)?;

    // Accounts seeded without a password cannot log in
    let password_hash = user.password_hash.clone().ok_or(Error::InvalidCredentials)?;

    // Verify password on a blocking thread to avoid blocking the async runtime
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&login_password, &password_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::InvalidCredentials);
    }

    let current_user = CurrentUser::from(&user);
    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(LoginResponse {
        auth_response: AuthResponse {
            token,
            user: UserSummary::from(user),
        },
        cookie,
    })
}

/// Helper function to create the session cookie
fn create_session_cookie(token: &str, config: &crate::config::Config) -> String {
    let session_config = &config.auth.session;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        session_config.cookie_name,
        token,
        session_config.cookie_same_site,
        session_config.timeout.as_secs()
    );
    if session_config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, create_test_config, create_test_user};
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn test_login_success_returns_token_and_cookie(pool: SqlitePool) {
        let user = create_test_user(&pool, "clerk", "hunter2-hunter2", false).await;
        let server = create_test_app(pool).await;

        let response = server
            .post("/login")
            .json(&json!({"username": "clerk", "password": "hunter2-hunter2"}))
            .await;

        response.assert_status(StatusCode::OK);

        let cookie = response
            .headers()
            .get("set-cookie")
            .expect("session cookie should be set")
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains(&format!("Max-Age={}", 8 * 60 * 60)));

        let body: AuthResponse = response.json();
        assert_eq!(body.user.id, user.id);
        assert_eq!(body.user.username, "clerk");
        assert!(!body.user.is_admin);

        // The token decodes back to the same identity with an ~8h expiry
        let config = create_test_config();
        let decoded = crate::auth::session::verify_session_token(&body.token, &config).unwrap();
        assert_eq!(decoded.id, user.id);
        assert!(!decoded.is_admin);
    }

    #[sqlx::test]
    async fn test_login_wrong_password(pool: SqlitePool) {
        create_test_user(&pool, "clerk", "correct-password", false).await;
        let server = create_test_app(pool).await;

        let response = server
            .post("/login")
            .json(&json!({"username": "clerk", "password": "wrong-password"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_login_unknown_user(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server
            .post("/login")
            .json(&json!({"username": "ghost", "password": "whatever1"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_login_missing_fields(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server.post("/login").json(&json!({"username": "clerk"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server.post("/login").json(&json!({"password": "hunter2"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server.post("/login").json(&json!({})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_login_user_without_password(pool: SqlitePool) {
        // Seeded accounts can lack a password hash entirely
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        users
            .create(&crate::db::models::users::UserCreateDBRequest {
                username: "nopass".to_string(),
                password_hash: None,
                display_name: "No Password".to_string(),
                is_admin: false,
            })
            .await
            .unwrap();
        drop(conn);

        let server = create_test_app(pool).await;
        let response = server
            .post("/login")
            .json(&json!({"username": "nopass", "password": "anything-at-all"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }
}
