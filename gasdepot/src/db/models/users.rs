//! Database models for users.

use crate::types::UserId;
use chrono::NaiveDateTime;
use sqlx::FromRow;

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    /// Argon2 PHC string. `None` leaves the account without a usable login.
    pub password_hash: Option<String>,
    pub display_name: String,
    pub is_admin: bool,
}

/// Database response for a user
#[derive(Debug, Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub password_hash: Option<String>,
    pub display_name: String,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
}
