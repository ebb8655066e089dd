//! Database models for customers.

use crate::types::CustomerId;
use chrono::NaiveDateTime;
use sqlx::FromRow;

/// Database request for creating a new customer
#[derive(Debug, Clone)]
pub struct CustomerCreateDBRequest {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub monthly_quota: f64,
}

/// Database response for a customer
#[derive(Debug, Clone, FromRow)]
pub struct CustomerDBResponse {
    pub id: CustomerId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub monthly_quota: f64,
    /// Set equal to `monthly_quota` at creation; not maintained as a running
    /// balance by any code path.
    pub available_liters: f64,
    pub active: bool,
    pub created_at: NaiveDateTime,
}
