//! API models for customers.

use crate::db::models::customers::CustomerDBResponse;
use crate::types::CustomerId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Request body for creating a customer.
///
/// Only `name` is required; a missing quota defaults to 0.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerCreate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub monthly_quota: Option<f64>,
}

/// Customer as returned by list and create.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerResponse {
    pub id: CustomerId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub monthly_quota: f64,
    /// Equal to `monthly_quota` since creation; recording a withdrawal does
    /// not decrement it.
    pub available_liters: f64,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// Customer detail: the record plus this month's withdrawal aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerDetailResponse {
    #[serde(flatten)]
    pub customer: CustomerResponse,
    /// Sum of withdrawal liters dated within the current calendar month,
    /// both boundaries inclusive.
    pub withdrawn_this_month: f64,
}

/// Query parameters for listing customers
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCustomersQuery {
    /// Case-insensitive substring match on name OR address
    pub search: Option<String>,
}

impl From<CustomerDBResponse> for CustomerResponse {
    fn from(db: CustomerDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            address: db.address,
            phone: db.phone,
            monthly_quota: db.monthly_quota,
            available_liters: db.available_liters,
            active: db.active,
            created_at: db.created_at,
        }
    }
}

impl CustomerDetailResponse {
    pub fn new(customer: CustomerDBResponse, withdrawn_this_month: f64) -> Self {
        Self {
            customer: customer.into(),
            withdrawn_this_month,
        }
    }
}
