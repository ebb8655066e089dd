//! API models for withdrawal events.

use crate::db::models::withdrawals::{WithdrawalDBResponse, WithdrawalHistoryDBResponse};
use crate::types::{CustomerId, UserId, WithdrawalId};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Request body for recording a withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalCreate {
    pub customer_id: Option<CustomerId>,
    pub liters: Option<f64>,
}

/// A recorded withdrawal, as returned on creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalResponse {
    pub id: WithdrawalId,
    pub customer_id: CustomerId,
    pub recorded_on: NaiveDate,
    pub recorded_at: NaiveTime,
    pub liters: f64,
    pub recorded_by: UserId,
}

/// A withdrawal in the history listing, joined with the customer name and
/// the recording user's display name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalHistoryResponse {
    pub id: WithdrawalId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub recorded_on: NaiveDate,
    pub recorded_at: NaiveTime,
    pub liters: f64,
    pub recorded_by: UserId,
    pub recorded_by_name: String,
}

/// Query parameters for listing withdrawals. Date bounds are inclusive.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListWithdrawalsQuery {
    pub customer_id: Option<CustomerId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<WithdrawalDBResponse> for WithdrawalResponse {
    fn from(db: WithdrawalDBResponse) -> Self {
        Self {
            id: db.id,
            customer_id: db.customer_id,
            recorded_on: db.recorded_on,
            recorded_at: db.recorded_at,
            liters: db.liters,
            recorded_by: db.recorded_by,
        }
    }
}

impl From<WithdrawalHistoryDBResponse> for WithdrawalHistoryResponse {
    fn from(db: WithdrawalHistoryDBResponse) -> Self {
        Self {
            id: db.id,
            customer_id: db.customer_id,
            customer_name: db.customer_name,
            recorded_on: db.recorded_on,
            recorded_at: db.recorded_at,
            liters: db.liters,
            recorded_by: db.recorded_by,
            recorded_by_name: db.recorded_by_name,
        }
    }
}
