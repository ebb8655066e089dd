//! Database models for withdrawal events.

use crate::types::{CustomerId, UserId, WithdrawalId};
use chrono::{NaiveDate, NaiveTime};
use sqlx::FromRow;

/// Database request for recording a withdrawal.
///
/// `recorded_on`/`recorded_at` are stamped by the server at insertion time,
/// never taken from the client.
#[derive(Debug, Clone)]
pub struct WithdrawalCreateDBRequest {
    pub customer_id: CustomerId,
    pub liters: f64,
    pub recorded_on: NaiveDate,
    pub recorded_at: NaiveTime,
    pub recorded_by: UserId,
}

/// Database response for a withdrawal row
#[derive(Debug, Clone, FromRow)]
pub struct WithdrawalDBResponse {
    pub id: WithdrawalId,
    pub customer_id: CustomerId,
    pub recorded_on: NaiveDate,
    pub recorded_at: NaiveTime,
    pub liters: f64,
    pub recorded_by: UserId,
}

/// Database response for a withdrawal joined with the customer name and the
/// recording user's display name, as returned by the history listing.
#[derive(Debug, Clone, FromRow)]
pub struct WithdrawalHistoryDBResponse {
    pub id: WithdrawalId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub recorded_on: NaiveDate,
    pub recorded_at: NaiveTime,
    pub liters: f64,
    pub recorded_by: UserId,
    pub recorded_by_name: String,
}
