//! Database repository for withdrawal events.

use crate::db::{
    errors::Result,
    models::withdrawals::{WithdrawalCreateDBRequest, WithdrawalDBResponse, WithdrawalHistoryDBResponse},
};
use crate::types::CustomerId;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::instrument;

/// Filter for listing withdrawals. Date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct WithdrawalFilter {
    pub customer_id: Option<CustomerId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub struct Withdrawals<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Withdrawals<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(customer_id = request.customer_id, liters = request.liters), err)]
    pub async fn create(&mut self, request: &WithdrawalCreateDBRequest) -> Result<WithdrawalDBResponse> {
        let withdrawal = sqlx::query_as::<_, WithdrawalDBResponse>(
            r#"
            INSERT INTO withdrawals (customer_id, recorded_on, recorded_at, liters, recorded_by)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.customer_id)
        .bind(request.recorded_on)
        .bind(request.recorded_at)
        .bind(request.liters)
        .bind(request.recorded_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(withdrawal)
    }

    /// List withdrawals joined with the customer name and the recording
    /// user's display name, most recent first.
    #[instrument(skip(self, filter), err)]
    pub async fn list(&mut self, filter: &WithdrawalFilter) -> Result<Vec<WithdrawalHistoryDBResponse>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT w.id, w.customer_id, c.name AS customer_name,
                   w.recorded_on, w.recorded_at, w.liters,
                   w.recorded_by, u.display_name AS recorded_by_name
            FROM withdrawals w
            JOIN customers c ON w.customer_id = c.id
            JOIN users u ON w.recorded_by = u.id
            WHERE 1 = 1
            "#,
        );

        if let Some(customer_id) = filter.customer_id {
            query.push(" AND w.customer_id = ");
            query.push_bind(customer_id);
        }
        if let Some(start_date) = filter.start_date {
            query.push(" AND w.recorded_on >= ");
            query.push_bind(start_date);
        }
        if let Some(end_date) = filter.end_date {
            query.push(" AND w.recorded_on <= ");
            query.push_bind(end_date);
        }

        query.push(" ORDER BY w.recorded_on DESC, w.recorded_at DESC");

        let withdrawals = query
            .build_query_as::<WithdrawalHistoryDBResponse>()
            .fetch_all(&mut *self.db)
            .await?;

        Ok(withdrawals)
    }
}
