//! Database repository for customers.

use crate::db::{
    errors::Result,
    models::customers::{CustomerCreateDBRequest, CustomerDBResponse},
};
use crate::types::CustomerId;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::instrument;

/// Filter for listing customers
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    /// Substring match on name OR address (case-insensitive)
    pub search: Option<String>,
}

pub struct Customers<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Customers<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    pub async fn create(&mut self, request: &CustomerCreateDBRequest) -> Result<CustomerDBResponse> {
        // available_liters starts out equal to the monthly quota and is not
        // updated by any later operation.
        let customer = sqlx::query_as::<_, CustomerDBResponse>(
            r#"
            INSERT INTO customers (name, address, phone, monthly_quota, available_liters)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.phone)
        .bind(request.monthly_quota)
        .bind(request.monthly_quota)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(customer)
    }

    /// Fetch one customer; soft-deleted rows are treated as absent.
    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: CustomerId) -> Result<Option<CustomerDBResponse>> {
        let customer = sqlx::query_as::<_, CustomerDBResponse>("SELECT * FROM customers WHERE id = ? AND active = 1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(customer)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn list(&mut self, filter: &CustomerFilter) -> Result<Vec<CustomerDBResponse>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM customers WHERE active = 1");

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            // LIKE is case-insensitive for ASCII in SQLite
            let pattern = format!("%{search}%");
            query.push(" AND (name LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR address LIKE ");
            query.push_bind(pattern);
            query.push(")");
        }

        query.push(" ORDER BY name");

        let customers = query.build_query_as::<CustomerDBResponse>().fetch_all(&mut *self.db).await?;

        Ok(customers)
    }

    /// Sum of withdrawal liters for a customer over an inclusive date window.
    #[instrument(skip(self), err)]
    pub async fn withdrawn_between(&mut self, id: CustomerId, start: NaiveDate, end: NaiveDate) -> Result<f64> {
        let total = sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(SUM(liters), 0.0) FROM withdrawals WHERE customer_id = ? AND recorded_on BETWEEN ? AND ?",
        )
        .bind(id)
        .bind(start)
        .bind(end)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(total)
    }
}
