use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    api::models::{
        users::CurrentUser,
        withdrawals::{ListWithdrawalsQuery, WithdrawalCreate, WithdrawalHistoryResponse, WithdrawalResponse},
    },
    db::{
        handlers::{Customers, Withdrawals, withdrawals::WithdrawalFilter},
        models::withdrawals::WithdrawalCreateDBRequest,
    },
    errors::{Error, Result},
};

/// Record a withdrawal for a customer.
///
/// The event is stamped with the server's current date/time and the calling
/// user's id. The customer's `available_liters` balance is intentionally
/// left untouched; withdrawals are recorded, not settled against the quota.
#[utoipa::path(
    post,
    path = "/withdrawals",
    request_body = WithdrawalCreate,
    tag = "withdrawals",
    responses(
        (status = 201, description = "Withdrawal recorded", body = WithdrawalResponse),
        (status = 400, description = "Invalid withdrawal data"),
        (status = 403, description = "Not authenticated"),
        (status = 404, description = "Customer missing or inactive"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn record_withdrawal(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<WithdrawalCreate>,
) -> Result<(StatusCode, Json<WithdrawalResponse>)> {
    let Some(customer_id) = request.customer_id else {
        return Err(Error::BadRequest {
            message: "customer_id is required".to_string(),
        });
    };

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    {
        let mut customers = Customers::new(&mut tx);
        if customers.get_by_id(customer_id).await?.is_none() {
            return Err(Error::NotFound {
                resource: "customer".to_string(),
                id: customer_id.to_string(),
            });
        }
    }

    let liters = request.liters.unwrap_or(0.0);
    if liters <= 0.0 {
        return Err(Error::BadRequest {
            message: "liters must be greater than zero".to_string(),
        });
    }

    let now = Utc::now();
    let created = {
        let mut repo = Withdrawals::new(&mut tx);
        repo.create(&WithdrawalCreateDBRequest {
            customer_id,
            liters,
            recorded_on: now.date_naive(),
            recorded_at: now.time(),
            recorded_by: current_user.id,
        })
        .await?
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List withdrawals, most recent first
#[utoipa::path(
    get,
    path = "/withdrawals",
    tag = "withdrawals",
    params(ListWithdrawalsQuery),
    responses(
        (status = 200, description = "Withdrawal history", body = Vec<WithdrawalHistoryResponse>),
        (status = 403, description = "Not authenticated"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_withdrawals(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListWithdrawalsQuery>,
) -> Result<Json<Vec<WithdrawalHistoryResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Withdrawals::new(&mut conn);

    let withdrawals = repo
        .list(&WithdrawalFilter {
            customer_id: query.customer_id,
            start_date: query.start_date,
            end_date: query.end_date,
        })
        .await?;

    Ok(Json(withdrawals.into_iter().map(WithdrawalHistoryResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{auth_header, create_test_app, create_test_customer, create_test_user};
    use serde_json::json;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn test_record_and_list_most_recent_first(pool: SqlitePool) {
        let staff = create_test_user(&pool, "clerk", "password-123", false).await;
        let customer = create_test_customer(&pool, "Acme", 100.0).await;
        let server = create_test_app(pool.clone()).await;

        for liters in [5.0, 7.5] {
            let response = server
                .post("/withdrawals")
                .add_header("authorization", auth_header(&staff))
                .json(&json!({"customer_id": customer.id, "liters": liters}))
                .await;
            response.assert_status(StatusCode::CREATED);

            let created: WithdrawalResponse = response.json();
            assert_eq!(created.customer_id, customer.id);
            assert_eq!(created.liters, liters);
            assert_eq!(created.recorded_by, staff.id);
            // Server-assigned stamp, not client-supplied
            assert_eq!(created.recorded_on, Utc::now().date_naive());
        }

        let response = server.get("/withdrawals").add_header("authorization", auth_header(&staff)).await;
        response.assert_status_ok();
        let listed: Vec<WithdrawalHistoryResponse> = response.json();
        assert_eq!(listed.len(), 2);
        // Most recent insertion first
        assert_eq!(listed[0].liters, 7.5);
        assert_eq!(listed[1].liters, 5.0);
        assert_eq!(listed[0].customer_name, "Acme");
        assert_eq!(listed[0].recorded_by_name, staff.display_name);

        // Recording withdrawals never touches the available balance
        let balance: f64 = sqlx::query_scalar("SELECT available_liters FROM customers WHERE id = ?")
            .bind(customer.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(balance, 100.0);
    }

    #[sqlx::test]
    async fn test_record_rejects_non_positive_liters(pool: SqlitePool) {
        let staff = create_test_user(&pool, "clerk", "password-123", false).await;
        let customer = create_test_customer(&pool, "Acme", 100.0).await;
        let server = create_test_app(pool).await;

        for liters in [0.0, -3.0] {
            let response = server
                .post("/withdrawals")
                .add_header("authorization", auth_header(&staff))
                .json(&json!({"customer_id": customer.id, "liters": liters}))
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
        }

        // Missing liters behaves like zero
        let response = server
            .post("/withdrawals")
            .add_header("authorization", auth_header(&staff))
            .json(&json!({"customer_id": customer.id}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_record_rejects_missing_or_inactive_customer(pool: SqlitePool) {
        let staff = create_test_user(&pool, "clerk", "password-123", false).await;
        let customer = create_test_customer(&pool, "Acme", 100.0).await;

        sqlx::query("UPDATE customers SET active = 0 WHERE id = ?")
            .bind(customer.id)
            .execute(&pool)
            .await
            .unwrap();

        let server = create_test_app(pool).await;

        let response = server
            .post("/withdrawals")
            .add_header("authorization", auth_header(&staff))
            .json(&json!({"customer_id": 999999, "liters": 5.0}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .post("/withdrawals")
            .add_header("authorization", auth_header(&staff))
            .json(&json!({"customer_id": customer.id, "liters": 5.0}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn test_record_requires_customer_id(pool: SqlitePool) {
        let staff = create_test_user(&pool, "clerk", "password-123", false).await;
        let server = create_test_app(pool).await;

        let response = server
            .post("/withdrawals")
            .add_header("authorization", auth_header(&staff))
            .json(&json!({"liters": 5.0}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    async fn test_list_filters_by_customer(pool: SqlitePool) {
        let staff = create_test_user(&pool, "clerk", "password-123", false).await;
        let acme = create_test_customer(&pool, "Acme", 100.0).await;
        let borealis = create_test_customer(&pool, "Borealis", 50.0).await;
        let server = create_test_app(pool).await;

        for (customer_id, liters) in [(acme.id, 1.0), (borealis.id, 2.0), (acme.id, 3.0)] {
            server
                .post("/withdrawals")
                .add_header("authorization", auth_header(&staff))
                .json(&json!({"customer_id": customer_id, "liters": liters}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .get("/withdrawals")
            .add_query_param("customer_id", acme.id)
            .add_header("authorization", auth_header(&staff))
            .await;
        response.assert_status_ok();
        let listed: Vec<WithdrawalHistoryResponse> = response.json();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|w| w.customer_id == acme.id));
    }

    #[sqlx::test]
    async fn test_list_filters_by_date_range(pool: SqlitePool) {
        let staff = create_test_user(&pool, "clerk", "password-123", false).await;
        let customer = create_test_customer(&pool, "Acme", 100.0).await;

        // Insert directly to control dates
        let noon = "12:00:00".parse().unwrap();
        for date in ["2026-08-01", "2026-08-15", "2026-09-01"] {
            let mut conn = pool.acquire().await.unwrap();
            let mut repo = Withdrawals::new(&mut conn);
            repo.create(&WithdrawalCreateDBRequest {
                customer_id: customer.id,
                liters: 1.0,
                recorded_on: date.parse().unwrap(),
                recorded_at: noon,
                recorded_by: staff.id,
            })
            .await
            .unwrap();
        }

        let server = create_test_app(pool).await;
        let response = server
            .get("/withdrawals")
            .add_query_param("start_date", "2026-08-01")
            .add_query_param("end_date", "2026-08-31")
            .add_header("authorization", auth_header(&staff))
            .await;
        response.assert_status_ok();
        let listed: Vec<WithdrawalHistoryResponse> = response.json();
        assert_eq!(listed.len(), 2);
    }

    #[sqlx::test]
    async fn test_unauthenticated_requests_rejected(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        let response = server.get("/withdrawals").await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server.post("/withdrawals").json(&json!({"customer_id": 1, "liters": 5.0})).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }
}
