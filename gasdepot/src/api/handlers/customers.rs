use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Datelike, Months, NaiveDate, Utc};

use crate::{
    AppState,
    api::models::{
        customers::{CustomerCreate, CustomerDetailResponse, CustomerResponse, ListCustomersQuery},
        users::CurrentUser,
    },
    db::{
        handlers::{Customers, customers::CustomerFilter},
        models::customers::CustomerCreateDBRequest,
    },
    errors::{Error, Result},
    types::CustomerId,
};

/// List active customers
#[utoipa::path(
    get,
    path = "/customers",
    tag = "customers",
    params(ListCustomersQuery),
    responses(
        (status = 200, description = "List of active customers", body = Vec<CustomerResponse>),
        (status = 403, description = "Not authenticated"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_customers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListCustomersQuery>,
) -> Result<Json<Vec<CustomerResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Customers::new(&mut conn);

    let customers = repo.list(&CustomerFilter { search: query.search }).await?;

    Ok(Json(customers.into_iter().map(CustomerResponse::from).collect()))
}

/// Get one customer with this month's withdrawal aggregate
#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = i64, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer detail", body = CustomerDetailResponse),
        (status = 403, description = "Not authenticated"),
        (status = 404, description = "Customer missing or inactive"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(customer_id = id))]
pub async fn get_customer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<CustomerId>,
) -> Result<Json<CustomerDetailResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Customers::new(&mut conn);

    let customer = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "customer".to_string(),
        id: id.to_string(),
    })?;

    let (month_start, month_end) = month_window(Utc::now().date_naive());
    let withdrawn_this_month = repo.withdrawn_between(id, month_start, month_end).await?;

    Ok(Json(CustomerDetailResponse::new(customer, withdrawn_this_month)))
}

/// Create a customer (administrators only)
#[utoipa::path(
    post,
    path = "/customers",
    request_body = CustomerCreate,
    tag = "customers",
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Invalid customer data"),
        (status = 403, description = "Not authenticated or not an administrator"),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn create_customer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CustomerCreate>,
) -> Result<(StatusCode, Json<CustomerResponse>)> {
    if !current_user.is_admin {
        return Err(Error::Forbidden {
            message: Some("Only administrators can create customers".to_string()),
        });
    }

    let Some(name) = request.name.filter(|n| !n.trim().is_empty()) else {
        return Err(Error::BadRequest {
            message: "name is required".to_string(),
        });
    };

    let monthly_quota = request.monthly_quota.unwrap_or(0.0);
    if monthly_quota < 0.0 {
        return Err(Error::BadRequest {
            message: "monthly_quota must not be negative".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let created = {
        let mut repo = Customers::new(&mut tx);
        repo.create(&CustomerCreateDBRequest {
            name,
            address: request.address,
            phone: request.phone,
            monthly_quota,
        })
        .await?
    };
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// First and last day of the month containing `today`, both inclusive.
fn month_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).expect("first day of month is always valid");
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next_month| next_month.pred_opt())
        .expect("last day of month is always valid");
    (start, end)
}
