//! OpenAPI document for the management API, served at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::models::{
    auth::{AuthResponse, LoginRequest},
    customers::{CustomerCreate, CustomerDetailResponse, CustomerResponse},
    users::UserSummary,
    withdrawals::{WithdrawalCreate, WithdrawalHistoryResponse, WithdrawalResponse},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::auth::login,
        crate::api::handlers::customers::list_customers,
        crate::api::handlers::customers::get_customer,
        crate::api::handlers::customers::create_customer,
        crate::api::handlers::withdrawals::record_withdrawal,
        crate::api::handlers::withdrawals::list_withdrawals,
    ),
    components(schemas(
        LoginRequest,
        AuthResponse,
        UserSummary,
        CustomerCreate,
        CustomerResponse,
        CustomerDetailResponse,
        WithdrawalCreate,
        WithdrawalResponse,
        WithdrawalHistoryResponse,
    )),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "customers", description = "Customer accounts"),
        (name = "withdrawals", description = "Withdrawal events"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "BearerAuth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
