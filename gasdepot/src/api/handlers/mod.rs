//! HTTP request handlers for all API endpoints.
//!
//! Each handler validates the request, runs the business logic through the
//! repositories in [`crate::db::handlers`], and shapes the JSON response.
//! Protected handlers take the [`crate::api::models::users::CurrentUser`]
//! extractor, which rejects unauthenticated requests before the handler
//! body runs. Errors convert to JSON responses via [`crate::errors::Error`].

pub mod auth;
pub mod customers;
pub mod withdrawals;
