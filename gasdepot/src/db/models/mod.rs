//! Database record models matching table schemas.
//!
//! Each `*DBResponse` struct maps a table row (derives `sqlx::FromRow`);
//! each `*CreateDBRequest` carries the values a repository inserts. Database
//! models are kept distinct from the API models in [`crate::api::models`] so
//! storage and wire representations can evolve independently.

pub mod customers;
pub mod users;
pub mod withdrawals;
