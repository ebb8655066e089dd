//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: axum route handlers for all endpoints
//! - **[`models`]**: request/response structures for API communication
//!
//! All endpoints except `POST /login` and `GET /healthz` require an
//! authenticated user. OpenAPI documentation is served at `/docs`.

pub mod handlers;
pub mod models;
