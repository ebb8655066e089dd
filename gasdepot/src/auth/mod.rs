//! Authentication and authorization.
//!
//! Staff log in with username/password at `POST /login` and receive a signed
//! session token, both in the response body and as an http-only cookie.
//! Every other endpoint requires the token in the `Authorization` header as
//! a two-part `<scheme> <token>` value; the [`current_user`] extractor
//! verifies it and hands the decoded identity to the handler. Tokens are
//! stateless - there is no server-side session store, and expiry is the only
//! invalidation mechanism.
//!
//! # Modules
//!
//! - [`current_user`]: extractor for the authenticated user in handlers
//! - [`password`]: password hashing and verification using Argon2
//! - [`session`]: session token creation and verification

pub mod current_user;
pub mod password;
pub mod session;
