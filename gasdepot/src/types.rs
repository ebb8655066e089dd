//! Common type definitions.
//!
//! Entity identifiers are SQLite rowids wrapped in type aliases for better
//! readability at API boundaries:
//!
//! - [`UserId`]: staff account identifier
//! - [`CustomerId`]: customer account identifier
//! - [`WithdrawalId`]: withdrawal event identifier

pub type UserId = i64;
pub type CustomerId = i64;
pub type WithdrawalId = i64;
