//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut SqliteConnection` (a pool connection or a
//! transaction, via deref), owns the queries for one table, and returns the
//! record structs from [`crate::db::models`]. The entities in this system
//! are create/read-only, so repositories expose only the operations the API
//! actually performs.

pub mod customers;
pub mod users;
pub mod withdrawals;

pub use customers::Customers;
pub use users::Users;
pub use withdrawals::Withdrawals;
