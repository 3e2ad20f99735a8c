//! PostgreSQL persistence module.
//!
//! Provides the connection pool and the `users` table record store.

pub mod pool;
pub mod records;

pub use pool::{PostgresPool, PostgresPoolError};
pub use records::PgRecordStore;
