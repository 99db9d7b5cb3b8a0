//! PostgreSQL connection pooling.

pub mod pool;

pub use pool::{PostgresPool, PostgresPoolError};
