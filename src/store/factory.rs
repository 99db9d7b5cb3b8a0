//! Store backend factory

use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::postgres::PostgresPool;

use super::backend::Store;
use super::memory_backend::MemoryStore;
use super::postgres_backend::PostgresStore;

/// Create a store backend based on configuration.
///
/// - `"postgres"`: a `PostgresStore` over the given pool
/// - `"memory"` (default): a `MemoryStore`
///
/// The caller opens the pool, so a missing or unreachable database is
/// reported before this is reached.
///
/// # Example
///
/// ```rust,ignore
/// let pool = PostgresPool::connect(&settings.database).await?;
/// let store = create_store(&settings.database, Some(&pool));
/// ```
pub fn create_store(
    config: &DatabaseConfig,
    postgres_pool: Option<&PostgresPool>,
) -> Arc<dyn Store> {
    match config.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(
                    backend = "postgres",
                    url = %pool.database_url_masked(),
                    "Creating PostgreSQL store"
                );
                Arc::new(PostgresStore::new(pool.pool().clone()))
            } else {
                tracing::warn!(
                    "PostgreSQL backend requested but no pool provided, falling back to memory"
                );
                Arc::new(MemoryStore::new())
            }
        }
        other => {
            if other != "memory" {
                tracing::warn!(backend = %other, "Unknown store backend, using memory");
            }
            tracing::info!(backend = "memory", "Creating memory store");
            Arc::new(MemoryStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_by_default() {
        let store = create_store(&DatabaseConfig::default(), None);
        assert_eq!(store.backend_type(), "memory");
    }

    #[test]
    fn test_postgres_without_pool_falls_back() {
        let config = DatabaseConfig {
            backend: "postgres".to_string(),
            ..Default::default()
        };
        let store = create_store(&config, None);
        assert_eq!(store.backend_type(), "memory");
    }
}
