//! Notification store factory

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::postgres::PostgresPool;

use super::memory_store::MemoryNotificationStore;
use super::postgres_store::PostgresNotificationStore;
use super::store::NotificationStore;

/// Create a notification store based on configuration.
///
/// - `"postgres"`: a `PostgresNotificationStore` if a pool is provided
/// - `"memory"` (default): a `MemoryNotificationStore`
pub fn create_notification_store(
    settings: &StoreConfig,
    postgres_pool: Option<&PostgresPool>,
) -> Arc<dyn NotificationStore> {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(backend = "postgres", "Creating PostgreSQL notification store");
                Arc::new(PostgresNotificationStore::new(pool.pool().clone()))
            } else {
                tracing::warn!(
                    "PostgreSQL store requested but no pool provided, falling back to memory"
                );
                Arc::new(MemoryNotificationStore::new())
            }
        }
        _ => {
            tracing::info!(backend = "memory", "Creating memory notification store");
            Arc::new(MemoryNotificationStore::new())
        }
    }
}
