//! Store selection from configuration.

use std::sync::Arc;

use tracing::info;

use gigboard_core::config::{DatabaseConfig, StoreConfig, StoreProvider};
use gigboard_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryNotificationStore;
use crate::migration::run_migrations;
use crate::repositories::notification::PgNotificationStore;
use crate::store::NotificationStore;

/// Build the notification store named by `store.provider`.
///
/// The Postgres provider connects, runs pending migrations, and returns
/// the pool alongside the store so the caller can close it on shutdown.
pub async fn build_store(
    store: &StoreConfig,
    database: &DatabaseConfig,
) -> AppResult<(Arc<dyn NotificationStore>, Option<DatabasePool>)> {
    match store.provider {
        StoreProvider::Memory => {
            info!("Initializing in-memory notification store");
            Ok((Arc::new(MemoryNotificationStore::new()), None))
        }
        StoreProvider::Postgres => {
            info!("Initializing PostgreSQL notification store");
            let db = DatabasePool::connect(database).await?;
            run_migrations(db.pool()).await?;
            let store = PgNotificationStore::new(db.pool().clone());
            Ok((Arc::new(store), Some(db)))
        }
    }
}
