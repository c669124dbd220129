pub mod app_config;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use rently_core::Store;

pub use app_config::Config;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Deployment-time backend choice; never switched mid-process.
pub async fn build_store(config: &Config) -> Result<Arc<dyn Store>, sqlx::Error> {
    match config.store.backend.as_str() {
        "postgres" => {
            tracing::info!("Connecting to PostgreSQL store");
            let store = PgStore::connect(&config.store.database_url).await?;
            store.init_schema().await?;
            Ok(Arc::new(store))
        }
        _ => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
