use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;
use crate::state::{InMemoryStore, PropertyStore, RedisStore};
use std::sync::Arc;

/// Create a property store based on configuration
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn PropertyStore>> {
    match config.backend {
        StoreBackend::Redis => {
            tracing::info!(url = %config.redis_url, "Initializing Redis storage backend");

            let store = RedisStore::new(&config.redis_url).await?;
            Ok(Arc::new(store))
        }

        StoreBackend::Memory => Ok(create_in_memory_store()),
    }
}

/// Create an in-memory store (for testing and development)
pub fn create_in_memory_store() -> Arc<dyn PropertyStore> {
    tracing::info!("Initializing in-memory storage backend");
    Arc::new(InMemoryStore::new())
}
