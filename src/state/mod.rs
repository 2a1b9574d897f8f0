pub mod store;
pub mod redis_store;
pub mod factory;

pub use store::*;
pub use redis_store::RedisStore;
pub use factory::{create_in_memory_store, create_store};

use crate::error::Result;
use crate::models::Property;
use crate::search::{IndexSchema, QueryPlan};
use async_trait::async_trait;
use std::collections::HashMap;

/// Key of the persisted readiness flag
pub const READY_KEY: &str = "load-complete";

/// Operations the catalog needs from the external document store
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Whether the readiness flag has been set
    async fn is_load_complete(&self) -> Result<bool>;

    /// Set the readiness flag; it is never cleared
    async fn mark_load_complete(&self) -> Result<()>;

    /// Store a zip geocode as `"lon lat"`, overwriting any previous value
    async fn put_zip(&self, zip: &str, coords: &str) -> Result<()>;

    /// Fetch a zip geocode
    async fn get_zip(&self, zip: &str) -> Result<Option<String>>;

    /// Write one property document atomically
    async fn put_property(&self, property: &Property) -> Result<()>;

    /// Drop a search index; fails if it does not exist
    async fn drop_index(&self, name: &str) -> Result<()>;

    /// Create a search index
    async fn create_index(&self, schema: &IndexSchema) -> Result<()>;

    /// Run a query plan against an index, returning rows in store order
    async fn aggregate(&self, index: &str, plan: &QueryPlan) -> Result<Vec<AggregateRow>>;
}

/// One row of an aggregation reply: loaded field name to raw value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateRow {
    fields: HashMap<String, String>,
}

impl AggregateRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}
