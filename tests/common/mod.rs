//! Shared fixtures for integration tests
//!
//! Builds an in-memory store with the property index, a handful of
//! zip geocodes and hand-written properties whose availability is known.

#![allow(dead_code)]

use async_trait::async_trait;
use property_search::error::{AppError, Result};
use property_search::models::{Address, AvailabilityInterval, Owner, Property, PropertyType};
use property_search::search::{IndexSchema, QueryPlan, SearchService};
use property_search::state::{AggregateRow, InMemoryStore, PropertyStore};
use std::sync::Arc;
use std::time::Duration;

pub const INDEX: &str = "propIdx";

/// Downtown Denver
pub const DENVER_ZIP: &str = "80202";
pub const DENVER_COORDS: &str = "-104.9993 39.7527";

/// Roughly 25 miles from downtown Denver
pub const BOULDER_ZIP: &str = "80302";
pub const BOULDER_COORDS: &str = "-105.2705 40.0150";

pub fn property(
    id: u64,
    coords: &str,
    property_type: PropertyType,
    rate: f64,
    availability: Vec<(i64, i64)>,
) -> Property {
    Property {
        id,
        address: Address {
            coords: coords.to_string(),
            number: id.to_string(),
            street: "Larimer St".to_string(),
            unit: String::new(),
            city: "Denver".to_string(),
            state: "CO".to_string(),
            postcode: DENVER_ZIP.to_string(),
        },
        owner: Owner {
            fname: "Ada".to_string(),
            lname: "Lovelace".to_string(),
        },
        property_type,
        availability: availability
            .into_iter()
            .map(|(begin, end)| AvailabilityInterval::new(begin, end))
            .collect(),
        rate,
    }
}

/// Store with index and zips but no properties and no readiness flag
pub async fn empty_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store
        .create_index(&IndexSchema::property_index(INDEX))
        .await
        .unwrap();
    store.put_zip(DENVER_ZIP, DENVER_COORDS).await.unwrap();
    store.put_zip(BOULDER_ZIP, BOULDER_COORDS).await.unwrap();
    store
}

/// Ready store holding the given properties
pub async fn ready_store(properties: &[Property]) -> Arc<InMemoryStore> {
    let store = empty_store().await;
    for property in properties {
        store.put_property(property).await.unwrap();
    }
    store.mark_load_complete().await.unwrap();
    store
}

/// Three Denver offices available over `[1000, 5000]` at mixed rates,
/// plus noise that must never match an office search at that window
pub fn denver_catalog() -> Vec<Property> {
    vec![
        property(1, DENVER_COORDS, PropertyType::Office, 300.0, vec![(500, 6000)]),
        property(2, DENVER_COORDS, PropertyType::Office, 150.5, vec![(900, 5000)]),
        property(3, DENVER_COORDS, PropertyType::Office, 200.0, vec![(1000, 5000)]),
        // Starts one second too late
        property(4, DENVER_COORDS, PropertyType::Office, 130.0, vec![(1001, 9000)]),
        // Wrong type
        property(5, DENVER_COORDS, PropertyType::Court, 125.0, vec![(0, 10_000)]),
        // Out of range for small radii
        property(6, BOULDER_COORDS, PropertyType::Office, 126.0, vec![(0, 10_000)]),
    ]
}

pub fn service(store: Arc<InMemoryStore>) -> SearchService {
    SearchService::new(store, INDEX)
}

/// How [`FaultyStore`] answers aggregations
#[derive(Debug, Clone, Copy)]
pub enum AggregateFault {
    /// Sleep this long before answering from the inner store
    Stall(Duration),
    /// Fail with a store error
    Fail,
}

/// Ready store that delegates to an [`InMemoryStore`] except for aggregations
pub struct FaultyStore {
    inner: Arc<InMemoryStore>,
    fault: AggregateFault,
}

impl FaultyStore {
    pub async fn new(fault: AggregateFault) -> Self {
        Self {
            inner: ready_store(&denver_catalog()).await,
            fault,
        }
    }
}

#[async_trait]
impl PropertyStore for FaultyStore {
    async fn is_load_complete(&self) -> Result<bool> {
        self.inner.is_load_complete().await
    }

    async fn mark_load_complete(&self) -> Result<()> {
        self.inner.mark_load_complete().await
    }

    async fn put_zip(&self, zip: &str, coords: &str) -> Result<()> {
        self.inner.put_zip(zip, coords).await
    }

    async fn get_zip(&self, zip: &str) -> Result<Option<String>> {
        self.inner.get_zip(zip).await
    }

    async fn put_property(&self, property: &Property) -> Result<()> {
        self.inner.put_property(property).await
    }

    async fn drop_index(&self, name: &str) -> Result<()> {
        self.inner.drop_index(name).await
    }

    async fn create_index(&self, schema: &IndexSchema) -> Result<()> {
        self.inner.create_index(schema).await
    }

    async fn aggregate(&self, index: &str, plan: &QueryPlan) -> Result<Vec<AggregateRow>> {
        match self.fault {
            AggregateFault::Stall(delay) => {
                tokio::time::sleep(delay).await;
                self.inner.aggregate(index, plan).await
            }
            AggregateFault::Fail => Err(AppError::Store("connection reset by peer".to_string())),
        }
    }
}

/// Search service over a [`FaultyStore`] with a short query timeout
pub async fn faulty_service(fault: AggregateFault) -> SearchService {
    SearchService::new(Arc::new(FaultyStore::new(fault).await), INDEX)
        .with_query_timeout(Duration::from_millis(50))
}
