use crate::error::{AppError, Result};
use crate::models::{GeoPoint, Property};
use crate::search::{
    FilterExpr, IndexSchema, LoadField, PipelineStage, QueryPlan, SortOrder, KEY_FIELD,
    RATE_FIELD,
};
use crate::state::{AggregateRow, PropertyStore, READY_KEY};
use async_trait::async_trait;
use dashmap::DashMap;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Operation counters, for tests and diagnostics
#[derive(Debug, Default)]
struct StoreCounters {
    zip_lookups: AtomicU64,
    aggregations: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub zip_lookups: u64,
    pub aggregations: u64,
}

/// In-memory property store (for development and testing)
///
/// Evaluates query plans in-process with the same semantics the Redis
/// index applies: tag match, great-circle radius, JSONPath element
/// selection, filter, sort and limit.
#[derive(Clone)]
pub struct InMemoryStore {
    strings: Arc<DashMap<String, String>>,
    properties: Arc<DashMap<String, Property>>,
    indexes: Arc<DashMap<String, IndexSchema>>,
    counters: Arc<StoreCounters>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            strings: Arc::new(DashMap::new()),
            properties: Arc::new(DashMap::new()),
            indexes: Arc::new(DashMap::new()),
            counters: Arc::new(StoreCounters::default()),
        }
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn zip_count(&self) -> usize {
        self.strings
            .iter()
            .filter(|entry| entry.key().starts_with(crate::models::ZIP_KEY_PREFIX))
            .count()
    }

    pub fn get_property(&self, key: &str) -> Option<Property> {
        self.properties.get(key).map(|entry| entry.clone())
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            zip_lookups: self.counters.zip_lookups.load(AtomicOrdering::Relaxed),
            aggregations: self.counters.aggregations.load(AtomicOrdering::Relaxed),
        }
    }

    fn matches_base(plan: &QueryPlan, property: &Property) -> bool {
        if property.property_type != plan.base.property_type {
            return false;
        }

        match GeoPoint::parse(&property.address.coords) {
            Some(point) => distance_miles(plan.base.center, point) <= plan.base.radius_miles,
            None => false,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Haversine distance between two points
fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

#[async_trait]
impl PropertyStore for InMemoryStore {
    async fn is_load_complete(&self) -> Result<bool> {
        Ok(self.strings.contains_key(READY_KEY))
    }

    async fn mark_load_complete(&self) -> Result<()> {
        self.strings.insert(READY_KEY.to_string(), "true".to_string());
        Ok(())
    }

    async fn put_zip(&self, zip: &str, coords: &str) -> Result<()> {
        self.strings
            .insert(crate::models::zip_key(zip), coords.to_string());
        Ok(())
    }

    async fn get_zip(&self, zip: &str) -> Result<Option<String>> {
        self.counters.zip_lookups.fetch_add(1, AtomicOrdering::Relaxed);
        Ok(self
            .strings
            .get(&crate::models::zip_key(zip))
            .map(|entry| entry.clone()))
    }

    async fn put_property(&self, property: &Property) -> Result<()> {
        self.properties.insert(property.key(), property.clone());
        tracing::trace!(key = %property.key(), "Property saved");
        Ok(())
    }

    async fn drop_index(&self, name: &str) -> Result<()> {
        match self.indexes.remove(name) {
            Some(_) => Ok(()),
            None => Err(AppError::Store(format!("Unknown index name: {}", name))),
        }
    }

    async fn create_index(&self, schema: &IndexSchema) -> Result<()> {
        if self.indexes.contains_key(&schema.name) {
            return Err(AppError::Store(format!("Index already exists: {}", schema.name)));
        }
        self.indexes.insert(schema.name.clone(), schema.clone());
        Ok(())
    }

    async fn aggregate(&self, index: &str, plan: &QueryPlan) -> Result<Vec<AggregateRow>> {
        self.counters.aggregations.fetch_add(1, AtomicOrdering::Relaxed);

        let schema = match self.indexes.get(index) {
            Some(schema) => schema.clone(),
            None => return Err(AppError::Store(format!("{}: no such index", index))),
        };

        let mut rows: Vec<(Property, AggregateRow)> = self
            .properties
            .iter()
            .filter(|entry| entry.key().starts_with(&schema.prefix))
            .filter(|entry| Self::matches_base(plan, entry.value()))
            .map(|entry| (entry.value().clone(), AggregateRow::new()))
            .collect();

        for stage in &plan.stages {
            match stage {
                PipelineStage::Load(fields) => {
                    for (property, row) in rows.iter_mut() {
                        for field in fields {
                            match field {
                                LoadField::Key => row.insert(KEY_FIELD, property.key()),
                                LoadField::Elements { filter, alias } => {
                                    let selected = filter.select(&property.availability);
                                    // An empty selection leaves the field unset
                                    if !selected.is_empty() {
                                        row.insert(alias.clone(), serde_json::to_string(&selected)?);
                                    }
                                }
                            }
                        }
                    }
                }
                PipelineStage::Filter(FilterExpr::Exists(field)) => {
                    rows.retain(|(_, row)| row.contains(field));
                }
                PipelineStage::SortBy { field, order } => {
                    let sortable = schema.field(field).map_or(false, |f| f.sortable);
                    // Rate is the only sortable numeric field in the property index
                    if !sortable || field != RATE_FIELD {
                        return Err(AppError::Store(format!(
                            "Property '{}' not loaded nor in schema",
                            field
                        )));
                    }
                    rows.sort_by(|(a, _), (b, _)| {
                        let ord = a.rate.partial_cmp(&b.rate).unwrap_or(Ordering::Equal);
                        match order {
                            SortOrder::Ascending => ord,
                            SortOrder::Descending => ord.reverse(),
                        }
                    });
                    for (property, row) in rows.iter_mut() {
                        row.insert(RATE_FIELD, property.rate.to_string());
                    }
                }
                PipelineStage::Limit { offset, count } => {
                    rows = rows.into_iter().skip(*offset).take(*count).collect();
                }
            }
        }

        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }
}
