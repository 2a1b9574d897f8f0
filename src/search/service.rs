//! Read path: zip resolution, planning, execution and hit mapping

use crate::error::{AppError, Result};
use crate::loader::ZipGeocodeTable;
use crate::models::{AvailabilityInterval, GeoPoint, SearchRequest, SearchResultItem};
use crate::search::query::{SearchQueryPlanner, KEY_FIELD, MATCH_FIELD, RATE_FIELD};
use crate::state::{AggregateRow, PropertyStore};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use validator::Validate;

/// Availability search over the loaded catalog
pub struct SearchService {
    store: Arc<dyn PropertyStore>,
    zips: ZipGeocodeTable,
    planner: SearchQueryPlanner,
    index_name: String,
    query_timeout: Duration,
}

impl SearchService {
    pub fn new(store: Arc<dyn PropertyStore>, index_name: impl Into<String>) -> Self {
        Self {
            zips: ZipGeocodeTable::new(store.clone()),
            store,
            planner: SearchQueryPlanner::new(),
            index_name: index_name.into(),
            query_timeout: Duration::from_secs(5),
        }
    }

    /// Bound the store call of each search
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn PropertyStore> {
        &self.store
    }

    /// Cheapest properties of the requested type near the zip whose
    /// availability fully covers the requested window
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResultItem>> {
        if !self.store.is_load_complete().await? {
            return Err(AppError::NotReady);
        }

        request.validate()?;
        let property_type = request.parsed_type().ok_or_else(|| {
            AppError::Validation(format!("unknown property type '{}'", request.property_type))
        })?;

        let coords = self
            .zips
            .lookup(&request.zip)
            .await?
            .ok_or_else(|| AppError::ZipNotFound(request.zip.clone()))?;
        let center = GeoPoint::parse(&coords).ok_or_else(|| {
            AppError::Internal(format!(
                "Stored coordinates for zip {} are malformed: '{}'",
                request.zip, coords
            ))
        })?;

        let plan = self.planner.plan(
            property_type,
            center,
            request.radius,
            request.begin,
            request.end,
        );

        let started = Instant::now();
        let rows = tokio::time::timeout(
            self.query_timeout,
            self.store.aggregate(&self.index_name, &plan),
        )
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "search aggregation exceeded {} ms",
                self.query_timeout.as_millis()
            ))
        })??;

        let items: Vec<SearchResultItem> = rows.iter().filter_map(map_row).collect();

        tracing::info!(
            zip = %request.zip,
            property_type = %property_type,
            radius = request.radius,
            rows = rows.len(),
            results = items.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Property search executed"
        );

        if items.is_empty() {
            return Err(AppError::NoMatch);
        }

        Ok(items)
    }
}

/// Map one aggregation row to a result using its first matched interval
fn map_row(row: &AggregateRow) -> Option<SearchResultItem> {
    let key = row.get(KEY_FIELD)?;
    let interval = row.get(MATCH_FIELD).and_then(first_interval);
    let rate = row.get(RATE_FIELD).and_then(parse_rate);

    match (interval, rate) {
        (Some(interval), Some(rate)) => Some(SearchResultItem {
            key: key.to_string(),
            rate,
            begin: interval.begin,
            end: interval.end,
        }),
        _ => {
            tracing::warn!(key = %key, "Skipping aggregation row without match or rate");
            None
        }
    }
}

/// The first interval in a JSONPath selection. Dialect 3 wraps results
/// in an array, so nested arrays are unwrapped.
fn first_interval(raw: &str) -> Option<AvailabilityInterval> {
    fn first(value: Value) -> Option<AvailabilityInterval> {
        match value {
            Value::Array(items) => items.into_iter().next().and_then(first),
            Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    serde_json::from_str(raw).ok().and_then(first)
}

/// Rates arrive either as plain numbers or as a one-element JSON array
fn parse_rate(raw: &str) -> Option<f64> {
    if let Ok(rate) = raw.trim().parse::<f64>() {
        return Some(rate);
    }

    match serde_json::from_str::<Value>(raw).ok()? {
        Value::Array(items) => items.first().and_then(Value::as_f64),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
