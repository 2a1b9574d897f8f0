//! Synthetic property catalog

use crate::error::Result;
use crate::loader::availability::generate_availability;
use crate::loader::names::random_name;
use crate::loader::source::AddressRow;
use crate::models::{Address, Owner, Property, PropertyType};
use crate::state::PropertyStore;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

/// Lowest generated hourly rate
pub const MIN_RATE: f64 = 125.0;

/// Width of the rate range; rates fall in `[MIN_RATE, MIN_RATE + RATE_SPAN]`
pub const RATE_SPAN: f64 = 250.0;

/// Random hourly rate rounded to cents
pub fn random_rate<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    ((rng.gen::<f64>() * RATE_SPAN + MIN_RATE) * 100.0).round() / 100.0
}

/// Assemble one property from an address row and random draws
pub fn build_property<R: Rng + ?Sized>(
    id: u64,
    row: AddressRow,
    state: &str,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Property {
    let property_type = *PropertyType::all()
        .choose(rng)
        .unwrap_or(&PropertyType::Office);

    Property {
        id,
        address: Address {
            coords: row.coords(),
            number: row.number,
            street: row.street,
            unit: row.unit,
            city: row.city,
            state: state.to_string(),
            postcode: row.postcode,
        },
        owner: Owner {
            fname: random_name(rng),
            lname: random_name(rng),
        },
        property_type,
        availability: generate_availability(rng, now),
        rate: random_rate(rng),
    }
}

/// Builds property documents from address rows and writes them one by one
pub struct PropertyCatalogLoader {
    store: Arc<dyn PropertyStore>,
    max_properties: u64,
    state: String,
}

impl PropertyCatalogLoader {
    pub fn new(store: Arc<dyn PropertyStore>, max_properties: u64, state: impl Into<String>) -> Self {
        Self {
            store,
            max_properties,
            state: state.into(),
        }
    }

    /// Write up to `max_properties` documents with dense ids starting at 1
    pub async fn load<I, R>(&self, rows: I, rng: &mut R) -> Result<u64>
    where
        I: IntoIterator<Item = Result<AddressRow>>,
        I::IntoIter: Send,
        R: Rng + Send + ?Sized,
    {
        let now = Utc::now();
        let mut written = 0u64;

        for row in rows {
            if written >= self.max_properties {
                break;
            }

            let property = build_property(written + 1, row?, &self.state, rng, now);
            self.store.put_property(&property).await?;
            written += 1;

            if written % 10_000 == 0 {
                tracing::info!(properties = written, "Catalog load progress");
            }
        }

        tracing::info!(properties = written, "Property catalog loaded");
        Ok(written)
    }
}
