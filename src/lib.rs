//! Availability search over a bulk-loaded rental property catalog.
//!
//! The load path ([`loader`]) synthesizes properties with non-overlapping
//! availability schedules and indexes them in Redis; the read path
//! ([`search`]) answers "which properties of this type near this zip are
//! free for this window, cheapest first?" with a single aggregation.

pub mod api;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod search;
pub mod state;
pub mod telemetry;

pub use error::{AppError, Result};
