//! Load path: synthesizes the property catalog and indexes it
//!
//! Runs once per deployment. [`LoadOrchestrator`] recreates the search
//! index, loads zip geocodes, writes the synthetic catalog and finally
//! sets the persisted readiness flag that gates the read path.

pub mod availability;
pub mod catalog;
pub mod names;
pub mod orchestrator;
pub mod source;
pub mod zips;

pub use availability::generate_availability;
pub use catalog::{build_property, random_rate, PropertyCatalogLoader};
pub use orchestrator::{LoadOrchestrator, LoadOutcome, LoadSummary};
pub use source::{AddressRow, CsvDataSource, DataSource, RowIter};
pub use zips::ZipGeocodeTable;
