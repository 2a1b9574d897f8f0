//! Input rows for the catalog load

use crate::error::{AppError, Result};
use crate::models::ZipRecord;
use csv::StringRecord;
use std::path::{Path, PathBuf};

/// A fallible stream of parsed rows
pub type RowIter<T> = Box<dyn Iterator<Item = Result<T>> + Send>;

/// One address row in OpenAddresses column order:
/// `LON,LAT,NUMBER,STREET,UNIT,CITY,DISTRICT,REGION,POSTCODE,...`
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRow {
    pub longitude: String,
    pub latitude: String,
    pub number: String,
    pub street: String,
    pub unit: String,
    pub city: String,
    pub postcode: String,
}

impl AddressRow {
    pub fn from_record(record: &StringRecord) -> Result<Self> {
        let field = |index: usize| -> Result<String> {
            record
                .get(index)
                .map(|value| value.trim().to_string())
                .ok_or_else(|| {
                    AppError::DataSource(format!(
                        "address row {} has no column {}",
                        position(record),
                        index
                    ))
                })
        };

        Ok(Self {
            longitude: field(0)?,
            latitude: field(1)?,
            number: field(2)?,
            street: field(3)?,
            unit: field(4)?,
            city: field(5)?,
            postcode: field(8)?,
        })
    }

    /// `"lon lat"` as written to the geo-indexed field
    pub fn coords(&self) -> String {
        format!("{} {}", self.longitude, self.latitude)
    }
}

/// Parse a `zip,lat,lon` row
pub fn zip_from_record(record: &StringRecord) -> Result<ZipRecord> {
    Ok(ZipRecord {
        zip: zip_field(record, 0, "zip")?.to_string(),
        latitude: zip_number(record, 1, "latitude")?,
        longitude: zip_number(record, 2, "longitude")?,
    })
}

fn zip_field<'a>(record: &'a StringRecord, index: usize, name: &str) -> Result<&'a str> {
    record.get(index).map(str::trim).ok_or_else(|| {
        AppError::DataSource(format!("zip row {} is missing {}", position(record), name))
    })
}

fn zip_number(record: &StringRecord, index: usize, name: &str) -> Result<f64> {
    let raw = zip_field(record, index, name)?;
    raw.parse::<f64>().map_err(|_| {
        AppError::DataSource(format!(
            "zip row {} has invalid {} '{}'",
            position(record),
            name,
            raw
        ))
    })
}

fn position(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Where the load path reads its rows from
pub trait DataSource: Send + Sync {
    fn zip_rows(&self) -> Result<RowIter<ZipRecord>>;

    fn address_rows(&self) -> Result<RowIter<AddressRow>>;
}

/// CSV files with a header row
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    zip_path: PathBuf,
    address_path: PathBuf,
}

impl CsvDataSource {
    pub fn new(zip_path: impl Into<PathBuf>, address_path: impl Into<PathBuf>) -> Self {
        Self {
            zip_path: zip_path.into(),
            address_path: address_path.into(),
        }
    }

    fn open<T, F>(path: &Path, parse: F) -> Result<RowIter<T>>
    where
        T: 'static,
        F: Fn(&StringRecord) -> Result<T> + Send + 'static,
    {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| {
                AppError::DataSource(format!("Failed to open {}: {}", path.display(), e))
            })?;

        tracing::debug!(path = %path.display(), "Opened CSV source");

        Ok(Box::new(
            reader
                .into_records()
                .map(move |record| parse(&record?)),
        ))
    }
}

impl DataSource for CsvDataSource {
    fn zip_rows(&self) -> Result<RowIter<ZipRecord>> {
        Self::open(&self.zip_path, zip_from_record)
    }

    fn address_rows(&self) -> Result<RowIter<AddressRow>> {
        Self::open(&self.address_path, AddressRow::from_record)
    }
}
