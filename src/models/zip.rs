use serde::{Deserialize, Serialize};
use std::fmt;

/// Key prefix for zip geocode entries
pub const ZIP_KEY_PREFIX: &str = "zip:";

/// Store key for a zip code
pub fn zip_key(zip: &str) -> String {
    format!("{}{}", ZIP_KEY_PREFIX, zip)
}

/// A zip code and its centroid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZipRecord {
    pub zip: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl ZipRecord {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.longitude, self.latitude)
    }
}

/// Longitude/latitude pair rendered as `"lon lat"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Parse a stored `"lon lat"` coordinate string
    pub fn parse(coords: &str) -> Option<Self> {
        let mut parts = coords.split_whitespace();
        let longitude = parts.next()?.parse::<f64>().ok()?;
        let latitude = parts.next()?.parse::<f64>().ok()?;
        if parts.next().is_some() || !longitude.is_finite() || !latitude.is_finite() {
            return None;
        }
        Some(Self::new(longitude, latitude))
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.longitude, self.latitude)
    }
}
