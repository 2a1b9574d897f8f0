use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Key prefix shared by every property document
pub const PROPERTY_KEY_PREFIX: &str = "property:";

/// A rentable property as stored in the document store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    /// Dense 1-based identifier
    pub id: u64,

    /// Street address and geo coordinates
    pub address: Address,

    /// Synthesized owner
    pub owner: Owner,

    /// Property category
    #[serde(rename = "type")]
    pub property_type: PropertyType,

    /// Ordered, non-overlapping availability windows
    pub availability: Vec<AvailabilityInterval>,

    /// Hourly rate in dollars, rounded to cents
    pub rate: f64,
}

impl Property {
    /// Store key for this property
    pub fn key(&self) -> String {
        property_key(self.id)
    }
}

/// Store key for a property id
pub fn property_key(id: u64) -> String {
    format!("{}{}", PROPERTY_KEY_PREFIX, id)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    /// `"lon lat"`, longitude first, as the geo index expects
    pub coords: String,
    pub number: String,
    pub street: String,
    pub unit: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Owner {
    pub fname: String,
    pub lname: String,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, EnumString, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PropertyType {
    Office,
    Field,
    Court,
    Classroom,
    Auditorium,
}

impl PropertyType {
    /// All property types in declaration order
    pub fn all() -> Vec<PropertyType> {
        PropertyType::iter().collect()
    }
}

/// A closed availability window in Unix seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityInterval {
    pub begin: i64,
    pub end: i64,
}

impl AvailabilityInterval {
    pub fn new(begin: i64, end: i64) -> Self {
        Self { begin, end }
    }

    pub fn duration_secs(&self) -> i64 {
        self.end - self.begin
    }
}
