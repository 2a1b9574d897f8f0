use crate::models::PropertyType;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Inbound availability search
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_window"))]
pub struct SearchRequest {
    /// Property type, one of the fixed enumeration
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_property_type"))]
    pub property_type: String,

    #[validate(custom(function = "validate_zip"))]
    pub zip: String,

    /// Search radius in miles
    #[serde(deserialize_with = "number_or_string")]
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub radius: f64,

    /// Requested window start, Unix seconds
    pub begin: i64,

    /// Requested window end, Unix seconds
    pub end: i64,
}

impl SearchRequest {
    /// Parsed property type; only meaningful after validation
    pub fn parsed_type(&self) -> Option<PropertyType> {
        PropertyType::from_str(self.property_type.trim()).ok()
    }
}

/// One ranked hit: the property key, its rate and the matched window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResultItem {
    pub key: String,
    pub rate: f64,
    pub begin: i64,
    pub end: i64,
}

fn validation_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message));
    err
}

fn validate_property_type(value: &str) -> Result<(), ValidationError> {
    PropertyType::from_str(value.trim()).map(|_| ()).map_err(|_| {
        let allowed: Vec<String> = PropertyType::all().iter().map(|t| t.to_string()).collect();
        validation_error(
            "property_type",
            format!("unknown type '{}', expected one of {}", value, allowed.join(", ")),
        )
    })
}

fn validate_zip(value: &str) -> Result<(), ValidationError> {
    let valid = (3..=10).contains(&value.len())
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(validation_error("zip", format!("malformed zip code '{}'", value)))
    }
}

fn validate_window(request: &SearchRequest) -> Result<(), ValidationError> {
    if request.begin < 0 || request.end < 0 {
        return Err(validation_error(
            "window",
            "begin and end must be non-negative Unix timestamps".to_string(),
        ));
    }
    if request.begin > request.end {
        return Err(validation_error(
            "window",
            format!("begin ({}) is after end ({})", request.begin, request.end),
        ));
    }
    Ok(())
}

/// Accepts `10`, `10.5` or `"10"`; the browser form posts the radius as text
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("radius '{}' is not a number", s))),
    }
}
