use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FinderError;

/// Kind of parking the user is looking for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParkingType {
    #[default]
    Any,
    Free,
    Paid,
}

impl ParkingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParkingType::Any => "any",
            ParkingType::Free => "free",
            ParkingType::Paid => "paid",
        }
    }

    /// Label shown next to the option in the form
    pub fn label(&self) -> &'static str {
        match self {
            ParkingType::Any => "Any",
            ParkingType::Free => "Free",
            ParkingType::Paid => "Paid",
        }
    }
}

impl fmt::Display for ParkingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParkingType {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(ParkingType::Any),
            "free" => Ok(ParkingType::Free),
            "paid" => Ok(ParkingType::Paid),
            _ => Err(FinderError::InvalidParkingType(s.to_string())),
        }
    }
}

/// Search parameters sent to the parking service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// City to search in
    pub city: String,
    /// Street address or landmark
    pub location: String,
    pub parking_type: ParkingType,
    /// Minutes, kept exactly as typed
    #[serde(deserialize_with = "string_or_number")]
    pub parking_length: String,
    /// "HH:MM"
    pub parking_time: String,
}

impl SearchCriteria {
    /// Blank criteria with the city pre-filled
    pub fn with_city(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            ..Self::default()
        }
    }
}

/// One of the five form fields, addressable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    City,
    Location,
    ParkingType,
    ParkingLength,
    ParkingTime,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::City,
        Field::Location,
        Field::ParkingType,
        Field::ParkingLength,
        Field::ParkingTime,
    ];

    /// Key used on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Field::City => "city",
            Field::Location => "location",
            Field::ParkingType => "parkingType",
            Field::ParkingLength => "parkingLength",
            Field::ParkingTime => "parkingTime",
        }
    }
}

impl FromStr for Field {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "city" => Ok(Field::City),
            "location" => Ok(Field::Location),
            "parkingType" | "parking_type" => Ok(Field::ParkingType),
            "parkingLength" | "parking_length" => Ok(Field::ParkingLength),
            "parkingTime" | "parking_time" => Ok(Field::ParkingTime),
            _ => Err(FinderError::UnknownField(s.to_string())),
        }
    }
}

/// A parking location returned by the service
///
/// Records are read leniently: missing or null fields fall back to their
/// defaults, so one sloppy record never fails the whole search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub free: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: String,
    /// Number or numeric string; anything else counts as unknown
    #[serde(
        default,
        deserialize_with = "lenient_distance",
        skip_serializing_if = "Option::is_none"
    )]
    pub distance_km: Option<f64>,
}

/// Body of a successful search response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Missing or null means nothing was found
    #[serde(default)]
    pub spots: Option<Vec<ParkingSpot>>,
}

impl SearchResponse {
    pub fn into_spots(self) -> Vec<ParkingSpot> {
        self.spots.unwrap_or_default()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_distance<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let km = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(km.filter(|km| km.is_finite()))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
