// Core data structures for schoolfinder

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo;

/// Valid latitude range in degrees
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Valid longitude range in degrees
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check both axes are finite and inside their ranges
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_latitude(self.latitude)?;
        validate_longitude(self.longitude)?;
        Ok(())
    }

    /// Great-circle distance to `other` in kilometres
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        geo::distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A registered school
///
/// `distance` is only populated on ranked copies handed out by
/// [`crate::ranking`]; the registry never stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl School {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Copy of this record annotated with its distance from `origin`
    pub fn with_distance_from(&self, origin: Coordinate) -> Self {
        Self {
            distance: Some(origin.distance_to(&self.coordinate())),
            ..self.clone()
        }
    }

    /// Human readable distance, "N/A" when not ranked
    pub fn distance_label(&self) -> String {
        match self.distance {
            Some(km) => format!("{km:.2} km"),
            None => "N/A".to_string(),
        }
    }

    /// Google Maps directions link from `origin` to this school
    pub fn directions_url(&self, origin: Coordinate) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}&origin={},{}",
            self.latitude, self.longitude, origin.latitude, origin.longitude
        )
    }
}

/// Fields supplied when registering a school
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchool {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewSchool {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            latitude,
            longitude,
        }
    }

    /// Validate fields in declaration order, reporting the first problem
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.address.trim().is_empty() {
            return Err(ValidationError::MissingField("address"));
        }
        Coordinate::new(self.latitude, self.longitude).validate()
    }

    pub(crate) fn into_school(self, id: u64) -> School {
        School {
            id,
            name: self.name,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            distance: None,
        }
    }
}

impl From<&School> for NewSchool {
    fn from(school: &School) -> Self {
        Self {
            name: school.name.clone(),
            address: school.address.clone(),
            latitude: school.latitude,
            longitude: school.longitude,
        }
    }
}

/// Rejected input for a school record or coordinate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required field absent or blank
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Latitude not a number or outside -90..=90
    #[error("Latitude must be a number between -90 and 90, got {0}")]
    InvalidLatitude(f64),

    /// Longitude not a number or outside -180..=180
    #[error("Longitude must be a number between -180 and 180, got {0}")]
    InvalidLongitude(f64),

    /// Field present but could not be read as a number
    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) => field,
            Self::InvalidLatitude(_) => "latitude",
            Self::InvalidLongitude(_) => "longitude",
            Self::NotANumber { field, .. } => field,
        }
    }
}

pub fn validate_latitude(latitude: f64) -> Result<(), ValidationError> {
    if latitude.is_finite() && LATITUDE_RANGE.contains(&latitude) {
        Ok(())
    } else {
        Err(ValidationError::InvalidLatitude(latitude))
    }
}

pub fn validate_longitude(longitude: f64) -> Result<(), ValidationError> {
    if longitude.is_finite() && LONGITUDE_RANGE.contains(&longitude) {
        Ok(())
    } else {
        Err(ValidationError::InvalidLongitude(longitude))
    }
}
