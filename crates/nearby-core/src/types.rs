//! Domain types shared by the geo index, the refinement engine and the CLI.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::InputError;

/// An immutable latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    lat: f64,
    lon: f64,
}

impl Point {
    /// Creates a point, rejecting non-finite or out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidCoordinate`] unless `lat` is within
    /// `[-90, 90]` and `lon` within `[-180, 180]`.
    pub fn new(lat: f64, lon: f64) -> Result<Self, InputError> {
        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
            Ok(Self { lat, lon })
        } else {
            Err(InputError::InvalidCoordinate { lat, lon })
        }
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Unique key of a facility within the loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(String);

impl FacilityId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FacilityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for FacilityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Display columns carried through untouched, in source column order.
pub type Attributes = Vec<(String, String)>;

/// A facility (e.g. a school) as loaded at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub point: Point,
    pub attributes: Attributes,
}

impl Facility {
    #[must_use]
    pub fn new(id: impl Into<FacilityId>, point: Point) -> Self {
        Self {
            id: id.into(),
            point,
            attributes: Vec::new(),
        }
    }

    /// Looks up a display attribute by column name.
    #[must_use]
    pub fn attribute(&self, column: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }
}

/// A reference point (e.g. a church) a search is centred on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub name: String,
    pub point: Point,
    pub attributes: Attributes,
}

/// One search request. Every distinct value starts a new search epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParameters {
    reference: String,
    radius_miles: f64,
}

impl SearchParameters {
    /// # Errors
    ///
    /// Returns [`InputError::InvalidRadius`] when `radius_miles` is not a
    /// finite number greater than zero.
    pub fn new(reference: impl Into<String>, radius_miles: f64) -> Result<Self, InputError> {
        if !radius_miles.is_finite() || radius_miles <= 0.0 {
            return Err(InputError::InvalidRadius(radius_miles));
        }
        Ok(Self {
            reference: reference.into(),
            radius_miles,
        })
    }

    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    #[must_use]
    pub fn radius_miles(&self) -> f64 {
        self.radius_miles
    }
}
