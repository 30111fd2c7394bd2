pub mod app_config;
pub mod config;
pub mod dataset;
pub mod geo;
pub mod types;

pub use app_config::{AppConfig, Environment, RoutingConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use dataset::{load_facilities, load_references, ReferenceSet};
pub use geo::{filter_within_radius, haversine_miles, Candidate, GeoIndex, EARTH_RADIUS_MILES};
pub use types::{Attributes, Facility, FacilityId, Point, ReferencePoint, SearchParameters};

use thiserror::Error;

/// Caller-side input rejected before it reaches the geo index or controller.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("coordinate out of range: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("search radius must be a positive number of miles, got {0}")]
    InvalidRadius(f64),

    #[error("unknown reference point: '{0}'")]
    UnknownReference(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read data file {path}: {source}")]
    DataFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse data file {path}: {source}")]
    DataFileParse {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("data file {path} has no '{column}' column")]
    MissingColumn { path: String, column: String },

    #[error("duplicate identity '{identity}' in {path}")]
    DuplicateIdentity { path: String, identity: String },
}
