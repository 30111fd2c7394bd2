pub mod client;
pub mod error;
mod retry;
pub mod types;

pub use client::{OsrmClient, RoutingService, METERS_TO_MILES};
pub use error::RoutingError;
