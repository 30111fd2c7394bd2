//! Two-tier ranking of facilities around a reference point.
//!
//! The straight-line ranking from [`nearby_core::GeoIndex`] is refined with
//! road distances from a [`nearby_routing::RoutingService`] once the caller
//! asks for them. [`SelectionController`] owns one search epoch at a time and
//! keeps the active selection consistent with the ranked set.

pub mod controller;
pub mod error;
pub mod export;
pub mod store;
pub mod types;

pub use controller::{
    EpochChange, RefinementState, ResolutionOutcome, ResolutionRequest, SelectionController,
};
pub use error::{ExportError, SelectionError, StaleEpoch};
pub use export::{export_file_name, write_csv};
pub use store::{resolve, RefinementStore, ResolveOptions};
pub use types::{Epoch, RankedFacility, RankingMode, RoadDistance};
