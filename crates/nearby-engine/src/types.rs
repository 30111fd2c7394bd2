use std::fmt;
use std::sync::Arc;

use nearby_core::{Facility, FacilityId};

/// Identifies one search epoch. Starts at 0 before any search and increases
/// by one every time the search parameters change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of asking the routing service about one facility.
///
/// Absence from the store means "not asked yet"; `Unavailable` means "asked
/// and failed". The two are never conflated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoadDistance {
    Resolved(f64),
    Unavailable,
}

impl RoadDistance {
    #[must_use]
    pub fn miles(self) -> Option<f64> {
        match self {
            RoadDistance::Resolved(miles) => Some(miles),
            RoadDistance::Unavailable => None,
        }
    }
}

/// Which distance metric governs ranking and the exported column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMode {
    StraightLine,
    Road,
}

/// One entry of the ranked result set.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFacility {
    pub facility: Arc<Facility>,
    pub straight_line_miles: f64,
    /// `None` until resolution has run for the current epoch.
    pub road: Option<RoadDistance>,
    /// Road distance when resolved, straight-line distance otherwise.
    pub authoritative_miles: f64,
}

impl RankedFacility {
    #[must_use]
    pub fn id(&self) -> &FacilityId {
        &self.facility.id
    }
}
