//! Great-circle distance and radius filtering over the facility set.
//!
//! Everything here is a pure function of its inputs, cheap enough to rerun on
//! every change of reference point or radius.

use std::sync::Arc;

use crate::types::{Facility, Point};

/// Mean Earth radius used for every distance in the system.
pub const EARTH_RADIUS_MILES: f64 = 3956.0;

/// Haversine great-circle distance between two points, in miles.
///
/// Works on sine/cosine of radian differences, so a pair straddling the
/// antimeridian (179.9 vs -179.9) comes out ~0.2 degrees apart, not ~360.
#[must_use]
pub fn haversine_miles(a: Point, b: Point) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.lon() - a.lon()).to_radians();

    let h = ((d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().atan2((1.0 - h).sqrt())
}

/// A facility that fell inside the search radius, annotated with its
/// straight-line distance from the reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub facility: Arc<Facility>,
    pub straight_line_miles: f64,
}

/// Returns every facility with `distance <= radius_miles`, ordered by
/// straight-line distance and then by identity.
///
/// The radius is not validated here; callers reject non-positive values
/// upstream. A zero radius only keeps facilities sitting exactly on `reference`.
#[must_use]
pub fn filter_within_radius(
    reference: Point,
    radius_miles: f64,
    facilities: &[Arc<Facility>],
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = facilities
        .iter()
        .filter_map(|facility| {
            let straight_line_miles = haversine_miles(reference, facility.point);
            (straight_line_miles <= radius_miles).then(|| Candidate {
                facility: Arc::clone(facility),
                straight_line_miles,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.straight_line_miles
            .total_cmp(&b.straight_line_miles)
            .then_with(|| a.facility.id.cmp(&b.facility.id))
    });
    candidates
}

/// The full facility set, loaded once and shared for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct GeoIndex {
    facilities: Vec<Arc<Facility>>,
}

impl GeoIndex {
    #[must_use]
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self {
            facilities: facilities.into_iter().map(Arc::new).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    #[must_use]
    pub fn within_radius(&self, reference: Point, radius_miles: f64) -> Vec<Candidate> {
        filter_within_radius(reference, radius_miles, &self.facilities)
    }
}
