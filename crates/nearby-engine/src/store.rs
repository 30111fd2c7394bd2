//! Road distances for the candidates of one search epoch.

use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use nearby_core::{Candidate, FacilityId, Point, RoutingConfig};
use nearby_routing::RoutingService;

use crate::error::StaleEpoch;
use crate::types::{Epoch, RankingMode, RoadDistance};

/// Limits applied to one resolution batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Each routing call is abandoned (and recorded as unavailable) after this long.
    pub per_call_timeout: Duration,
    pub max_concurrent: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::from(&RoutingConfig::default())
    }
}

impl From<&RoutingConfig> for ResolveOptions {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            per_call_timeout: config.per_call_timeout(),
            max_concurrent: config.max_concurrent.max(1),
        }
    }
}

/// Asks `router` for the road distance from `reference` to every candidate.
///
/// Calls run concurrently up to `options.max_concurrent`, each under its own
/// timeout. The returned map has exactly one entry per candidate: a failed,
/// timed-out or nonsensical answer is recorded as [`RoadDistance::Unavailable`]
/// and never affects the other calls.
pub async fn resolve<R: RoutingService>(
    reference: Point,
    candidates: &[Candidate],
    router: &R,
    options: &ResolveOptions,
) -> HashMap<FacilityId, RoadDistance> {
    stream::iter(candidates)
        .map(|candidate| async move {
            let id = candidate.facility.id.clone();
            let call = router.road_distance_miles(reference, candidate.facility.point);
            let distance = match tokio::time::timeout(options.per_call_timeout, call).await {
                Ok(Ok(miles)) if miles.is_finite() && miles >= 0.0 => RoadDistance::Resolved(miles),
                Ok(Ok(miles)) => {
                    tracing::warn!(facility = %id, miles, "routing service returned an invalid distance");
                    RoadDistance::Unavailable
                }
                Ok(Err(error)) => {
                    tracing::warn!(facility = %id, %error, "road distance unavailable");
                    RoadDistance::Unavailable
                }
                Err(_) => {
                    tracing::warn!(
                        facility = %id,
                        timeout_ms = u64::try_from(options.per_call_timeout.as_millis()).unwrap_or(u64::MAX),
                        "road distance request timed out"
                    );
                    RoadDistance::Unavailable
                }
            };
            (id, distance)
        })
        .buffer_unordered(options.max_concurrent.max(1))
        .collect::<HashMap<_, _>>()
        .await
}

/// Road distances keyed by facility, valid for a single epoch.
#[derive(Debug, Clone, Default)]
pub struct RefinementStore {
    epoch: Epoch,
    entries: HashMap<FacilityId, RoadDistance>,
}

impl RefinementStore {
    #[must_use]
    pub fn new(epoch: Epoch) -> Self {
        Self {
            epoch,
            entries: HashMap::new(),
        }
    }

    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Drops every entry and rebinds the store to `epoch`.
    pub fn reset(&mut self, epoch: Epoch) {
        self.epoch = epoch;
        self.entries.clear();
    }

    /// Merges a resolution result produced for `epoch`.
    ///
    /// # Errors
    ///
    /// Returns [`StaleEpoch`] and leaves the store untouched when `epoch` is
    /// not the epoch the store is bound to.
    pub fn install(
        &mut self,
        epoch: Epoch,
        distances: HashMap<FacilityId, RoadDistance>,
    ) -> Result<(), StaleEpoch> {
        if epoch != self.epoch {
            return Err(StaleEpoch {
                result_epoch: epoch,
                current_epoch: self.epoch,
            });
        }
        self.entries.extend(distances);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &FacilityId) -> Option<RoadDistance> {
        self.entries.get(id).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Road distance if resolved, straight-line distance otherwise.
    #[must_use]
    pub fn authoritative_distance(&self, candidate: &Candidate) -> f64 {
        self.get(&candidate.facility.id)
            .and_then(RoadDistance::miles)
            .unwrap_or(candidate.straight_line_miles)
    }

    /// `true` when every candidate has an entry, resolved or unavailable.
    /// An empty store is never fully resolved, even for an empty candidate set.
    #[must_use]
    pub fn is_fully_resolved(&self, candidates: &[Candidate]) -> bool {
        !self.entries.is_empty()
            && candidates
                .iter()
                .all(|c| self.entries.contains_key(&c.facility.id))
    }

    #[must_use]
    pub fn ranking_mode(&self) -> RankingMode {
        if self.entries.is_empty() {
            RankingMode::StraightLine
        } else {
            RankingMode::Road
        }
    }
}
