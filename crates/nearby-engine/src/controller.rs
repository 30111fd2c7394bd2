//! Per-session search state: the ranked result set, its road-distance
//! refinement, and the single active selection.
//!
//! Every state change goes through one of the transition methods below; after
//! each of them the active selection is either `None` or a member of
//! [`SelectionController::current_result_set`].

use std::collections::HashMap;
use std::sync::Arc;

use nearby_core::{Candidate, FacilityId, GeoIndex, InputError, Point, ReferenceSet, SearchParameters};
use nearby_routing::RoutingService;

use crate::error::{SelectionError, StaleEpoch};
use crate::store::{resolve, RefinementStore, ResolveOptions};
use crate::types::{Epoch, RankedFacility, RankingMode, RoadDistance};

/// Result of [`SelectionController::on_search_parameters_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochChange {
    /// Same parameters as the current epoch; nothing was reset.
    Unchanged,
    Started(Epoch),
}

/// Whether road refinement can still be requested for the current epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementState {
    /// No search yet, or the search found nothing to refine.
    NotAvailable,
    Pending,
    Complete,
}

/// A snapshot of everything one resolution batch needs, detached from the
/// controller so it can run while the controller keeps handling input.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    epoch: Epoch,
    reference: Point,
    candidates: Vec<Candidate>,
    options: ResolveOptions,
}

impl ResolutionRequest {
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub async fn run<R: RoutingService>(self, router: &R) -> ResolutionOutcome {
        let distances = resolve(self.reference, &self.candidates, router, &self.options).await;
        ResolutionOutcome {
            epoch: self.epoch,
            distances,
        }
    }
}

/// Road distances produced by a [`ResolutionRequest`], tagged with its epoch.
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    pub epoch: Epoch,
    pub distances: HashMap<FacilityId, RoadDistance>,
}

#[derive(Debug, Clone)]
struct ActiveSearch {
    params: SearchParameters,
    reference: Point,
}

pub struct SelectionController {
    index: Arc<GeoIndex>,
    references: Arc<ReferenceSet>,
    options: ResolveOptions,
    epoch: Epoch,
    search: Option<ActiveSearch>,
    candidates: Vec<Candidate>,
    store: RefinementStore,
    results: Vec<RankedFacility>,
    active: Option<FacilityId>,
    /// Epoch of the batch handed out by `begin_resolution` and not yet applied.
    in_flight: Option<Epoch>,
}

impl SelectionController {
    #[must_use]
    pub fn new(index: Arc<GeoIndex>, references: Arc<ReferenceSet>, options: ResolveOptions) -> Self {
        let epoch = Epoch::default();
        Self {
            index,
            references,
            options,
            epoch,
            search: None,
            candidates: Vec::new(),
            store: RefinementStore::new(epoch),
            results: Vec::new(),
            active: None,
            in_flight: None,
        }
    }

    /// Starts a new epoch when `params` differ from the current search.
    ///
    /// A new epoch empties the refinement store, clears the selection and
    /// recomputes candidates from the geo index.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::UnknownReference`] if the reference point is not
    /// in the reference set; the current epoch is left untouched.
    pub fn on_search_parameters_changed(
        &mut self,
        params: SearchParameters,
    ) -> Result<EpochChange, InputError> {
        if self.search.as_ref().is_some_and(|s| s.params == params) {
            return Ok(EpochChange::Unchanged);
        }
        let reference = self.references.get(params.reference())?.point;

        self.epoch = self.epoch.next();
        self.store.reset(self.epoch);
        self.active = None;
        self.in_flight = None;
        self.candidates = self.index.within_radius(reference, params.radius_miles());

        tracing::info!(
            epoch = %self.epoch,
            reference = params.reference(),
            radius_miles = params.radius_miles(),
            candidates = self.candidates.len(),
            "search epoch started"
        );

        self.search = Some(ActiveSearch { params, reference });
        self.rerank();
        Ok(EpochChange::Started(self.epoch))
    }

    /// The ranked result set, ordered by authoritative distance then identity.
    #[must_use]
    pub fn current_result_set(&self) -> &[RankedFacility] {
        &self.results
    }

    #[must_use]
    pub fn search(&self) -> Option<&SearchParameters> {
        self.search.as_ref().map(|s| &s.params)
    }

    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    #[must_use]
    pub fn store(&self) -> &RefinementStore {
        &self.store
    }

    #[must_use]
    pub fn active(&self) -> Option<&FacilityId> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn active_facility(&self) -> Option<&RankedFacility> {
        let id = self.active.as_ref()?;
        self.results.iter().find(|r| r.id() == id)
    }

    /// Makes `id` the active facility. Re-selecting the active one is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NotInResultSet`] and leaves the selection
    /// unchanged when `id` is not in the current result set.
    pub fn select(&mut self, id: &FacilityId) -> Result<(), SelectionError> {
        if !self.contains(id) {
            tracing::debug!(facility = %id, "ignoring selection outside the result set");
            return Err(SelectionError::NotInResultSet(id.clone()));
        }
        if self.active.as_ref() != Some(id) {
            self.active = Some(id.clone());
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.active = None;
    }

    #[must_use]
    pub fn ranking_mode(&self) -> RankingMode {
        self.store.ranking_mode()
    }

    #[must_use]
    pub fn is_fully_resolved(&self) -> bool {
        self.store.is_fully_resolved(&self.candidates)
    }

    /// `true` while a batch handed out for the current epoch has not been applied.
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        self.in_flight == Some(self.epoch)
    }

    #[must_use]
    pub fn refinement_state(&self) -> RefinementState {
        if self.candidates.is_empty() {
            RefinementState::NotAvailable
        } else if self.is_fully_resolved() {
            RefinementState::Complete
        } else {
            RefinementState::Pending
        }
    }

    /// Captures the current epoch's candidates for a resolution batch.
    ///
    /// Returns `None` when there is nothing to resolve, a batch for this epoch
    /// is already in flight, or the store already holds results for this
    /// epoch, so repeated triggers never re-issue calls.
    #[must_use]
    pub fn begin_resolution(&mut self) -> Option<ResolutionRequest> {
        let search = self.search.as_ref()?;
        if self.candidates.is_empty()
            || !self.store.is_empty()
            || self.in_flight == Some(self.epoch)
        {
            return None;
        }
        self.in_flight = Some(self.epoch);
        Some(ResolutionRequest {
            epoch: self.epoch,
            reference: search.reference,
            candidates: self.candidates.clone(),
            options: self.options.clone(),
        })
    }

    /// Installs a finished batch and re-ranks. The active selection survives,
    /// since resolution only changes order and values, never membership.
    ///
    /// # Errors
    ///
    /// Returns [`StaleEpoch`] and discards the outcome if the epoch changed
    /// while the batch was in flight.
    pub fn apply_resolution(&mut self, outcome: ResolutionOutcome) -> Result<(), StaleEpoch> {
        let total = outcome.distances.len();
        let unavailable = outcome
            .distances
            .values()
            .filter(|d| matches!(d, RoadDistance::Unavailable))
            .count();
        if self.in_flight == Some(outcome.epoch) {
            self.in_flight = None;
        }

        if let Err(stale) = self.store.install(outcome.epoch, outcome.distances) {
            tracing::debug!(%stale, "dropping stale road distances");
            return Err(stale);
        }

        tracing::info!(
            epoch = %self.epoch,
            resolved = total - unavailable,
            unavailable,
            "road distances applied"
        );
        self.rerank();
        Ok(())
    }

    /// Resolves road distances for the current candidates and applies them.
    ///
    /// Returns `false` when nothing was requested (see [`Self::begin_resolution`]).
    pub async fn trigger_resolution<R: RoutingService>(&mut self, router: &R) -> bool {
        let Some(request) = self.begin_resolution() else {
            return false;
        };
        let outcome = request.run(router).await;
        self.apply_resolution(outcome).is_ok()
    }

    fn contains(&self, id: &FacilityId) -> bool {
        self.results.iter().any(|r| r.id() == id)
    }

    fn rerank(&mut self) {
        let store = &self.store;
        let mut results: Vec<RankedFacility> = self
            .candidates
            .iter()
            .map(|c| RankedFacility {
                facility: Arc::clone(&c.facility),
                straight_line_miles: c.straight_line_miles,
                road: store.get(&c.facility.id),
                authoritative_miles: store.authoritative_distance(c),
            })
            .collect();
        results.sort_by(|a, b| {
            a.authoritative_miles
                .total_cmp(&b.authoritative_miles)
                .then_with(|| a.id().cmp(b.id()))
        });
        self.results = results;

        if let Some(id) = self.active.take() {
            if self.contains(&id) {
                self.active = Some(id);
            } else {
                tracing::debug!(facility = %id, "active facility left the result set");
            }
        }
    }
}
