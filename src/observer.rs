//! Observability hooks for resolution and the closest-pair scan.
//!
//! Entry points take a `&dyn Observer` instead of logging through global
//! state. Every hook has an empty default body, so [`NoopObserver`] is a
//! one-liner and callers override only what they care about.

use crate::closest::ClosestPair;
use crate::geo::Coordinate;
use crate::resolver::{Candidate, ResolutionError};

pub trait Observer: Send + Sync {
    /// A lookup for `name` is about to start.
    fn resolving(&self, _name: &str) {}

    /// The service returned several matches and `chosen` was picked.
    fn multiple_candidates(&self, _name: &str, _candidates: &[Candidate], _chosen: usize) {}

    fn resolved(&self, _name: &str, _coordinate: &Coordinate) {}

    fn resolution_failed(&self, _name: &str, _error: &ResolutionError) {}

    /// A failed place was dropped under the skip policy.
    fn place_skipped(&self, _name: &str, _error: &ResolutionError) {}

    fn closest_pair_found(&self, _pair: &ClosestPair, _compared: usize) {}
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn resolving(&self, name: &str) {
        tracing::debug!(place = name, "resolving");
    }

    fn multiple_candidates(&self, name: &str, candidates: &[Candidate], chosen: usize) {
        let label = candidates
            .get(chosen)
            .and_then(|c| c.label.as_deref())
            .unwrap_or("?");
        tracing::warn!(
            place = name,
            candidates = candidates.len(),
            chosen,
            "multiple locations returned for '{}', using '{}'",
            name,
            label
        );
    }

    fn resolved(&self, name: &str, coordinate: &Coordinate) {
        tracing::debug!(place = name, lat = coordinate.lat, lon = coordinate.lon, "resolved");
    }

    fn resolution_failed(&self, name: &str, error: &ResolutionError) {
        tracing::error!(place = name, %error, "resolution failed");
    }

    fn place_skipped(&self, name: &str, error: &ResolutionError) {
        tracing::warn!(place = name, %error, "skipping unresolved place");
    }

    fn closest_pair_found(&self, pair: &ClosestPair, compared: usize) {
        tracing::debug!(
            first = pair.first,
            second = pair.second,
            distance_km = pair.distance_km,
            compared,
            "closest pair found"
        );
    }
}
