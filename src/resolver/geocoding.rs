//! Adapter from a multi-candidate [`Geocoder`] to the single-answer
//! [`Resolver`] contract, with a pluggable disambiguation policy.

use super::types::{Candidate, Geocoder, ResolutionError, Resolver};
use crate::geo::Coordinate;
use crate::observer::Observer;

/// Picks one candidate when a service returns several.
///
/// `candidates` is never empty. An out-of-range index falls back to 0.
pub trait CandidateSelector: Send + Sync {
    fn select(&self, name: &str, candidates: &[Candidate]) -> usize;
}

/// Take the service's top-ranked match.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCandidate;

impl CandidateSelector for FirstCandidate {
    fn select(&self, _name: &str, _candidates: &[Candidate]) -> usize {
        0
    }
}

impl<F> CandidateSelector for F
where
    F: Fn(&str, &[Candidate]) -> usize + Send + Sync,
{
    fn select(&self, name: &str, candidates: &[Candidate]) -> usize {
        self(name, candidates)
    }
}

pub struct GeocodingResolver<G, S = FirstCandidate> {
    geocoder: G,
    selector: S,
}

impl<G: Geocoder> GeocodingResolver<G, FirstCandidate> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder, selector: FirstCandidate }
    }
}

impl<G: Geocoder, S: CandidateSelector> GeocodingResolver<G, S> {
    /// Replace the disambiguation policy.
    pub fn with_selector<S2: CandidateSelector>(self, selector: S2) -> GeocodingResolver<G, S2> {
        GeocodingResolver { geocoder: self.geocoder, selector }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }
}

impl<G: Geocoder, S: CandidateSelector> Resolver for GeocodingResolver<G, S> {
    fn resolve(&self, name: &str, observer: &dyn Observer) -> Result<Coordinate, ResolutionError> {
        observer.resolving(name);

        let result = self.lookup(name, observer);
        match &result {
            Ok(c) => observer.resolved(name, c),
            Err(e) => observer.resolution_failed(name, e),
        }
        result
    }
}

impl<G: Geocoder, S: CandidateSelector> GeocodingResolver<G, S> {
    fn lookup(&self, name: &str, observer: &dyn Observer) -> Result<Coordinate, ResolutionError> {
        if name.trim().is_empty() {
            return Err(ResolutionError::NoResult(name.to_string()));
        }

        let candidates = self.geocoder.candidates(name)?;
        if candidates.is_empty() {
            return Err(ResolutionError::NoResult(name.to_string()));
        }

        let mut chosen = 0;
        if candidates.len() > 1 {
            chosen = self.selector.select(name, &candidates);
            if chosen >= candidates.len() {
                chosen = 0;
            }
            observer.multiple_candidates(name, &candidates, chosen);
        }

        let coordinate = candidates[chosen].coordinate;
        if !coordinate.is_valid() {
            return Err(ResolutionError::MalformedResponse(format!(
                "{} returned out-of-range coordinate ({}, {}) for '{}'",
                self.geocoder.name(),
                coordinate.lon,
                coordinate.lat,
                name
            )));
        }
        Ok(coordinate)
    }
}
