//! Core types for the resolver subsystem.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::observer::Observer;

/// One match reported by a geocoding service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub coordinate: Coordinate,
    /// Provider's display name for the match, if it sent one.
    #[serde(default)]
    pub label: Option<String>,
}

impl Candidate {
    pub fn new(coordinate: Coordinate, label: Option<String>) -> Self {
        Self { coordinate, label }
    }
}

/// Why a place name could not be turned into a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Transport failure, non-2xx status, or a service-side error status.
    #[error("geocoding service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("malformed geocoding response: {0}")]
    MalformedResponse(String),
    #[error("no location found for '{0}'")]
    NoResult(String),
}

impl ResolutionError {
    /// Short machine-friendly tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::MalformedResponse(_) => "malformed_response",
            Self::NoResult(_) => "no_result",
        }
    }
}

/// Maps a place name to exactly one coordinate.
///
/// Implementations are stateless from the caller's point of view, so the
/// same resolver may be shared across threads.
pub trait Resolver: Send + Sync {
    fn resolve(&self, name: &str, observer: &dyn Observer) -> Result<Coordinate, ResolutionError>;
}

impl<R: Resolver + ?Sized> Resolver for std::sync::Arc<R> {
    fn resolve(&self, name: &str, observer: &dyn Observer) -> Result<Coordinate, ResolutionError> {
        (**self).resolve(name, observer)
    }
}

impl<R: Resolver + ?Sized> Resolver for Box<R> {
    fn resolve(&self, name: &str, observer: &dyn Observer) -> Result<Coordinate, ResolutionError> {
        (**self).resolve(name, observer)
    }
}

/// A service that returns every candidate it knows for a name, in its own
/// ranking order. An empty vector means "no match".
pub trait Geocoder: Send + Sync {
    fn candidates(&self, name: &str) -> Result<Vec<Candidate>, ResolutionError>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}
