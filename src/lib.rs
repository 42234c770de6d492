//! Resolve place names to coordinates and find the two closest places by
//! great-circle distance.

pub mod closest;
pub mod config;
pub mod geo;
pub mod observer;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod server;

pub use closest::{closest_pair, closest_pair_with, ClosestPair, ClosestPairError};
pub use geo::{haversine_km, Coordinate, Unit, EARTH_RADIUS_KM};
pub use observer::{NoopObserver, Observer, TracingObserver};
pub use pipeline::{find_closest, ClosestPlaces, FailurePolicy, PipelineError, PipelineOptions};
pub use resolver::{ResolutionError, Resolver};
