//! Place-name resolution.
//!
//! The [`Resolver`] trait is the contract the pipeline depends on. Network
//! providers implement the lower-level [`Geocoder`] trait and are adapted
//! by [`GeocodingResolver`]; [`CachingResolver`] and [`BuiltinResolver`]
//! sit alongside for persistence and offline use.

pub mod builtin;
pub mod cache;
pub mod geocoding;
pub mod providers;
pub mod types;

pub use builtin::{builtin_city_list, BuiltinResolver, CityInfo};
pub use cache::{CachingResolver, PlaceCache};
pub use geocoding::{CandidateSelector, FirstCandidate, GeocodingResolver};
pub use providers::{GoogleGeocoder, NominatimGeocoder};
pub use types::{Candidate, Geocoder, ResolutionError, Resolver};
