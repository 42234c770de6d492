//! Names in, closest pair of names out.
//!
//! Each name is resolved into a [`ResolvedPlace`] that keeps the name and
//! its coordinate together, so the engine's indices map straight back to
//! the caller's input without any reverse lookup.

use serde::Serialize;

use crate::closest::{closest_pair_with, ClosestPair, ClosestPairError};
use crate::geo::Coordinate;
use crate::observer::Observer;
use crate::resolver::{ResolutionError, Resolver};

/// Places used when the caller supplies none.
pub const DEFAULT_PLACES: &[&str] = &[
    "Los Angeles",
    "San Francisco",
    "Boston",
    "New York",
    "Washington",
    "Seattle",
    "Austin",
    "Chicago",
    "San Diego",
    "Denver",
    "London",
    "Toronto",
    "Sydney",
    "Melbourne",
    "Paris",
    "Singapore",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPlace {
    pub name: String,
    pub coordinate: Coordinate,
}

/// A place dropped under [`FailurePolicy::Skip`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPlace {
    pub name: String,
    pub error: ResolutionError,
}

/// What to do when a place cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure; the engine never sees a partial set.
    #[default]
    Abort,
    /// Drop the place, remember why, and carry on.
    Skip,
}

/// Upper bound on lookups in flight when resolving in parallel.
pub const MAX_PARALLEL_LOOKUPS: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub on_failure: FailurePolicy,
    /// Resolve names concurrently, at most [`MAX_PARALLEL_LOOKUPS`] at a time.
    pub parallel: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedSet {
    pub places: Vec<ResolvedPlace>,
    pub skipped: Vec<SkippedPlace>,
}

impl ResolvedSet {
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.places.iter().map(|p| p.coordinate).collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("could not resolve '{place}': {source}")]
    Unresolved {
        place: String,
        #[source]
        source: ResolutionError,
    },
    #[error(transparent)]
    ClosestPair(#[from] ClosestPairError),
}

/// The two closest places and how far apart they are.
#[derive(Debug, Clone)]
pub struct ClosestPlaces {
    pub first: ResolvedPlace,
    pub second: ResolvedPlace,
    pub pair: ClosestPair,
    pub skipped: Vec<SkippedPlace>,
}

impl ClosestPlaces {
    pub fn distance_km(&self) -> f64 {
        self.pair.distance_km
    }
}

/// Resolve `names` in order, applying `opts.on_failure`.
///
/// The returned places keep the relative order of `names`, whether or not
/// resolution ran in parallel.
pub fn resolve_places<S>(
    names: &[S],
    resolver: &dyn Resolver,
    observer: &dyn Observer,
    opts: PipelineOptions,
) -> Result<ResolvedSet, PipelineError>
where
    S: AsRef<str> + Sync,
{
    let mut set = ResolvedSet::default();

    if opts.parallel {
        for chunk in names.chunks(MAX_PARALLEL_LOOKUPS) {
            let results: Vec<Result<Coordinate, ResolutionError>> = std::thread::scope(|scope| {
                let handles: Vec<_> = chunk
                    .iter()
                    .map(|name| scope.spawn(move || resolver.resolve(name.as_ref(), observer)))
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                    .collect()
            });
            for (name, result) in chunk.iter().zip(results) {
                collect(&mut set, name.as_ref(), result, observer, opts.on_failure)?;
            }
        }
    } else {
        for name in names {
            let result = resolver.resolve(name.as_ref(), observer);
            collect(&mut set, name.as_ref(), result, observer, opts.on_failure)?;
        }
    }

    Ok(set)
}

fn collect(
    set: &mut ResolvedSet,
    name: &str,
    result: Result<Coordinate, ResolutionError>,
    observer: &dyn Observer,
    policy: FailurePolicy,
) -> Result<(), PipelineError> {
    match result {
        Ok(coordinate) => {
            set.places.push(ResolvedPlace { name: name.to_string(), coordinate });
            Ok(())
        }
        Err(error) => match policy {
            FailurePolicy::Abort => Err(PipelineError::Unresolved { place: name.to_string(), source: error }),
            FailurePolicy::Skip => {
                observer.place_skipped(name, &error);
                set.skipped.push(SkippedPlace { name: name.to_string(), error });
                Ok(())
            }
        },
    }
}

/// Resolve `names` and return the two places closest to each other.
pub fn find_closest<S>(
    names: &[S],
    resolver: &dyn Resolver,
    observer: &dyn Observer,
    opts: PipelineOptions,
) -> Result<ClosestPlaces, PipelineError>
where
    S: AsRef<str> + Sync,
{
    let set = resolve_places(names, resolver, observer, opts)?;
    let pair = closest_pair_with(&set.coordinates(), observer)?;

    let ResolvedSet { mut places, skipped } = set;
    // second > first, so removing second first leaves first's index intact.
    let second = places.swap_remove(pair.second);
    let first = places.swap_remove(pair.first);

    Ok(ClosestPlaces { first, second, pair, skipped })
}

/// Split a user-supplied place list.
///
/// Accepts `A, B, C` as well as the bracketed, quoted form
/// `['A', 'B', "C"]`. Commas inside quotes belong to the name. Blank
/// entries are dropped and names are trimmed.
pub fn parse_place_list(input: &str) -> Vec<String> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    let mut names = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in inner.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') if current.trim().is_empty() => {
                current.clear();
                quote = Some(ch);
            }
            (None, ',') => names.push(std::mem::take(&mut current)),
            (None, c) => current.push(c),
        }
    }
    names.push(current);

    names
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
