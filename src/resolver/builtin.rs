//! Offline resolver backed by a small built-in city table.
//!
//! Covers the default place list plus a few Bay Area neighbours. Used by
//! `--provider builtin` and as a network-free resolver in tests.

use serde::Serialize;

use super::types::{ResolutionError, Resolver};
use crate::geo::Coordinate;
use crate::observer::Observer;

struct BuiltinCity {
    names: &'static [&'static str], // canonical + aliases
    lat: f64,
    lon: f64,
    country_code: &'static str,
}

const BUILTIN_CITIES: &[BuiltinCity] = &[
    BuiltinCity { names: &["los angeles", "la"], lat: 34.0522, lon: -118.2437, country_code: "US" },
    BuiltinCity { names: &["san francisco", "sf"], lat: 37.7749, lon: -122.4194, country_code: "US" },
    BuiltinCity { names: &["boston"], lat: 42.3601, lon: -71.0589, country_code: "US" },
    BuiltinCity { names: &["new york", "newyork", "nyc"], lat: 40.7128, lon: -74.0060, country_code: "US" },
    BuiltinCity { names: &["washington", "washington dc", "dc"], lat: 38.9072, lon: -77.0369, country_code: "US" },
    BuiltinCity { names: &["seattle"], lat: 47.6062, lon: -122.3321, country_code: "US" },
    BuiltinCity { names: &["austin"], lat: 30.2672, lon: -97.7431, country_code: "US" },
    BuiltinCity { names: &["chicago"], lat: 41.8781, lon: -87.6298, country_code: "US" },
    BuiltinCity { names: &["san diego"], lat: 32.7157, lon: -117.1611, country_code: "US" },
    BuiltinCity { names: &["denver"], lat: 39.7392, lon: -104.9903, country_code: "US" },
    BuiltinCity { names: &["london"], lat: 51.5074, lon: -0.1278, country_code: "GB" },
    BuiltinCity { names: &["toronto"], lat: 43.6532, lon: -79.3832, country_code: "CA" },
    BuiltinCity { names: &["sydney"], lat: -33.8688, lon: 151.2093, country_code: "AU" },
    BuiltinCity { names: &["melbourne"], lat: -37.8136, lon: 144.9631, country_code: "AU" },
    BuiltinCity { names: &["paris"], lat: 48.8566, lon: 2.3522, country_code: "FR" },
    BuiltinCity { names: &["singapore"], lat: 1.3521, lon: 103.8198, country_code: "SG" },
    BuiltinCity { names: &["santa clara"], lat: 37.3541, lon: -121.9552, country_code: "US" },
    BuiltinCity { names: &["san jose"], lat: 37.3382, lon: -121.8863, country_code: "US" },
];

const MAX_FUZZY_DISTANCE: usize = 2;

/// Levenshtein distance.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let n = b.len();

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

fn lookup(query: &str) -> Option<&'static BuiltinCity> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }

    if let Some(city) = BUILTIN_CITIES.iter().find(|c| c.names.contains(&q.as_str())) {
        return Some(city);
    }

    // Closest alias within the fuzzy window; earliest entry wins ties.
    let mut best: Option<(&BuiltinCity, usize)> = None;
    for city in BUILTIN_CITIES {
        for name in city.names {
            // Short aliases ("la", "sf") would match almost anything.
            if name.len() <= MAX_FUZZY_DISTANCE + 1 {
                continue;
            }
            let dist = edit_distance(&q, name);
            if dist <= MAX_FUZZY_DISTANCE && best.map_or(true, |(_, d)| dist < d) {
                best = Some((city, dist));
            }
        }
    }
    best.map(|(city, _)| city)
}

/// Resolves names against the built-in table. Never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinResolver;

impl Resolver for BuiltinResolver {
    fn resolve(&self, name: &str, observer: &dyn Observer) -> Result<Coordinate, ResolutionError> {
        observer.resolving(name);
        match lookup(name) {
            Some(city) => {
                let c = Coordinate::new(city.lon, city.lat);
                observer.resolved(name, &c);
                Ok(c)
            }
            None => {
                let err = ResolutionError::NoResult(name.to_string());
                observer.resolution_failed(name, &err);
                Err(err)
            }
        }
    }
}

/// A built-in city for listing endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CityInfo {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

pub fn builtin_city_list() -> Vec<CityInfo> {
    BUILTIN_CITIES
        .iter()
        .map(|c| CityInfo {
            name: c.names[0].to_string(),
            country: c.country_code.to_string(),
            lat: c.lat,
            lon: c.lon,
        })
        .collect()
}
