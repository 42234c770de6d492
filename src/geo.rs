//! Geographic primitives: coordinates and great-circle distance.
//!
//! All angles are decimal degrees on input; the haversine step converts
//! to radians internally. Earth is a sphere of radius 6371 km.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const MILES_PER_KM: f64 = 0.621_371;

/// A point on the Earth's surface, longitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn checked(lon: f64, lat: f64) -> Option<Self> {
        let c = Self::new(lon, lat);
        c.is_valid().then_some(c)
    }

    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self, other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_coords(self.lat, self.lon))
    }
}

/// Haversine great-circle distance between two coordinates, in kilometres.
///
/// The deltas are taken as absolute values so the result is bit-for-bit
/// symmetric in its arguments.
pub fn haversine_km(p: &Coordinate, q: &Coordinate) -> f64 {
    let lat1 = p.lat.to_radians();
    let lat2 = q.lat.to_radians();
    let dlat = (q.lat - p.lat).abs().to_radians();
    let dlon = (q.lon - p.lon).abs().to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Unit used when presenting a distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Km,
    Mi,
}

impl Unit {
    pub fn convert(self, km: f64) -> f64 {
        match self {
            Self::Km => km,
            Self::Mi => km * MILES_PER_KM,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Some(Self::Km),
            "mi" | "miles" => Some(Self::Mi),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Km => write!(f, "km"),
            Self::Mi => write!(f, "mi"),
        }
    }
}

/// Format as `59.3293°N, 18.0686°E`.
pub fn format_coords(lat: f64, lon: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", lat.abs(), ns, lon.abs(), ew)
}
