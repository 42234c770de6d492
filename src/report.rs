//! Presentation of a [`ClosestPlaces`] result: JSON and one-line text.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geo::{format_coords, Unit};
use crate::pipeline::{ClosestPlaces, ResolvedPlace};

#[derive(Debug, Clone, Serialize)]
pub struct PlaceReport {
    pub name: String,
    pub index: usize,
    pub lat: f64,
    pub lon: f64,
    pub formatted_coords: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedReport {
    pub name: String,
    pub kind: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub places: [PlaceReport; 2],
    pub distance: f64,
    pub unit: Unit,
    pub distance_km: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedReport>,
    pub generated_at: DateTime<Utc>,
}

fn place_report(place: &ResolvedPlace, index: usize) -> PlaceReport {
    PlaceReport {
        name: place.name.clone(),
        index,
        lat: place.coordinate.lat,
        lon: place.coordinate.lon,
        formatted_coords: format_coords(place.coordinate.lat, place.coordinate.lon),
    }
}

impl Report {
    pub fn new(result: &ClosestPlaces, unit: Unit) -> Self {
        Self {
            places: [
                place_report(&result.first, result.pair.first),
                place_report(&result.second, result.pair.second),
            ],
            distance: unit.convert(result.distance_km()),
            unit,
            distance_km: result.distance_km(),
            skipped: result
                .skipped
                .iter()
                .map(|s| SkippedReport {
                    name: s.name.clone(),
                    kind: s.error.kind(),
                    reason: s.error.to_string(),
                })
                .collect(),
            generated_at: Utc::now(),
        }
    }

    /// `Los Angeles & San Diego (179.4 km)`
    pub fn summary_line(&self) -> String {
        format!(
            "{} & {} ({:.1} {})",
            self.places[0].name, self.places[1].name, self.distance, self.unit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closest::ClosestPair;
    use crate::geo::Coordinate;
    use crate::pipeline::SkippedPlace;
    use crate::resolver::ResolutionError;

    fn sample() -> ClosestPlaces {
        ClosestPlaces {
            first: ResolvedPlace { name: "Los Angeles".into(), coordinate: Coordinate::new(-118.2437, 34.0522) },
            second: ResolvedPlace { name: "San Diego".into(), coordinate: Coordinate::new(-117.1611, 32.7157) },
            pair: ClosestPair { first: 0, second: 8, distance_km: 179.41 },
            skipped: vec![SkippedPlace {
                name: "Atlantis".into(),
                error: ResolutionError::NoResult("Atlantis".into()),
            }],
        }
    }

    #[test]
    fn test_summary_km() {
        let r = Report::new(&sample(), Unit::Km);
        assert_eq!(r.summary_line(), "Los Angeles & San Diego (179.4 km)");
    }

    #[test]
    fn test_summary_miles() {
        let r = Report::new(&sample(), Unit::Mi);
        assert_eq!(r.summary_line(), "Los Angeles & San Diego (111.5 mi)");
        assert_eq!(r.distance_km, 179.41);
    }

    #[test]
    fn test_json_shape() {
        let r = Report::new(&sample(), Unit::Km);
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["places"][1]["name"], "San Diego");
        assert_eq!(v["places"][1]["index"], 8);
        assert_eq!(v["unit"], "km");
        assert_eq!(v["skipped"][0]["kind"], "no_result");
        assert!(v["generated_at"].is_string());
    }
}
