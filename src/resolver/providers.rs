//! Network geocoders: Google Geocoding API and OpenStreetMap Nominatim.
//!
//! Each provider splits into a transport half (`candidates`, one blocking
//! `ureq` call) and a pure parsing half so the body handling can be tested
//! without a live service.

use std::time::Duration;

use serde::Deserialize;

use super::types::{Candidate, Geocoder, ResolutionError};
use crate::geo::Coordinate;

pub const GOOGLE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_USER_AGENT: &str = concat!("closest-places/", env!("CARGO_PKG_VERSION"));

const NOMINATIM_LIMIT: usize = 5;

fn build_agent(timeout: Duration, user_agent: &str) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
}

/// Run the request and hand back the body text, mapping every transport
/// problem (including non-2xx statuses) to `ServiceUnavailable`.
fn fetch(request: ureq::Request) -> Result<String, ResolutionError> {
    let response = request.call().map_err(|e| match e {
        ureq::Error::Status(code, resp) => ResolutionError::ServiceUnavailable(format!(
            "HTTP {} {}",
            code,
            resp.status_text()
        )),
        ureq::Error::Transport(t) => ResolutionError::ServiceUnavailable(t.to_string()),
    })?;

    response
        .into_string()
        .map_err(|e| ResolutionError::ServiceUnavailable(format!("reading body: {}", e)))
}

// ─── Google Geocoding ───────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct GoogleResponse {
    status: String,
    #[serde(default)]
    results: Vec<GoogleResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GoogleResult {
    geometry: GoogleGeometry,
    #[serde(default)]
    formatted_address: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GoogleGeometry {
    location: GoogleLatLng,
}

#[derive(Deserialize, Debug)]
struct GoogleLatLng {
    lat: f64,
    lng: f64,
}

pub struct GoogleGeocoder {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout, DEFAULT_USER_AGENT),
            endpoint: GOOGLE_ENDPOINT.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Geocoder for GoogleGeocoder {
    fn candidates(&self, name: &str) -> Result<Vec<Candidate>, ResolutionError> {
        let request = self
            .agent
            .get(&self.endpoint)
            .query("address", name)
            .query("key", &self.api_key);
        tracing::debug!(endpoint = %self.endpoint, place = name, "google geocode request");

        let body = fetch(request)?;
        parse_google(&body)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

/// Parse a Google Geocoding JSON body.
///
/// `ZERO_RESULTS` is an empty list; any other non-`OK` status is a service
/// failure (bad key, quota, ...).
pub fn parse_google(body: &str) -> Result<Vec<Candidate>, ResolutionError> {
    let parsed: GoogleResponse = serde_json::from_str(body)
        .map_err(|e| ResolutionError::MalformedResponse(e.to_string()))?;

    match parsed.status.as_str() {
        "OK" => Ok(parsed
            .results
            .into_iter()
            .map(|r| {
                Candidate::new(
                    Coordinate::new(r.geometry.location.lng, r.geometry.location.lat),
                    r.formatted_address,
                )
            })
            .collect()),
        "ZERO_RESULTS" => Ok(Vec::new()),
        other => Err(ResolutionError::ServiceUnavailable(match parsed.error_message {
            Some(msg) => format!("{}: {}", other, msg),
            None => other.to_string(),
        })),
    }
}

// ─── Nominatim ──────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

pub struct NominatimGeocoder {
    agent: ureq::Agent,
    endpoint: String,
}

impl NominatimGeocoder {
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub fn new(user_agent: &str, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout, user_agent),
            endpoint: NOMINATIM_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Geocoder for NominatimGeocoder {
    fn candidates(&self, name: &str) -> Result<Vec<Candidate>, ResolutionError> {
        let request = self
            .agent
            .get(&self.endpoint)
            .query("q", name)
            .query("format", "json")
            .query("limit", &NOMINATIM_LIMIT.to_string());
        tracing::debug!(endpoint = %self.endpoint, place = name, "nominatim search request");

        let body = fetch(request)?;
        parse_nominatim(&body)
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

/// Parse a Nominatim `format=json` search body. Coordinates arrive as
/// strings; one that fails to parse makes the whole body malformed.
pub fn parse_nominatim(body: &str) -> Result<Vec<Candidate>, ResolutionError> {
    let results: Vec<NominatimResult> = serde_json::from_str(body)
        .map_err(|e| ResolutionError::MalformedResponse(e.to_string()))?;

    results
        .into_iter()
        .map(|r| {
            let lat: f64 = r.lat.trim().parse().map_err(|_| {
                ResolutionError::MalformedResponse(format!("bad latitude '{}'", r.lat))
            })?;
            let lon: f64 = r.lon.trim().parse().map_err(|_| {
                ResolutionError::MalformedResponse(format!("bad longitude '{}'", r.lon))
            })?;
            Ok(Candidate::new(Coordinate::new(lon, lat), r.display_name))
        })
        .collect()
}
