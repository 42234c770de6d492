use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::closest::ClosestPairError;
use crate::geo::{format_coords, Unit};
use crate::pipeline::{
    find_closest, parse_place_list, FailurePolicy, PipelineError, PipelineOptions, DEFAULT_PLACES,
};
use crate::report::Report;
use crate::resolver::{builtin_city_list, CityInfo, ResolutionError};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    place: Option<String>,
}

#[derive(Debug)]
pub(super) struct ApiError {
    status: StatusCode,
    message: String,
    place: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.message,
            code: self.status.as_u16(),
            place: self.place,
        };
        (self.status, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError { status, message: msg.into(), place: None }
}

fn resolution_status(e: &ResolutionError) -> StatusCode {
    match e {
        ResolutionError::NoResult(_) => StatusCode::NOT_FOUND,
        ResolutionError::ServiceUnavailable(_) | ResolutionError::MalformedResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Unresolved { ref place, ref source } => ApiError {
                status: resolution_status(source),
                place: Some(place.clone()),
                message: e.to_string(),
            },
            PipelineError::ClosestPair(ClosestPairError::InsufficientPoints(_)) => {
                api_error(StatusCode::BAD_REQUEST, e.to_string())
            }
        }
    }
}

fn join_error(e: tokio::task::JoinError) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("worker failed: {}", e))
}

// ─── GET /api/closest ────────────────────────────────────────────

/// Most places a single `/api/closest` request may name.
pub const MAX_PLACES: usize = 100;

#[derive(Deserialize, Default)]
pub struct ClosestQuery {
    /// Comma-separated place names; defaults to the built-in list.
    pub places: Option<String>,
    pub skip: Option<bool>,
    pub parallel: Option<bool>,
    pub unit: Option<String>,
}

pub async fn closest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClosestQuery>,
) -> Result<Json<Report>, ApiError> {
    let start = Instant::now();

    let names = match params.places.as_deref() {
        Some(raw) => parse_place_list(raw),
        None => DEFAULT_PLACES.iter().map(|s| s.to_string()).collect(),
    };
    if names.len() > MAX_PLACES {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Too many places ({}). At most {} per request.", names.len(), MAX_PLACES),
        ));
    }
    let unit = match params.unit.as_deref() {
        Some(u) => Unit::parse(u).ok_or_else(|| {
            api_error(StatusCode::BAD_REQUEST, format!("Unknown unit '{}'. Use 'km' or 'mi'.", u))
        })?,
        None => Unit::Km,
    };
    let opts = PipelineOptions {
        on_failure: if params.skip.unwrap_or(false) { FailurePolicy::Skip } else { FailurePolicy::Abort },
        parallel: params.parallel.unwrap_or(false),
    };

    let count = names.len();
    let worker_state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || {
        find_closest(&names, &*worker_state.resolver, &*worker_state.observer, opts)
    })
    .await
    .map_err(join_error)??;

    let report = Report::new(&result, unit);
    tracing::info!(
        places = count,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/closest -> {}",
        report.summary_line()
    );
    Ok(Json(report))
}

// ─── GET /api/resolve ────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ResolveQuery {
    pub query: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ResolveResponse {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub formatted_coords: String,
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let query = params.query.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'query' parameter"));
    }

    let worker_state = Arc::clone(&state);
    let name = query.clone();
    let coordinate = tokio::task::spawn_blocking(move || {
        worker_state.resolver.resolve(&name, &*worker_state.observer)
    })
    .await
    .map_err(join_error)?
    .map_err(|e| ApiError {
        status: resolution_status(&e),
        message: e.to_string(),
        place: Some(query.clone()),
    })?;

    tracing::info!("GET /api/resolve?query={} -> {}", query, coordinate);
    Ok(Json(ResolveResponse {
        name: query,
        lat: coordinate.lat,
        lon: coordinate.lon,
        formatted_coords: format_coords(coordinate.lat, coordinate.lon),
    }))
}

// ─── GET /api/places, /api/cities ────────────────────────────────

pub async fn default_places() -> Json<Vec<&'static str>> {
    Json(DEFAULT_PLACES.to_vec())
}

pub async fn city_list() -> Json<Vec<CityInfo>> {
    Json(builtin_city_list())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use crate::resolver::BuiltinResolver;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            resolver: Arc::new(BuiltinResolver),
            observer: Arc::new(NoopObserver),
        })
    }

    #[tokio::test]
    async fn test_closest_defaults() {
        let Json(report) = closest(State(state()), Query(ClosestQuery::default())).await.unwrap();
        assert_eq!(report.places[0].name, "Los Angeles");
        assert_eq!(report.places[1].name, "San Diego");
        assert_eq!(report.unit, Unit::Km);
    }

    #[tokio::test]
    async fn test_closest_custom_list_in_miles() {
        let q = ClosestQuery {
            places: Some("Boston, Santa Clara, San Jose".into()),
            unit: Some("mi".into()),
            ..Default::default()
        };
        let Json(report) = closest(State(state()), Query(q)).await.unwrap();
        assert_eq!(report.places[0].name, "Santa Clara");
        assert_eq!(report.places[1].name, "San Jose");
        assert!(report.distance < report.distance_km);
    }

    #[tokio::test]
    async fn test_closest_unknown_place_is_404() {
        let q = ClosestQuery { places: Some("Paris, Atlantis, London".into()), ..Default::default() };
        let err = closest(State(state()), Query(q)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.place.as_deref(), Some("Atlantis"));
    }

    #[tokio::test]
    async fn test_closest_skip() {
        let q = ClosestQuery {
            places: Some("Paris, Atlantis, London".into()),
            skip: Some(true),
            ..Default::default()
        };
        let Json(report) = closest(State(state()), Query(q)).await.unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.places[0].name, "Paris");
    }

    #[tokio::test]
    async fn test_closest_single_place_is_400() {
        let q = ClosestQuery { places: Some("Paris".into()), ..Default::default() };
        let err = closest(State(state()), Query(q)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_closest_too_many_places_is_400() {
        let at_limit = vec!["Paris"; MAX_PLACES].join(", ");
        let q = ClosestQuery { places: Some(at_limit), ..Default::default() };
        assert!(closest(State(state()), Query(q)).await.is_ok());

        let over = vec!["Paris"; MAX_PLACES + 1].join(", ");
        let q = ClosestQuery { places: Some(over), parallel: Some(true), ..Default::default() };
        let err = closest(State(state()), Query(q)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("Too many places"));
    }

    #[tokio::test]
    async fn test_closest_bad_unit() {
        let q = ClosestQuery { unit: Some("parsec".into()), ..Default::default() };
        let err = closest(State(state()), Query(q)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_resolve() {
        let q = ResolveQuery { query: Some("Toronto".into()) };
        let Json(r) = resolve(State(state()), Query(q)).await.unwrap();
        assert_eq!(r.lat, 43.6532);

        let missing = resolve(State(state()), Query(ResolveQuery::default())).await.unwrap_err();
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(resolution_status(&ResolutionError::NoResult("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            resolution_status(&ResolutionError::ServiceUnavailable("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            resolution_status(&ResolutionError::MalformedResponse("x".into())),
            StatusCode::BAD_GATEWAY
        );
    }
}
