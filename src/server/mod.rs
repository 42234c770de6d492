//! JSON HTTP API over the resolver and the closest-pair pipeline.

mod handlers;
mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::observer::{Observer, TracingObserver};
use crate::resolver::Resolver;

pub use state::AppState;

pub fn build_router(resolver: Arc<dyn Resolver>, observer: Arc<dyn Observer>) -> Router {
    let state = Arc::new(AppState { resolver, observer });

    Router::new()
        .route("/api/closest", get(handlers::closest))
        .route("/api/resolve", get(handlers::resolve))
        .route("/api/places", get(handlers::default_places))
        .route("/api/cities", get(handlers::city_list))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, resolver: Arc<dyn Resolver>) -> std::io::Result<()> {
    let app = build_router(resolver, Arc::new(TracingObserver));
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("closest-places server listening on http://{}", addr);
    axum::serve(listener, app).await
}
