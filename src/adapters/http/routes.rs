//! Route configuration for the relay server.
//!
//! Configures the Axum router with the relay's own routes and delegates
//! every other request to an external handler.

use std::convert::Infallible;

use axum::extract::Request;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tower::Service;
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::ws_handler;
use crate::application::RelayHub;

use super::health::healthcheck;

/// Path of the liveness endpoint.
pub const HEALTHCHECK_PATH: &str = "/healthcheck";

/// Creates the application router.
///
/// Routes:
/// - `GET /healthcheck` - Liveness probe, body `ok`
/// - `GET <ws_path>` - WebSocket upgrade into the room relay
/// - anything else - passed to `fallback`
pub fn app_router<F>(hub: RelayHub, ws_path: &str, fallback: F) -> Router
where
    F: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
    F::Response: IntoResponse,
    F::Future: Send + 'static,
{
    Router::new()
        .route(HEALTHCHECK_PATH, get(healthcheck))
        .route(ws_path, get(ws_handler))
        .with_state(hub)
        .fallback_service(fallback)
        .layer(TraceLayer::new_for_http())
}
