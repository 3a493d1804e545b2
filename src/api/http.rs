//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::rest::{display, polyclinics, tickets};
use super::websocket::{handler::ws_handler, state::AppState};

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        // Display snapshots
        .route("/api/queue/display", get(display::get_display))
        .route(
            "/api/queue/display/:polyclinic_id",
            get(display::get_polyclinic_display),
        )
        // Reference data
        .route(
            "/api/polyclinics",
            get(polyclinics::list_polyclinics).post(polyclinics::register_polyclinic),
        )
        // Queue mutations
        .route(
            "/api/queue/polyclinics/:polyclinic_id/tickets",
            post(tickets::take_ticket),
        )
        .route(
            "/api/queue/polyclinics/:polyclinic_id/call-next",
            post(tickets::call_next),
        )
        .route("/api/queue/tickets/:ticket_id", get(tickets::get_ticket))
        .route("/api/queue/tickets/:ticket_id/call", post(tickets::call_ticket))
        .route("/api/queue/tickets/:ticket_id/serve", post(tickets::serve_ticket))
        .route(
            "/api/queue/tickets/:ticket_id/complete",
            post(tickets::complete_ticket),
        )
        .route("/api/queue/reset", post(tickets::reset_session))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
