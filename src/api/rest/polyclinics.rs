//! Polyclinic reference data endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use crate::api::websocket::state::AppState;
use crate::error::QueueResult;
use crate::types::Polyclinic;

/// GET /api/polyclinics
pub async fn list_polyclinics(State(state): State<Arc<AppState>>) -> Json<Vec<Polyclinic>> {
    Json(state.service.store().polyclinics())
}

/// POST /api/polyclinics
pub async fn register_polyclinic(
    State(state): State<Arc<AppState>>,
    Json(polyclinic): Json<Polyclinic>,
) -> QueueResult<(StatusCode, Json<Polyclinic>)> {
    let polyclinic = state.service.register_polyclinic(polyclinic)?;
    Ok((StatusCode::CREATED, Json(polyclinic)))
}
