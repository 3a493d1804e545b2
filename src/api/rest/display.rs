//! Display endpoints - full snapshots for display boards and counters

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::websocket::state::AppState;
use crate::error::QueueResult;
use crate::types::{DisplayItem, PolyclinicId};

/// GET /api/queue/display - Current state of every polyclinic
///
/// Clients call this on start, after every notification and after every
/// reconnect. The response is recomputed on each request.
pub async fn get_display(State(state): State<Arc<AppState>>) -> QueueResult<Json<Vec<DisplayItem>>> {
    state.aggregator.get_display_snapshot().map(Json)
}

/// GET /api/queue/display/:polyclinic_id - Current state of one polyclinic
pub async fn get_polyclinic_display(
    State(state): State<Arc<AppState>>,
    Path(polyclinic_id): Path<PolyclinicId>,
) -> QueueResult<Json<DisplayItem>> {
    state.aggregator.get_polyclinic_item(polyclinic_id).map(Json)
}
