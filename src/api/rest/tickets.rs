//! Queue mutation endpoints
//!
//! Each handler commits the mutation before its notification goes out.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::websocket::state::AppState;
use crate::error::QueueResult;
use crate::types::{PolyclinicId, QueueTicket, TicketId};

/// POST /api/queue/polyclinics/:polyclinic_id/tickets - Take a ticket
pub async fn take_ticket(
    State(state): State<Arc<AppState>>,
    Path(polyclinic_id): Path<PolyclinicId>,
) -> QueueResult<(StatusCode, Json<QueueTicket>)> {
    let ticket = state.service.take_ticket(polyclinic_id)?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// POST /api/queue/polyclinics/:polyclinic_id/call-next
pub async fn call_next(
    State(state): State<Arc<AppState>>,
    Path(polyclinic_id): Path<PolyclinicId>,
) -> QueueResult<Json<QueueTicket>> {
    state.service.call_next(polyclinic_id).map(Json)
}

/// GET /api/queue/tickets/:ticket_id
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
) -> QueueResult<Json<QueueTicket>> {
    state.service.store().ticket(ticket_id).map(Json)
}

/// POST /api/queue/tickets/:ticket_id/call
pub async fn call_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
) -> QueueResult<Json<QueueTicket>> {
    state.service.call_ticket(ticket_id).map(Json)
}

/// POST /api/queue/tickets/:ticket_id/serve
pub async fn serve_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
) -> QueueResult<Json<QueueTicket>> {
    state.service.start_serving(ticket_id).map(Json)
}

/// POST /api/queue/tickets/:ticket_id/complete
pub async fn complete_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<TicketId>,
) -> QueueResult<Json<QueueTicket>> {
    state.service.complete_ticket(ticket_id).map(Json)
}

/// POST /api/queue/reset - Start a fresh session
pub async fn reset_session(State(state): State<Arc<AppState>>) -> StatusCode {
    state.service.reset_session();
    StatusCode::NO_CONTENT
}
