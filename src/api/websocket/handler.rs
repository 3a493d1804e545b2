//! WebSocket connection handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};

use super::connections::{ConnectionId, ConnectionManager, Delivery};
use super::events::{ClientMessage, ServerMessage};
use super::state::AppState;
use crate::types::Topic;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
///
/// The connection starts with no topics; it only receives notifications
/// after it joins one.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let connections = state.broadcaster.connections().clone();
    let (id, mut outbound) = connections.connect();
    tracing::info!(connection_id = %id, "Client connected");

    reply(
        &connections,
        id,
        &ServerMessage::Ready {
            connection_id: id.to_string(),
        },
    );

    loop {
        tokio::select! {
            // Frames queued by the broadcaster or by replies
            frame = outbound.recv() => {
                match frame {
                    Some(frame) => {
                        if socket.send(Message::Text(frame.to_string())).await.is_err() {
                            break; // Client disconnected
                        }
                    }
                    None => break,
                }
            }

            // Handle client messages
            result = socket.recv() => {
                match result {
                    Some(Ok(msg)) => {
                        if !handle_client_message(msg, id, &state, &mut socket).await {
                            break; // Client requested close
                        }
                    }
                    Some(Err(e)) => {
                        tracing::debug!(connection_id = %id, error = %e, "WebSocket error");
                        break;
                    }
                    None => break, // Client disconnected
                }
            }
        }
    }

    state.broadcaster.on_disconnect(id);
    tracing::info!(connection_id = %id, "Client disconnected");
}

/// Handle a message from the client
/// Returns false if the connection should be closed
async fn handle_client_message(
    msg: Message,
    id: ConnectionId,
    state: &AppState,
    socket: &mut WebSocket,
) -> bool {
    match msg {
        Message::Text(text) => {
            let response = match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => apply_client_message(client_msg, id, state),
                Err(e) => {
                    tracing::debug!(connection_id = %id, error = %e, "Malformed client frame");
                    ServerMessage::error("bad_message", e.to_string())
                }
            };
            reply(state.broadcaster.connections(), id, &response);
            true
        }
        Message::Binary(_) => true, // Ignore binary messages
        Message::Ping(data) => {
            if let Err(e) = socket.send(Message::Pong(data)).await {
                tracing::debug!(connection_id = %id, error = %e, "Failed to send pong");
                return false;
            }
            true
        }
        Message::Pong(_) => true, // Ignore pong responses
        Message::Close(_) => false, // Client requested close
    }
}

/// Apply a join/leave/ping and build the reply
fn apply_client_message(msg: ClientMessage, id: ConnectionId, state: &AppState) -> ServerMessage {
    match msg {
        ClientMessage::JoinPolyclinic(polyclinic_id) => {
            if state.service.store().polyclinic(polyclinic_id).is_err() {
                return ServerMessage::error(
                    "unknown_polyclinic",
                    format!("Polyclinic {} does not exist", polyclinic_id),
                );
            }
            join(Topic::Polyclinic(polyclinic_id), id, state)
        }
        ClientMessage::JoinDisplay => join(Topic::Display, id, state),
        ClientMessage::LeavePolyclinic(polyclinic_id) => {
            leave(Topic::Polyclinic(polyclinic_id), id, state)
        }
        ClientMessage::LeaveDisplay => leave(Topic::Display, id, state),
        ClientMessage::Ping => ServerMessage::Pong,
    }
}

/// Queue a direct reply; a reply that cannot be queued is logged and dropped
fn reply(connections: &ConnectionManager, id: ConnectionId, message: &ServerMessage) -> Delivery {
    let delivery = connections.send_to(id, message);
    if delivery != Delivery::Queued {
        tracing::warn!(connection_id = %id, ?delivery, "Reply dropped");
    }
    delivery
}

fn join(topic: Topic, id: ConnectionId, state: &AppState) -> ServerMessage {
    state.broadcaster.subscribe(id, topic);
    ServerMessage::Joined { topic }
}

fn leave(topic: Topic, id: ConnectionId, state: &AppState) -> ServerMessage {
    state.broadcaster.unsubscribe(id, topic);
    ServerMessage::Left { topic }
}
