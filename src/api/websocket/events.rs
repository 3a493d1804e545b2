//! Real-time channel message types
//!
//! Frames are JSON text of the form `{"event": "...", "payload": ...}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{PolyclinicId, QueueTicket, Topic};

/// Notification kinds the broadcaster publishes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueEvent {
    #[serde(rename = "queue:update")]
    Update,
    #[serde(rename = "queue:called")]
    Called,
}

impl QueueEvent {
    /// Wrap a payload into the matching server message
    pub fn into_message(self, payload: Value) -> ServerMessage {
        match self {
            QueueEvent::Update => ServerMessage::QueueUpdate(payload),
            QueueEvent::Called => ServerMessage::QueueCalled(payload),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueueEvent::Update => "queue:update",
            QueueEvent::Called => "queue:called",
        }
    }
}

/// Messages sent from server to client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ServerMessage {
    /// Sent once after the socket is accepted
    #[serde(rename = "connection:ready")]
    Ready {
        #[serde(rename = "connectionId")]
        connection_id: String,
    },

    #[serde(rename = "joined")]
    Joined { topic: Topic },

    #[serde(rename = "left")]
    Left { topic: Topic },

    /// Queue state changed; payload is only a hint
    #[serde(rename = "queue:update")]
    QueueUpdate(Value),

    /// A ticket was called
    #[serde(rename = "queue:called")]
    QueueCalled(Value),

    #[serde(rename = "pong")]
    Pong,

    #[serde(rename = "error")]
    Error { code: String, message: String },
}

impl ServerMessage {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Messages sent from client to server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ClientMessage {
    #[serde(rename = "join:polyclinic")]
    JoinPolyclinic(PolyclinicId),

    #[serde(rename = "join:display")]
    JoinDisplay,

    #[serde(rename = "leave:polyclinic")]
    LeavePolyclinic(PolyclinicId),

    #[serde(rename = "leave:display")]
    LeaveDisplay,

    #[serde(rename = "ping")]
    Ping,
}

impl ClientMessage {
    /// The join message for a topic
    pub fn join(topic: Topic) -> Self {
        match topic {
            Topic::Display => ClientMessage::JoinDisplay,
            Topic::Polyclinic(id) => ClientMessage::JoinPolyclinic(id),
        }
    }
}

/// Payload of a `queue:called` notification
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalledTicket {
    #[serde(rename = "ticketId")]
    pub ticket_id: u64,
    #[serde(rename = "polyclinicId")]
    pub polyclinic_id: PolyclinicId,
    #[serde(rename = "polyclinicCode")]
    pub polyclinic_code: String,
    pub number: u32,
}

impl CalledTicket {
    pub fn new(ticket: &QueueTicket, polyclinic_code: impl Into<String>) -> Self {
        Self {
            ticket_id: ticket.id,
            polyclinic_id: ticket.polyclinic_id,
            polyclinic_code: polyclinic_code.into(),
            number: ticket.number,
        }
    }
}
