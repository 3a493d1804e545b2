//! Queue ticket types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PolyclinicId;

/// Ticket identifier, unique across polyclinics within a session
pub type TicketId = u64;

/// Lifecycle of a queue ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Waiting,
    Called,
    Serving,
    Done,
}

impl TicketStatus {
    /// Whether the server accepts a transition from `self` to `next`
    pub fn can_transition_to(self, next: TicketStatus) -> bool {
        matches!(
            (self, next),
            (TicketStatus::Waiting, TicketStatus::Called)
                | (TicketStatus::Called, TicketStatus::Serving)
                | (TicketStatus::Called, TicketStatus::Done)
                | (TicketStatus::Serving, TicketStatus::Done)
        )
    }

    /// Called or serving
    pub fn is_active(self) -> bool {
        matches!(self, TicketStatus::Called | TicketStatus::Serving)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TicketStatus::Waiting => "waiting",
            TicketStatus::Called => "called",
            TicketStatus::Serving => "serving",
            TicketStatus::Done => "done",
        };
        f.write_str(s)
    }
}

/// A numbered ticket taken by a patron at one polyclinic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueTicket {
    pub id: TicketId,
    #[serde(rename = "polyclinicId")]
    pub polyclinic_id: PolyclinicId,
    pub number: u32,
    pub status: TicketStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "transitionedAt")]
    pub transitioned_at: DateTime<Utc>,
    /// Set when the ticket reaches `serving`; no-shows never get one
    #[serde(rename = "servedAt", default, skip_serializing_if = "Option::is_none")]
    pub served_at: Option<DateTime<Utc>>,
}

impl QueueTicket {
    /// Create a waiting ticket stamped with the current time
    pub fn new(id: TicketId, polyclinic_id: PolyclinicId, number: u32) -> Self {
        let now = Utc::now();
        Self {
            id,
            polyclinic_id,
            number,
            status: TicketStatus::Waiting,
            created_at: now,
            transitioned_at: now,
            served_at: None,
        }
    }
}
