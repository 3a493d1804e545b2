//! Display projection types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Polyclinic, TicketStatus};

/// Status shown on a display board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    Waiting,
    Called,
    Serving,
}

impl From<TicketStatus> for DisplayStatus {
    fn from(status: TicketStatus) -> Self {
        match status {
            TicketStatus::Called => DisplayStatus::Called,
            TicketStatus::Serving => DisplayStatus::Serving,
            TicketStatus::Waiting | TicketStatus::Done => DisplayStatus::Waiting,
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisplayStatus::Waiting => "waiting",
            DisplayStatus::Called => "called",
            DisplayStatus::Serving => "serving",
        };
        f.write_str(s)
    }
}

/// Current queue state of one polyclinic, derived on demand and never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub polyclinic: Polyclinic,
    #[serde(rename = "currentNumber")]
    pub current_number: u32,
    pub status: DisplayStatus,
    #[serde(rename = "waitingCount")]
    pub waiting_count: usize,
}
