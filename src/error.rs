//! Error types for queue operations

use thiserror::Error;

use crate::types::{PolyclinicId, TicketId, TicketStatus};

/// Errors raised by the queue store, aggregator and configuration
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Polyclinic not found: {0}")]
    PolyclinicNotFound(PolyclinicId),

    #[error("Ticket not found: {0}")]
    TicketNotFound(TicketId),

    #[error("Polyclinic already registered: {0}")]
    DuplicatePolyclinic(String),

    #[error("No waiting tickets for polyclinic {0}")]
    NothingWaiting(PolyclinicId),

    #[error("Ticket {ticket_id} cannot move from {from} to {to}")]
    InvalidTransition {
        ticket_id: TicketId,
        from: TicketStatus,
        to: TicketStatus,
    },

    #[error("Polyclinic {polyclinic_id} is already serving ticket #{number}")]
    AlreadyServing { polyclinic_id: PolyclinicId, number: u32 },

    #[error("Data integrity fault: polyclinic {polyclinic_id} has {count} tickets serving")]
    IntegrityViolation { polyclinic_id: PolyclinicId, count: usize },

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
