//! Data types for the queue display service
//!
//! Reference data (polyclinics), queue tickets, the derived display
//! projection and real-time topics.

mod display;
mod polyclinic;
mod ticket;
mod topic;

pub use display::{DisplayItem, DisplayStatus};
pub use polyclinic::{Polyclinic, PolyclinicId};
pub use ticket::{QueueTicket, TicketId, TicketStatus};
pub use topic::Topic;
