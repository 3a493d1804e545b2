//! WebSocket module for real-time queue notifications
//!
//! Provides the WebSocket endpoint at `/ws`. Clients join a topic
//! (`display` or `polyclinic:<id>`) and receive `queue:update` /
//! `queue:called` hints, after which they refetch the display snapshot.
//!
//! ## Features
//! - Topic membership owned by an explicit [`ConnectionManager`]
//! - Bounded per-connection outbound queues, so a slow client only hurts itself
//! - Membership is dropped on disconnect; reconnecting clients must join again

pub mod broadcaster;
pub mod connections;
pub mod events;
pub mod handler;
pub mod state;

// Re-export commonly used items
pub use broadcaster::{EventBroadcaster, PublishReport};
pub use connections::{ConnectionId, ConnectionManager, Delivery};
pub use events::{CalledTicket, ClientMessage, QueueEvent, ServerMessage};
pub use state::AppState;
