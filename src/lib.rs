//! Queue Display Service
//!
//! Live patient-queue displays for a hospital: counters mutate the queue,
//! every display board and counter view is told something changed, and each
//! of them pulls a fresh snapshot.
//!
//! # Modules
//!
//! - `types`: Polyclinics, queue tickets, display items, topics
//! - `queue_store`: In-memory source of truth behind the `QueueReader` trait
//! - `display`: Display aggregator deriving one item per polyclinic
//! - `service`: Queue mutations with notify-after-commit publishing
//! - `api`: REST endpoints, WebSocket channel, broadcaster, connection manager
//! - `client`: Subscriber state machine and network runner for displays
//! - `config`, `logging`, `error`: Ambient plumbing
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use queue_display::api::http::create_router;
//! use queue_display::api::websocket::AppState;
//! use queue_display::{Polyclinic, QueueStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(
//!         QueueStore::with_polyclinics(vec![Polyclinic::new(1, "P001", "General")]).unwrap(),
//!     );
//!     let app = create_router(Arc::new(AppState::new(store, 64)));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod queue_store;
pub mod service;
pub mod types;

// Re-export commonly used items at crate root
pub use display::DisplayAggregator;
pub use error::{QueueError, QueueResult};
pub use queue_store::{PolyclinicQueue, QueueReader, QueueStore};
pub use service::QueueService;
pub use types::{
    DisplayItem, DisplayStatus, Polyclinic, PolyclinicId, QueueTicket, TicketId, TicketStatus,
    Topic,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
