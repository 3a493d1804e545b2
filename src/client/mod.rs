//! Display/counter client
//!
//! [`ClientSubscriber`] holds the contract (fetch, join, refetch on every
//! hint, rejoin after reconnect); [`DisplayClient`] runs it over the network.

pub mod runner;
pub mod subscriber;

pub use runner::{ClientEvent, DisplayClient};
pub use subscriber::{ClientSubscriber, Command, SubscriberState};
