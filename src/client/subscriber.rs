//! Client subscriber state machine
//!
//! Pure state machine for a display or counter view. It never touches the
//! network: each input returns the [`Command`]s the caller must carry out.
//! Notifications are only refetch hints; the fetched snapshot is the truth.

use crate::api::websocket::events::{CalledTicket, ClientMessage, ServerMessage};
use crate::types::{DisplayItem, Topic};

/// Connection lifecycle of one subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberState {
    Connecting,
    Subscribed,
    Disconnected,
}

/// Work the caller must perform
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch the full display snapshot
    Fetch,
    /// Send a frame on the real-time channel
    Send(ClientMessage),
    /// Audio/visual signal for a called number
    Announce(CalledTicket),
}

/// One display or counter view
#[derive(Debug)]
pub struct ClientSubscriber {
    topic: Topic,
    state: SubscriberState,
    snapshot: Vec<DisplayItem>,
    fetch_failures: u64,
}

impl ClientSubscriber {
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            state: SubscriberState::Connecting,
            snapshot: Vec::new(),
            fetch_failures: 0,
        }
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn state(&self) -> SubscriberState {
        self.state
    }

    /// Last successfully fetched snapshot
    pub fn snapshot(&self) -> &[DisplayItem] {
        &self.snapshot
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures
    }

    /// Channel is up: full fetch first, then join the topic.
    /// Valid after a fresh start or a reconnect.
    pub fn on_connected(&mut self) -> Vec<Command> {
        self.state = SubscriberState::Subscribed;
        vec![Command::Fetch, Command::Send(ClientMessage::join(self.topic))]
    }

    /// Channel dropped; membership is gone and must be re-established
    pub fn on_disconnected(&mut self) {
        self.state = SubscriberState::Disconnected;
    }

    /// About to retry the channel
    pub fn on_reconnecting(&mut self) {
        self.state = SubscriberState::Connecting;
    }

    /// React to a server frame
    pub fn on_message(&mut self, message: &ServerMessage) -> Vec<Command> {
        if self.state != SubscriberState::Subscribed {
            return Vec::new();
        }

        match message {
            ServerMessage::QueueUpdate(_) => vec![Command::Fetch],
            ServerMessage::QueueCalled(payload) => {
                let mut commands = vec![Command::Fetch];
                match serde_json::from_value::<CalledTicket>(payload.clone()) {
                    Ok(called) => commands.push(Command::Announce(called)),
                    Err(e) => tracing::debug!(error = %e, "queue:called payload not understood"),
                }
                commands
            }
            ServerMessage::Error { code, message } => {
                tracing::warn!(%code, %message, "Server reported an error");
                Vec::new()
            }
            ServerMessage::Ready { .. }
            | ServerMessage::Joined { .. }
            | ServerMessage::Left { .. }
            | ServerMessage::Pong => Vec::new(),
        }
    }

    /// Record a fetch result. On failure the previous snapshot stays.
    /// Returns true if the snapshot was replaced.
    pub fn apply_fetch<E: std::fmt::Display>(&mut self, result: Result<Vec<DisplayItem>, E>) -> bool {
        match result {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                true
            }
            Err(e) => {
                self.fetch_failures += 1;
                tracing::warn!(error = %e, "Snapshot fetch failed, keeping previous display");
                false
            }
        }
    }
}
