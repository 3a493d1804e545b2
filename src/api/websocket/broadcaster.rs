//! Event broadcaster
//!
//! Fans queue notifications out to the members of a topic through an
//! injected [`ConnectionManager`]. Delivery is best effort: no persistence,
//! no replay, and a client that joins after a publish misses it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;

use super::connections::{ConnectionId, ConnectionManager, Delivery, Outbound};
use super::events::QueueEvent;
use crate::types::Topic;

/// Outcome of one publish
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Members of the topic at publish time
    pub attempted: usize,
    pub delivered: usize,
    /// Connections whose frame was dropped
    pub dropped: Vec<ConnectionId>,
}

/// Topic-partitioned notification publisher
pub struct EventBroadcaster {
    connections: Arc<ConnectionManager>,
    sequence_counter: AtomicU64,
}

impl EventBroadcaster {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self {
            connections,
            sequence_counter: AtomicU64::new(0),
        }
    }

    /// The connection manager this broadcaster publishes through
    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    /// Add a connection to a topic. Idempotent.
    pub fn subscribe(&self, id: ConnectionId, topic: Topic) -> bool {
        let added = self.connections.subscribe(id, topic);
        if added {
            tracing::debug!(connection_id = %id, %topic, "Subscribed");
        }
        added
    }

    /// Remove a connection from a topic
    pub fn unsubscribe(&self, id: ConnectionId, topic: Topic) {
        self.connections.unsubscribe(id, topic);
        tracing::debug!(connection_id = %id, %topic, "Unsubscribed");
    }

    /// Drop every membership of a closed connection
    pub fn on_disconnect(&self, id: ConnectionId) {
        self.connections.disconnect(id);
        tracing::debug!(connection_id = %id, "Connection removed");
    }

    /// Send `event` to every connection subscribed to `topic` right now.
    /// A failure for one connection is logged and does not stop the rest.
    pub fn publish(&self, topic: Topic, event: QueueEvent, payload: Value) -> PublishReport {
        let seq = self.sequence_counter.fetch_add(1, Ordering::SeqCst);
        let message = event.into_message(payload);
        let frame: Outbound = match serde_json::to_string(&message) {
            Ok(json) => json.into(),
            Err(e) => {
                tracing::error!(%topic, event = event.as_str(), error = %e, "Failed to serialize event");
                return PublishReport::default();
            }
        };

        let results = self.connections.send_to_topic(topic, &frame);
        let mut report = PublishReport {
            attempted: results.len(),
            ..PublishReport::default()
        };

        for (id, delivery) in results {
            match delivery {
                Delivery::Queued => report.delivered += 1,
                Delivery::Lagging => {
                    tracing::warn!(connection_id = %id, %topic, seq, "Subscriber lagging, event dropped");
                    report.dropped.push(id);
                }
                Delivery::Closed => {
                    tracing::warn!(connection_id = %id, %topic, seq, "Subscriber writer closed, event dropped");
                    report.dropped.push(id);
                }
            }
        }

        tracing::debug!(
            %topic,
            event = event.as_str(),
            seq,
            attempted = report.attempted,
            delivered = report.delivered,
            "Published"
        );
        report
    }

    /// Number of publishes so far
    pub fn published_count(&self) -> u64 {
        self.sequence_counter.load(Ordering::SeqCst)
    }
}
