//! Shared application state

use std::sync::Arc;

use super::broadcaster::EventBroadcaster;
use super::connections::ConnectionManager;
use crate::display::DisplayAggregator;
use crate::queue_store::QueueStore;
use crate::service::QueueService;

/// State shared by REST and WebSocket handlers
pub struct AppState {
    pub service: QueueService,
    pub aggregator: DisplayAggregator,
    pub broadcaster: Arc<EventBroadcaster>,
}

impl AppState {
    /// Wire the store, aggregator and broadcaster together.
    /// `subscriber_buffer` bounds each connection's outbound queue.
    pub fn new(store: Arc<QueueStore>, subscriber_buffer: usize) -> Self {
        let connections = Arc::new(ConnectionManager::new(subscriber_buffer));
        let broadcaster = Arc::new(EventBroadcaster::new(connections));
        let aggregator = DisplayAggregator::new(store.clone());
        let service = QueueService::new(store, broadcaster.clone());

        Self {
            service,
            aggregator,
            broadcaster,
        }
    }
}
