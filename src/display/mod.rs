//! Display Aggregator
//!
//! Derives a [`DisplayItem`] per polyclinic from queue store state. Every
//! call recomputes from the store; nothing is cached between requests.

use std::sync::Arc;

use crate::error::{QueueError, QueueResult};
use crate::queue_store::{PolyclinicQueue, QueueReader};
use crate::types::{DisplayItem, DisplayStatus, PolyclinicId, QueueTicket, TicketStatus};

/// Computes display snapshots from a queue reader
#[derive(Clone)]
pub struct DisplayAggregator {
    reader: Arc<dyn QueueReader>,
}

impl DisplayAggregator {
    pub fn new(reader: Arc<dyn QueueReader>) -> Self {
        Self { reader }
    }

    /// Current display state of every polyclinic, ordered by polyclinic code
    pub fn get_display_snapshot(&self) -> QueueResult<Vec<DisplayItem>> {
        let mut queues = self.reader.polyclinic_queues();
        queues.sort_by(|a, b| a.polyclinic.code.cmp(&b.polyclinic.code));
        queues.iter().map(display_item).collect()
    }

    /// Current display state of one polyclinic
    pub fn get_polyclinic_item(&self, id: PolyclinicId) -> QueueResult<DisplayItem> {
        let queue = self
            .reader
            .polyclinic_queue(id)
            .ok_or(QueueError::PolyclinicNotFound(id))?;
        display_item(&queue)
    }
}

/// Project one polyclinic's tickets onto its display item
fn display_item(queue: &PolyclinicQueue) -> QueueResult<DisplayItem> {
    let serving_count = queue
        .tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Serving)
        .count();
    if serving_count > 1 {
        tracing::error!(
            polyclinic_id = queue.polyclinic.id,
            polyclinic_code = %queue.polyclinic.code,
            serving_count,
            "Queue store reports more than one serving ticket"
        );
        return Err(QueueError::IntegrityViolation {
            polyclinic_id: queue.polyclinic.id,
            count: serving_count,
        });
    }

    let waiting_count = queue
        .tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Waiting)
        .count();

    let active = latest(queue.tickets.iter().filter(|t| t.status.is_active()));
    let (current_number, status) = match active {
        Some(ticket) => (ticket.number, DisplayStatus::from(ticket.status)),
        None => {
            // No-shows were called but never served, so they do not count
            let last_served = queue
                .tickets
                .iter()
                .filter_map(|t| t.served_at.map(|at| (at, t.number)))
                .max();
            (last_served.map_or(0, |(_, number)| number), DisplayStatus::Waiting)
        }
    };

    Ok(DisplayItem {
        polyclinic: queue.polyclinic.clone(),
        current_number,
        status,
        waiting_count,
    })
}

/// Most recently transitioned ticket; the higher number breaks timestamp ties
fn latest<'a>(tickets: impl Iterator<Item = &'a QueueTicket>) -> Option<&'a QueueTicket> {
    tickets.max_by_key(|t| (t.transitioned_at, t.number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue_store::QueueStore;
    use crate::types::Polyclinic;
    use chrono::{Duration, Utc};

    struct FixedReader(Vec<PolyclinicQueue>);

    impl QueueReader for FixedReader {
        fn polyclinic_queues(&self) -> Vec<PolyclinicQueue> {
            self.0.clone()
        }

        fn polyclinic_queue(&self, id: PolyclinicId) -> Option<PolyclinicQueue> {
            self.0.iter().find(|q| q.polyclinic.id == id).cloned()
        }
    }

    fn ticket(id: u64, number: u32, status: TicketStatus, age_secs: i64) -> QueueTicket {
        let mut t = QueueTicket::new(id, 1, number);
        t.status = status;
        t.transitioned_at = Utc::now() - Duration::seconds(age_secs);
        if matches!(status, TicketStatus::Serving | TicketStatus::Done) {
            t.served_at = Some(t.transitioned_at);
        }
        t
    }

    fn no_show(id: u64, number: u32, age_secs: i64) -> QueueTicket {
        let mut t = ticket(id, number, TicketStatus::Done, age_secs);
        t.served_at = None;
        t
    }

    fn general(tickets: Vec<QueueTicket>) -> PolyclinicQueue {
        PolyclinicQueue {
            polyclinic: Polyclinic::new(1, "P001", "General"),
            tickets,
        }
    }

    #[test]
    fn test_serving_scenario() {
        let reader = FixedReader(vec![general(vec![
            ticket(1, 1, TicketStatus::Done, 40),
            ticket(2, 2, TicketStatus::Serving, 30),
            ticket(3, 3, TicketStatus::Waiting, 20),
            ticket(4, 4, TicketStatus::Waiting, 10),
        ])]);
        let aggregator = DisplayAggregator::new(Arc::new(reader));

        let snapshot = aggregator.get_display_snapshot().unwrap();

        assert_eq!(
            snapshot,
            vec![DisplayItem {
                polyclinic: Polyclinic::new(1, "P001", "General"),
                current_number: 2,
                status: DisplayStatus::Serving,
                waiting_count: 2,
            }]
        );
    }

    #[test]
    fn test_no_active_ticket_shows_last_served() {
        let reader = FixedReader(vec![general(vec![
            ticket(1, 1, TicketStatus::Done, 40),
            ticket(2, 2, TicketStatus::Done, 30),
            ticket(3, 3, TicketStatus::Waiting, 20),
        ])]);
        let aggregator = DisplayAggregator::new(Arc::new(reader));

        let item = aggregator.get_polyclinic_item(1).unwrap();
        assert_eq!(item.current_number, 2);
        assert_eq!(item.status, DisplayStatus::Waiting);
        assert_eq!(item.waiting_count, 1);
    }

    #[test]
    fn test_no_show_does_not_replace_last_served() {
        let reader = FixedReader(vec![general(vec![
            ticket(1, 1, TicketStatus::Done, 40),
            no_show(2, 2, 10),
        ])]);
        let aggregator = DisplayAggregator::new(Arc::new(reader));

        let item = aggregator.get_polyclinic_item(1).unwrap();
        assert_eq!(item.current_number, 1);
        assert_eq!(item.status, DisplayStatus::Waiting);
    }

    #[test]
    fn test_no_show_through_store_keeps_served_number() {
        let store = Arc::new(QueueStore::new());
        store.register_polyclinic(Polyclinic::new(1, "P001", "General")).unwrap();
        let first = store.take_ticket(1).unwrap();
        let second = store.take_ticket(1).unwrap();
        store.call_ticket(first.id).unwrap();
        store.start_serving(first.id).unwrap();
        store.complete_ticket(first.id).unwrap();
        store.call_ticket(second.id).unwrap();
        store.complete_ticket(second.id).unwrap();
        let aggregator = DisplayAggregator::new(store);

        let item = aggregator.get_polyclinic_item(1).unwrap();
        assert_eq!(item.current_number, 1);
        assert_eq!(item.status, DisplayStatus::Waiting);
        assert_eq!(item.waiting_count, 0);
    }

    #[test]
    fn test_only_no_shows_shows_zero() {
        let reader = FixedReader(vec![general(vec![no_show(1, 1, 10)])]);
        let aggregator = DisplayAggregator::new(Arc::new(reader));
        assert_eq!(aggregator.get_polyclinic_item(1).unwrap().current_number, 0);
    }

    #[test]
    fn test_empty_queue_shows_zero() {
        let aggregator = DisplayAggregator::new(Arc::new(FixedReader(vec![general(vec![])])));
        let item = aggregator.get_polyclinic_item(1).unwrap();
        assert_eq!(item.current_number, 0);
        assert_eq!(item.status, DisplayStatus::Waiting);
        assert_eq!(item.waiting_count, 0);
    }

    #[test]
    fn test_most_recent_active_ticket_wins() {
        let reader = FixedReader(vec![general(vec![
            ticket(1, 1, TicketStatus::Serving, 60),
            ticket(2, 2, TicketStatus::Called, 5),
        ])]);
        let aggregator = DisplayAggregator::new(Arc::new(reader));

        let item = aggregator.get_polyclinic_item(1).unwrap();
        assert_eq!(item.current_number, 2);
        assert_eq!(item.status, DisplayStatus::Called);
    }

    #[test]
    fn test_two_serving_tickets_is_integrity_fault() {
        let reader = FixedReader(vec![general(vec![
            ticket(1, 1, TicketStatus::Serving, 10),
            ticket(2, 2, TicketStatus::Serving, 5),
        ])]);
        let aggregator = DisplayAggregator::new(Arc::new(reader));

        let result = aggregator.get_display_snapshot();
        assert!(matches!(
            result,
            Err(QueueError::IntegrityViolation { polyclinic_id: 1, count: 2 })
        ));
    }

    #[test]
    fn test_snapshot_ordered_by_code() {
        let store = QueueStore::new();
        store.register_polyclinic(Polyclinic::new(1, "P003", "Eye")).unwrap();
        store.register_polyclinic(Polyclinic::new(2, "P001", "General")).unwrap();
        store.register_polyclinic(Polyclinic::new(3, "P002", "Dental")).unwrap();
        let aggregator = DisplayAggregator::new(Arc::new(store));

        let codes: Vec<String> = aggregator
            .get_display_snapshot()
            .unwrap()
            .into_iter()
            .map(|item| item.polyclinic.code)
            .collect();
        assert_eq!(codes, vec!["P001", "P002", "P003"]);
    }

    #[test]
    fn test_snapshot_is_pure() {
        let store = Arc::new(QueueStore::new());
        store.register_polyclinic(Polyclinic::new(1, "P001", "General")).unwrap();
        let t = store.take_ticket(1).unwrap();
        store.take_ticket(1).unwrap();
        store.call_ticket(t.id).unwrap();
        let aggregator = DisplayAggregator::new(store);

        let first = aggregator.get_display_snapshot().unwrap();
        let second = aggregator.get_display_snapshot().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_polyclinic() {
        let aggregator = DisplayAggregator::new(Arc::new(FixedReader(vec![])));
        assert!(matches!(
            aggregator.get_polyclinic_item(9),
            Err(QueueError::PolyclinicNotFound(9))
        ));
    }
}
