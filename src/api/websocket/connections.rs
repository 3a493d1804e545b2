//! Connection manager
//!
//! Owns the mapping from connection id to subscribed topics and the reverse
//! topic index. Both live behind one lock, so a publish sees a connection
//! either fully subscribed to a topic or not at all.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::ServerMessage;
use crate::types::Topic;

/// Connection identifier
pub type ConnectionId = Uuid;

/// Outbound frames are serialized once per publish and shared
pub type Outbound = Arc<str>;

/// Result of offering a frame to one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Outbound queue full; the frame was dropped for this connection only
    Lagging,
    /// Writer task already gone
    Closed,
}

struct Connection {
    tx: mpsc::Sender<Outbound>,
    topics: HashSet<Topic>,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, Connection>,
    members: HashMap<Topic, HashSet<ConnectionId>>,
}

/// Registry of live connections and their topic memberships
pub struct ConnectionManager {
    registry: RwLock<Registry>,
    buffer: usize,
}

impl ConnectionManager {
    /// Create a manager whose connections queue at most `buffer` frames
    pub fn new(buffer: usize) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            buffer: buffer.max(1),
        }
    }

    /// Register a new connection with no topics.
    /// The receiver feeds the connection's socket writer.
    pub fn connect(&self) -> (ConnectionId, mpsc::Receiver<Outbound>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.buffer);
        self.registry.write().connections.insert(
            id,
            Connection {
                tx,
                topics: HashSet::new(),
            },
        );
        (id, rx)
    }

    /// Add a connection to a topic. Idempotent.
    /// Returns false if the connection is unknown.
    pub fn subscribe(&self, id: ConnectionId, topic: Topic) -> bool {
        let mut registry = self.registry.write();
        let Some(conn) = registry.connections.get_mut(&id) else {
            return false;
        };
        conn.topics.insert(topic);
        registry.members.entry(topic).or_default().insert(id);
        true
    }

    /// Remove a connection from a topic
    pub fn unsubscribe(&self, id: ConnectionId, topic: Topic) {
        let mut registry = self.registry.write();
        if let Some(conn) = registry.connections.get_mut(&id) {
            conn.topics.remove(&topic);
        }
        remove_member(&mut registry.members, topic, id);
    }

    /// Forget a connection and every membership it held
    pub fn disconnect(&self, id: ConnectionId) {
        let mut registry = self.registry.write();
        if let Some(conn) = registry.connections.remove(&id) {
            for topic in conn.topics {
                remove_member(&mut registry.members, topic, id);
            }
        }
    }

    /// Offer a frame to every current member of `topic`.
    /// Runs to completion under the read lock and never waits on a socket.
    pub fn send_to_topic(&self, topic: Topic, frame: &Outbound) -> Vec<(ConnectionId, Delivery)> {
        let registry = self.registry.read();
        let Some(members) = registry.members.get(&topic) else {
            return Vec::new();
        };

        members
            .iter()
            .filter_map(|id| registry.connections.get(id).map(|conn| (*id, conn)))
            .map(|(id, conn)| (id, offer(&conn.tx, frame.clone())))
            .collect()
    }

    /// Send a frame to a single connection
    pub fn send_to(&self, id: ConnectionId, message: &ServerMessage) -> Delivery {
        let frame: Outbound = match serde_json::to_string(message) {
            Ok(json) => json.into(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize server message");
                return Delivery::Closed;
            }
        };
        match self.registry.read().connections.get(&id) {
            Some(conn) => offer(&conn.tx, frame),
            None => Delivery::Closed,
        }
    }

    /// Topics a connection is subscribed to
    pub fn topics_of(&self, id: ConnectionId) -> HashSet<Topic> {
        self.registry
            .read()
            .connections
            .get(&id)
            .map(|conn| conn.topics.clone())
            .unwrap_or_default()
    }

    /// Whether a connection is subscribed to a topic
    pub fn is_subscribed(&self, id: ConnectionId, topic: Topic) -> bool {
        self.registry
            .read()
            .members
            .get(&topic)
            .is_some_and(|members| members.contains(&id))
    }

    /// Number of members of a topic
    pub fn member_count(&self, topic: Topic) -> usize {
        self.registry.read().members.get(&topic).map_or(0, HashSet::len)
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        self.registry.read().connections.len()
    }
}

fn offer(tx: &mpsc::Sender<Outbound>, frame: Outbound) -> Delivery {
    match tx.try_send(frame) {
        Ok(()) => Delivery::Queued,
        Err(mpsc::error::TrySendError::Full(_)) => Delivery::Lagging,
        Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
    }
}

fn remove_member(members: &mut HashMap<Topic, HashSet<ConnectionId>>, topic: Topic, id: ConnectionId) {
    if let Some(set) = members.get_mut(&topic) {
        set.remove(&id);
        if set.is_empty() {
            members.remove(&topic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::thread;

    fn frame(text: &str) -> Outbound {
        Arc::from(text)
    }

    /// Both indexes describe the same memberships and hold no empty topic sets
    fn assert_consistent(manager: &ConnectionManager) {
        let registry = manager.registry.read();
        for (topic, members) in &registry.members {
            assert!(!members.is_empty(), "empty member set left for {topic}");
            for id in members {
                let conn = registry
                    .connections
                    .get(id)
                    .unwrap_or_else(|| panic!("{id} is a member of {topic} but not connected"));
                assert!(conn.topics.contains(topic), "{id} missing {topic} in its own topics");
            }
        }
        for (id, conn) in &registry.connections {
            for topic in &conn.topics {
                assert!(
                    registry.members.get(topic).is_some_and(|m| m.contains(id)),
                    "{id} lists {topic} but is not in its member set"
                );
            }
        }
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let manager = ConnectionManager::new(8);
        let (id, _rx) = manager.connect();

        assert!(manager.subscribe(id, Topic::Display));
        assert!(manager.subscribe(id, Topic::Display));

        assert_eq!(manager.member_count(Topic::Display), 1);
        assert_eq!(manager.topics_of(id).len(), 1);
    }

    #[test]
    fn test_subscribe_unknown_connection() {
        let manager = ConnectionManager::new(8);
        assert!(!manager.subscribe(Uuid::new_v4(), Topic::Display));
        assert_eq!(manager.member_count(Topic::Display), 0);
    }

    #[test]
    fn test_unsubscribe_removes_membership() {
        let manager = ConnectionManager::new(8);
        let (id, _rx) = manager.connect();
        manager.subscribe(id, Topic::Display);
        manager.subscribe(id, Topic::Polyclinic(1));

        manager.unsubscribe(id, Topic::Display);

        assert!(!manager.is_subscribed(id, Topic::Display));
        assert!(manager.is_subscribed(id, Topic::Polyclinic(1)));
    }

    #[test]
    fn test_disconnect_clears_every_topic() {
        let manager = ConnectionManager::new(8);
        let (id, _rx) = manager.connect();
        manager.subscribe(id, Topic::Display);
        manager.subscribe(id, Topic::Polyclinic(1));

        manager.disconnect(id);

        assert_eq!(manager.connection_count(), 0);
        assert_eq!(manager.member_count(Topic::Display), 0);
        assert_eq!(manager.member_count(Topic::Polyclinic(1)), 0);
    }

    #[tokio::test]
    async fn test_send_reaches_members_only() {
        let manager = ConnectionManager::new(8);
        let (a, mut rx_a) = manager.connect();
        let (_b, mut rx_b) = manager.connect();
        manager.subscribe(a, Topic::Display);

        let report = manager.send_to_topic(Topic::Display, &frame("hello"));

        assert_eq!(report, vec![(a, Delivery::Queued)]);
        assert_eq!(&*rx_a.recv().await.unwrap(), "hello");
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_full_queue_only_affects_that_connection() {
        let manager = ConnectionManager::new(1);
        let (slow, _rx_slow) = manager.connect();
        let (fast, mut rx_fast) = manager.connect();
        manager.subscribe(slow, Topic::Display);
        manager.subscribe(fast, Topic::Display);

        manager.send_to_topic(Topic::Display, &frame("one"));
        rx_fast.try_recv().unwrap();

        let report = manager.send_to_topic(Topic::Display, &frame("two"));
        let lookup: HashMap<_, _> = report.into_iter().collect();
        assert_eq!(lookup[&slow], Delivery::Lagging);
        assert_eq!(lookup[&fast], Delivery::Queued);
    }

    #[test]
    fn test_dropped_receiver_reports_closed() {
        let manager = ConnectionManager::new(4);
        let (id, rx) = manager.connect();
        manager.subscribe(id, Topic::Display);
        drop(rx);

        let report = manager.send_to_topic(Topic::Display, &frame("x"));
        assert_eq!(report, vec![(id, Delivery::Closed)]);
    }

    #[test]
    fn test_concurrent_churn_keeps_indexes_consistent() {
        const WORKERS: u64 = 6;
        const ROUNDS: usize = 300;

        let manager = ConnectionManager::new(4);
        // Connected but never subscribed; must never show up in a publish
        let bystanders: Vec<_> = (0..4).map(|_| manager.connect()).collect();
        let bystander_ids: HashSet<ConnectionId> = bystanders.iter().map(|(id, _)| *id).collect();

        let owners: Mutex<HashMap<ConnectionId, u64>> = Mutex::new(HashMap::new());
        let retired: Mutex<HashSet<ConnectionId>> = Mutex::new(HashSet::new());
        let done = AtomicBool::new(false);

        thread::scope(|scope| {
            let workers: Vec<_> = (0..WORKERS)
                .map(|worker| {
                    let (manager, owners, retired) = (&manager, &owners, &retired);
                    scope.spawn(move || {
                        let own = Topic::Polyclinic(worker);
                        for round in 0..ROUNDS {
                            let (id, rx) = manager.connect();
                            owners.lock().unwrap().insert(id, worker);

                            assert!(manager.subscribe(id, own));
                            if round % 2 == 0 {
                                manager.subscribe(id, Topic::Display);
                            }
                            if round % 3 == 0 {
                                manager.unsubscribe(id, own);
                                manager.subscribe(id, own);
                            }
                            if round % 5 == 0 {
                                manager.unsubscribe(id, Topic::Display);
                            }

                            manager.disconnect(id);
                            retired.lock().unwrap().insert(id);
                            drop(rx);
                        }
                    })
                })
                .collect();

            let publisher = scope.spawn(|| {
                let mut publishes = 0usize;
                loop {
                    let finished = done.load(Ordering::Acquire);
                    for polyclinic in 0..WORKERS {
                        let topic = Topic::Polyclinic(polyclinic);
                        let gone = retired.lock().unwrap().clone();
                        let report = manager.send_to_topic(topic, &frame("update"));

                        let mut seen = HashSet::new();
                        for (id, _) in &report {
                            assert!(seen.insert(*id), "{id} reported twice for {topic}");
                            assert!(!bystander_ids.contains(id), "bystander {id} got {topic}");
                            assert!(!gone.contains(id), "{id} reported after disconnect");
                            assert_eq!(owners.lock().unwrap().get(id), Some(&polyclinic));
                        }
                        publishes += 1;
                    }
                    let report = manager.send_to_topic(Topic::Display, &frame("update"));
                    assert!(report.iter().all(|(id, _)| !bystander_ids.contains(id)));
                    if finished {
                        break;
                    }
                }
                publishes
            });

            let checker = scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    assert_consistent(&manager);
                    thread::yield_now();
                }
            });

            for worker in workers {
                worker.join().unwrap();
            }
            done.store(true, Ordering::Release);
            assert!(publisher.join().unwrap() > 0);
            checker.join().unwrap();
        });

        assert_consistent(&manager);
        assert_eq!(manager.connection_count(), bystanders.len());
        assert!(manager.registry.read().members.is_empty());
        assert_eq!(retired.lock().unwrap().len(), WORKERS as usize * ROUNDS);
    }
}
