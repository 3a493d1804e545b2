//! Queue Store - source of truth for polyclinics and tickets
//!
//! The store owns all queue state behind a single lock. Readers (the display
//! aggregator) depend only on [`QueueReader`], so any persisted backend can
//! stand in for the in-memory [`QueueStore`].

mod session;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate, Utc};
use parking_lot::RwLock;

use crate::error::{QueueError, QueueResult};
use crate::types::{Polyclinic, PolyclinicId, QueueTicket, TicketId, TicketStatus};

/// One polyclinic together with its tickets for the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyclinicQueue {
    pub polyclinic: Polyclinic,
    pub tickets: Vec<QueueTicket>,
}

/// Read access to queue state
///
/// Each call observes a single consistent state.
pub trait QueueReader: Send + Sync {
    /// All polyclinics with their tickets
    fn polyclinic_queues(&self) -> Vec<PolyclinicQueue>;

    /// One polyclinic with its tickets
    fn polyclinic_queue(&self, id: PolyclinicId) -> Option<PolyclinicQueue>;
}

#[derive(Debug)]
pub(crate) struct QueueState {
    polyclinics: BTreeMap<PolyclinicId, Polyclinic>,
    tickets: BTreeMap<TicketId, QueueTicket>,
    next_number: HashMap<PolyclinicId, u32>,
    next_ticket_id: TicketId,
    session_date: NaiveDate,
}

impl QueueState {
    fn new(session_date: NaiveDate) -> Self {
        Self {
            polyclinics: BTreeMap::new(),
            tickets: BTreeMap::new(),
            next_number: HashMap::new(),
            next_ticket_id: 1,
            session_date,
        }
    }

    fn queue_of(&self, polyclinic: &Polyclinic) -> PolyclinicQueue {
        let tickets = self
            .tickets
            .values()
            .filter(|t| t.polyclinic_id == polyclinic.id)
            .cloned()
            .collect();
        PolyclinicQueue {
            polyclinic: polyclinic.clone(),
            tickets,
        }
    }

    fn transition(&mut self, ticket_id: TicketId, to: TicketStatus) -> QueueResult<QueueTicket> {
        let ticket = self
            .tickets
            .get_mut(&ticket_id)
            .ok_or(QueueError::TicketNotFound(ticket_id))?;

        if !ticket.status.can_transition_to(to) {
            return Err(QueueError::InvalidTransition {
                ticket_id,
                from: ticket.status,
                to,
            });
        }

        let now = Utc::now();
        ticket.status = to;
        ticket.transitioned_at = now;
        if to == TicketStatus::Serving {
            ticket.served_at = Some(now);
        }
        Ok(ticket.clone())
    }
}

/// In-memory, thread-safe queue store
#[derive(Debug)]
pub struct QueueStore {
    pub(crate) state: RwLock<QueueState>,
}

impl QueueStore {
    /// Create an empty store for today's session
    pub fn new() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    /// Create an empty store whose session started on `date`
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            state: RwLock::new(QueueState::new(date)),
        }
    }

    /// Create a store seeded with the given polyclinics
    pub fn with_polyclinics(polyclinics: Vec<Polyclinic>) -> QueueResult<Self> {
        let store = Self::new();
        for polyclinic in polyclinics {
            store.register_polyclinic(polyclinic)?;
        }
        Ok(store)
    }

    /// Create a store seeded from a JSON array of polyclinics
    pub fn from_file(path: impl AsRef<Path>) -> QueueResult<Self> {
        let content = fs::read_to_string(path)?;
        let polyclinics: Vec<Polyclinic> = serde_json::from_str(&content)?;
        Self::with_polyclinics(polyclinics)
    }

    /// Register a polyclinic. Ids and codes must be unique.
    pub fn register_polyclinic(&self, polyclinic: Polyclinic) -> QueueResult<Polyclinic> {
        let mut state = self.state.write();

        if state.polyclinics.contains_key(&polyclinic.id) {
            return Err(QueueError::DuplicatePolyclinic(polyclinic.id.to_string()));
        }
        if state.polyclinics.values().any(|p| p.code == polyclinic.code) {
            return Err(QueueError::DuplicatePolyclinic(polyclinic.code));
        }

        state.polyclinics.insert(polyclinic.id, polyclinic.clone());
        Ok(polyclinic)
    }

    /// All registered polyclinics, by id
    pub fn polyclinics(&self) -> Vec<Polyclinic> {
        self.state.read().polyclinics.values().cloned().collect()
    }

    /// Look up a single polyclinic
    pub fn polyclinic(&self, id: PolyclinicId) -> QueueResult<Polyclinic> {
        self.state
            .read()
            .polyclinics
            .get(&id)
            .cloned()
            .ok_or(QueueError::PolyclinicNotFound(id))
    }

    /// Look up a single ticket
    pub fn ticket(&self, ticket_id: TicketId) -> QueueResult<QueueTicket> {
        self.state
            .read()
            .tickets
            .get(&ticket_id)
            .cloned()
            .ok_or(QueueError::TicketNotFound(ticket_id))
    }

    /// Issue the next numbered ticket for a polyclinic
    pub fn take_ticket(&self, polyclinic_id: PolyclinicId) -> QueueResult<QueueTicket> {
        let mut state = self.state.write();

        if !state.polyclinics.contains_key(&polyclinic_id) {
            return Err(QueueError::PolyclinicNotFound(polyclinic_id));
        }

        let number = {
            let next = state.next_number.entry(polyclinic_id).or_insert(1);
            let number = *next;
            *next += 1;
            number
        };
        let id = state.next_ticket_id;
        state.next_ticket_id += 1;

        let ticket = QueueTicket::new(id, polyclinic_id, number);
        state.tickets.insert(id, ticket.clone());
        Ok(ticket)
    }

    /// Call the oldest waiting ticket of a polyclinic
    pub fn call_next(&self, polyclinic_id: PolyclinicId) -> QueueResult<QueueTicket> {
        let mut state = self.state.write();

        if !state.polyclinics.contains_key(&polyclinic_id) {
            return Err(QueueError::PolyclinicNotFound(polyclinic_id));
        }

        let next_id = state
            .tickets
            .values()
            .filter(|t| t.polyclinic_id == polyclinic_id && t.status == TicketStatus::Waiting)
            .min_by_key(|t| t.number)
            .map(|t| t.id)
            .ok_or(QueueError::NothingWaiting(polyclinic_id))?;

        state.transition(next_id, TicketStatus::Called)
    }

    /// Call a specific waiting ticket
    pub fn call_ticket(&self, ticket_id: TicketId) -> QueueResult<QueueTicket> {
        self.state.write().transition(ticket_id, TicketStatus::Called)
    }

    /// Move a called ticket to serving
    ///
    /// Refuses while another ticket of the same polyclinic is serving.
    pub fn start_serving(&self, ticket_id: TicketId) -> QueueResult<QueueTicket> {
        let mut state = self.state.write();

        let polyclinic_id = state
            .tickets
            .get(&ticket_id)
            .map(|t| t.polyclinic_id)
            .ok_or(QueueError::TicketNotFound(ticket_id))?;

        if let Some(serving) = state.tickets.values().find(|t| {
            t.polyclinic_id == polyclinic_id && t.status == TicketStatus::Serving && t.id != ticket_id
        }) {
            return Err(QueueError::AlreadyServing {
                polyclinic_id,
                number: serving.number,
            });
        }

        state.transition(ticket_id, TicketStatus::Serving)
    }

    /// Finish a serving ticket, or drop a called ticket as a no-show
    pub fn complete_ticket(&self, ticket_id: TicketId) -> QueueResult<QueueTicket> {
        self.state.write().transition(ticket_id, TicketStatus::Done)
    }
}

impl Default for QueueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueReader for QueueStore {
    fn polyclinic_queues(&self) -> Vec<PolyclinicQueue> {
        let state = self.state.read();
        state.polyclinics.values().map(|p| state.queue_of(p)).collect()
    }

    fn polyclinic_queue(&self, id: PolyclinicId) -> Option<PolyclinicQueue> {
        let state = self.state.read();
        state.polyclinics.get(&id).map(|p| state.queue_of(p))
    }
}
