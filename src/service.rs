//! Queue service
//!
//! Applies queue mutations to the store and, once each mutation is
//! committed, publishes the matching notification on the polyclinic's topic
//! and on the display topic.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::{json, Value};

use crate::api::websocket::broadcaster::EventBroadcaster;
use crate::api::websocket::events::{CalledTicket, QueueEvent};
use crate::error::QueueResult;
use crate::queue_store::QueueStore;
use crate::types::{Polyclinic, PolyclinicId, QueueTicket, TicketId, Topic};

/// Mutation entry point shared by the REST handlers
pub struct QueueService {
    store: Arc<QueueStore>,
    broadcaster: Arc<EventBroadcaster>,
}

impl QueueService {
    pub fn new(store: Arc<QueueStore>, broadcaster: Arc<EventBroadcaster>) -> Self {
        Self { store, broadcaster }
    }

    pub fn store(&self) -> &Arc<QueueStore> {
        &self.store
    }

    pub fn register_polyclinic(&self, polyclinic: Polyclinic) -> QueueResult<Polyclinic> {
        let polyclinic = self.store.register_polyclinic(polyclinic)?;
        tracing::info!(polyclinic_id = polyclinic.id, code = %polyclinic.code, "Polyclinic registered");
        self.broadcaster
            .publish(Topic::Display, QueueEvent::Update, json!({ "polyclinicId": polyclinic.id }));
        Ok(polyclinic)
    }

    /// Issue a ticket for a patron
    pub fn take_ticket(&self, polyclinic_id: PolyclinicId) -> QueueResult<QueueTicket> {
        self.roll_session(Local::now().date_naive());
        let ticket = self.store.take_ticket(polyclinic_id)?;
        tracing::info!(polyclinic_id, number = ticket.number, "Ticket taken");
        self.notify(&ticket, QueueEvent::Update, update_payload(&ticket));
        Ok(ticket)
    }

    /// Call the oldest waiting ticket
    pub fn call_next(&self, polyclinic_id: PolyclinicId) -> QueueResult<QueueTicket> {
        self.roll_session(Local::now().date_naive());
        let ticket = self.store.call_next(polyclinic_id)?;
        self.announce(&ticket)?;
        Ok(ticket)
    }

    /// Call a specific waiting ticket
    pub fn call_ticket(&self, ticket_id: TicketId) -> QueueResult<QueueTicket> {
        self.roll_session(Local::now().date_naive());
        let ticket = self.store.call_ticket(ticket_id)?;
        self.announce(&ticket)?;
        Ok(ticket)
    }

    pub fn start_serving(&self, ticket_id: TicketId) -> QueueResult<QueueTicket> {
        self.roll_session(Local::now().date_naive());
        let ticket = self.store.start_serving(ticket_id)?;
        tracing::info!(polyclinic_id = ticket.polyclinic_id, number = ticket.number, "Serving ticket");
        self.notify(&ticket, QueueEvent::Update, update_payload(&ticket));
        Ok(ticket)
    }

    pub fn complete_ticket(&self, ticket_id: TicketId) -> QueueResult<QueueTicket> {
        self.roll_session(Local::now().date_naive());
        let ticket = self.store.complete_ticket(ticket_id)?;
        tracing::info!(polyclinic_id = ticket.polyclinic_id, number = ticket.number, "Ticket done");
        self.notify(&ticket, QueueEvent::Update, update_payload(&ticket));
        Ok(ticket)
    }

    /// Clear the session and tell every display and counter to refetch
    pub fn reset_session(&self) {
        self.store.reset_session(Local::now().date_naive());
        tracing::info!("Queue session reset");
        self.notify_all_reset();
    }

    /// Start a new session when the calendar day has changed
    pub fn roll_session(&self, today: NaiveDate) -> bool {
        let rolled = self.store.roll_session_if_needed(today);
        if rolled {
            tracing::info!(%today, "New queue session started");
            self.notify_all_reset();
        }
        rolled
    }

    fn announce(&self, ticket: &QueueTicket) -> QueueResult<()> {
        let polyclinic = self.store.polyclinic(ticket.polyclinic_id)?;
        tracing::info!(
            polyclinic_id = ticket.polyclinic_id,
            code = %polyclinic.code,
            number = ticket.number,
            "Ticket called"
        );
        let payload = serde_json::to_value(CalledTicket::new(ticket, polyclinic.code))?;
        self.notify(ticket, QueueEvent::Called, payload);
        Ok(())
    }

    fn notify(&self, ticket: &QueueTicket, event: QueueEvent, payload: Value) {
        self.broadcaster
            .publish(Topic::Polyclinic(ticket.polyclinic_id), event, payload.clone());
        self.broadcaster.publish(Topic::Display, event, payload);
    }

    fn notify_all_reset(&self) {
        let payload = json!({ "reset": true });
        for polyclinic in self.store.polyclinics() {
            self.broadcaster
                .publish(Topic::Polyclinic(polyclinic.id), QueueEvent::Update, payload.clone());
        }
        self.broadcaster.publish(Topic::Display, QueueEvent::Update, payload);
    }
}

fn update_payload(ticket: &QueueTicket) -> Value {
    json!({
        "polyclinicId": ticket.polyclinic_id,
        "ticketId": ticket.id,
        "number": ticket.number,
        "status": ticket.status,
    })
}
