//! Daily session handling

use chrono::NaiveDate;

use super::QueueStore;

impl QueueStore {
    /// Date the current session started
    pub fn session_date(&self) -> NaiveDate {
        self.state.read().session_date
    }

    /// Drop every ticket and restart numbering, keeping polyclinics
    pub fn reset_session(&self, date: NaiveDate) {
        let mut state = self.state.write();
        state.tickets.clear();
        state.next_number.clear();
        state.session_date = date;
    }

    /// Start a new session when `today` is past the session date.
    /// Returns true if a reset happened.
    pub fn roll_session_if_needed(&self, today: NaiveDate) -> bool {
        if self.state.read().session_date >= today {
            return false;
        }

        let mut state = self.state.write();
        // Another writer may have rolled between the two locks
        if state.session_date >= today {
            return false;
        }
        state.tickets.clear();
        state.next_number.clear();
        state.session_date = today;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue_store::QueueReader;
    use crate::types::Polyclinic;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_rollover_clears_tickets_and_numbering() {
        let store = QueueStore::for_date(date(1));
        store
            .register_polyclinic(Polyclinic::new(1, "P001", "General"))
            .unwrap();
        store.take_ticket(1).unwrap();
        store.take_ticket(1).unwrap();

        assert!(store.roll_session_if_needed(date(2)));
        assert_eq!(store.session_date(), date(2));
        assert!(store.polyclinic_queue(1).unwrap().tickets.is_empty());
        assert_eq!(store.take_ticket(1).unwrap().number, 1);
    }

    #[test]
    fn test_same_day_does_not_roll() {
        let store = QueueStore::for_date(date(5));
        store
            .register_polyclinic(Polyclinic::new(1, "P001", "General"))
            .unwrap();
        store.take_ticket(1).unwrap();

        assert!(!store.roll_session_if_needed(date(5)));
        assert!(!store.roll_session_if_needed(date(4)));
        assert_eq!(store.polyclinic_queue(1).unwrap().tickets.len(), 1);
    }
}
