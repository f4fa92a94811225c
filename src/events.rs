use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{ClientId, LoanId, LoanState, Timeliness};

/// all events that can be emitted by book operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanOriginated {
        loan_id: LoanId,
        client_id: ClientId,
        principal: Money,
        total_owed: Money,
        start_date: NaiveDate,
    },
    StateChanged {
        loan_id: LoanId,
        old_state: LoanState,
        new_state: LoanState,
        date: NaiveDate,
    },
    LoanSettled {
        loan_id: LoanId,
        date: NaiveDate,
    },
    LoanManuallySettled {
        loan_id: LoanId,
        cascaded_from: Option<LoanId>,
        date: NaiveDate,
    },

    // payment events
    InstallmentRecorded {
        loan_id: LoanId,
        amount: Money,
        to_base: Money,
        to_penalty: Money,
        timeliness: Timeliness,
        date: NaiveDate,
    },

    // refinancing events
    LoanRefinanced {
        original_id: LoanId,
        successor_id: LoanId,
        carried_balance: Money,
        new_rate: Rate,
        date: NaiveDate,
    },

    // client events
    ClientRegistered {
        client_id: ClientId,
    },
    ClientRemoved {
        client_id: ClientId,
        loans_removed: usize,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
