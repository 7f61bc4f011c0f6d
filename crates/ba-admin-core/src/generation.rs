//! Request generations.
//!
//! Every request that will write into a shared display slot takes a ticket
//! first. When its response lands, it is applied only if no newer ticket was
//! issued for the same slot in the meantime, so the newest request wins rather
//! than the slowest response.

use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Gateway,
    /// Shared by balance query and balance update.
    BalanceResult,
    PasswordResult,
    ServerOptions,
    ConfigSave,
    Environment,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Gateway,
        Slot::BalanceResult,
        Slot::PasswordResult,
        Slot::ServerOptions,
        Slot::ConfigSave,
        Slot::Environment,
    ];

    fn index(self) -> usize {
        match self {
            Slot::Gateway => 0,
            Slot::BalanceResult => 1,
            Slot::PasswordResult => 2,
            Slot::ServerOptions => 3,
            Slot::ConfigSave => 4,
            Slot::Environment => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub slot: Slot,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct RequestGenerations {
    counters: [Cell<u64>; 6],
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, slot: Slot) -> Ticket {
        let counter = &self.counters[slot.index()];
        let generation = counter.get() + 1;
        counter.set(generation);
        Ticket { slot, generation }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.counters[ticket.slot.index()].get() == ticket.generation
    }

    /// Supersede every outstanding ticket.
    pub fn invalidate_all(&self) {
        for counter in &self.counters {
            counter.set(counter.get() + 1);
        }
    }
}

/// Result of an operation whose response may have been overtaken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<T> {
    /// Written to the view (and cache, where relevant).
    Applied(T),
    /// A newer request for the same slot was issued first; nothing was written.
    Superseded(T),
}

impl<T> Delivery<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Delivery::Applied(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Delivery::Applied(v) | Delivery::Superseded(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Delivery::Applied(v) | Delivery::Superseded(v) => v,
        }
    }
}
