//! Request fencing for views that refresh concurrently
//!
//! Every refresh takes a ticket before it starts fetching. When it finishes
//! it may only publish if no newer refresh has started since, so a slow
//! response can never overwrite fresher state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EpochTicket(u64);

/// Latest published value of a view, guarded by a request epoch
#[derive(Debug)]
pub struct Fenced<T> {
    issued: AtomicU64,
    slot: Mutex<Published<T>>,
}

#[derive(Debug)]
struct Published<T> {
    epoch: u64,
    value: Option<T>,
}

impl<T: Clone> Fenced<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            slot: Mutex::new(Published {
                epoch: 0,
                value: None,
            }),
        }
    }

    /// Start a new request; any ticket issued earlier becomes stale
    pub fn begin(&self) -> EpochTicket {
        EpochTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: EpochTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Store `value` if `ticket` is still the latest request.
    /// Returns false when the result was discarded as stale.
    pub fn publish(&self, ticket: EpochTicket, value: T) -> bool {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !self.is_current(ticket) || ticket.0 <= slot.epoch {
            return false;
        }
        slot.epoch = ticket.0;
        slot.value = Some(value);
        true
    }

    pub fn latest(&self) -> Option<T> {
        match self.slot.lock() {
            Ok(guard) => guard.value.clone(),
            Err(poisoned) => poisoned.into_inner().value.clone(),
        }
    }
}

impl<T: Clone> Default for Fenced<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_request_wins() {
        let fenced = Fenced::new();
        let old = fenced.begin();
        let new = fenced.begin();

        assert!(fenced.publish(new, "fresh"));
        assert!(!fenced.publish(old, "stale"));
        assert_eq!(fenced.latest(), Some("fresh"));
    }

    #[test]
    fn stale_result_is_dropped_even_before_newer_lands() {
        let fenced = Fenced::new();
        let old = fenced.begin();
        let _in_flight = fenced.begin();

        assert!(!fenced.publish(old, 1));
        assert_eq!(fenced.latest(), None);
    }

    #[test]
    fn sequential_requests_all_publish() {
        let fenced = Fenced::new();
        for value in 0..3 {
            let ticket = fenced.begin();
            assert!(fenced.is_current(ticket));
            assert!(fenced.publish(ticket, value));
        }
        assert_eq!(fenced.latest(), Some(2));
    }
}
