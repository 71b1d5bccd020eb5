/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Sequence number management.
//!
//! The outbound counter starts at 0 and is incremented before every send, so
//! the first message carries `34=1`. Inbound sequence numbers are only
//! recorded for inspection; they never affect outbound numbering.

use ctfix_core::types::SeqNum;
use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks sequence numbers for one connection.
///
/// Uses atomic operations for thread-safe access without locks.
#[derive(Debug, Default)]
pub struct SequenceManager {
    /// Last outgoing sequence number handed out.
    last_sent: AtomicU64,
    /// Last MsgSeqNum seen on an incoming message.
    last_received: AtomicU64,
}

impl SequenceManager {
    /// Creates a manager whose next send uses sequence number 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_sent: AtomicU64::new(0),
            last_received: AtomicU64::new(0),
        }
    }

    /// Increments the outbound counter and returns the new value.
    ///
    /// Returns `None` and leaves the counter unchanged once it reaches
    /// `u64::MAX`.
    #[inline]
    pub fn allocate(&self) -> Option<SeqNum> {
        self.last_sent
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .ok()
            .map(|prev| SeqNum::new(prev + 1))
    }

    /// Returns the last outbound sequence number used.
    #[inline]
    #[must_use]
    pub fn current(&self) -> SeqNum {
        SeqNum::new(self.last_sent.load(Ordering::SeqCst))
    }

    /// Overrides the outbound counter. The next send uses `seq + 1`.
    ///
    /// # Arguments
    /// * `seq` - The value to treat as the last sent sequence number
    #[inline]
    pub fn set(&self, seq: u64) {
        self.last_sent.store(seq, Ordering::SeqCst);
    }

    /// Records the MsgSeqNum of an incoming message.
    #[inline]
    pub fn record_incoming(&self, seq: SeqNum) {
        self.last_received.store(seq.value(), Ordering::SeqCst);
    }

    /// Returns the last incoming MsgSeqNum seen, 0 if none.
    #[inline]
    #[must_use]
    pub fn last_received(&self) -> SeqNum {
        SeqNum::new(self.last_received.load(Ordering::SeqCst))
    }

    /// Resets both counters to 0.
    #[inline]
    pub fn reset(&self) {
        self.last_sent.store(0, Ordering::SeqCst);
        self.last_received.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_sequence_manager_new() {
        let mgr = SequenceManager::new();
        assert_eq!(mgr.current().value(), 0);
        assert_eq!(mgr.last_received().value(), 0);
    }

    #[test]
    fn test_allocate_starts_at_one() {
        let mgr = SequenceManager::new();

        assert_eq!(mgr.allocate().unwrap().value(), 1);
        assert_eq!(mgr.allocate().unwrap().value(), 2);
        assert_eq!(mgr.current().value(), 2);
    }

    #[test]
    fn test_set_then_allocate() {
        let mgr = SequenceManager::new();
        mgr.set(41);
        assert_eq!(mgr.current().value(), 41);
        assert_eq!(mgr.allocate().unwrap().value(), 42);
    }

    #[test]
    fn test_allocate_stops_at_max() {
        let mgr = SequenceManager::new();
        mgr.set(u64::MAX - 1);
        assert_eq!(mgr.allocate().unwrap().value(), u64::MAX);
        assert_eq!(mgr.allocate(), None);
        assert_eq!(mgr.current().value(), u64::MAX);
    }

    #[test]
    fn test_record_incoming_is_independent() {
        let mgr = SequenceManager::new();
        mgr.record_incoming(SeqNum::new(900));
        assert_eq!(mgr.last_received().value(), 900);
        assert_eq!(mgr.allocate().unwrap().value(), 1);
    }

    #[test]
    fn test_reset() {
        let mgr = SequenceManager::new();
        mgr.set(100);
        mgr.record_incoming(SeqNum::new(7));

        mgr.reset();
        assert_eq!(mgr.current().value(), 0);
        assert_eq!(mgr.last_received().value(), 0);
    }

    #[test]
    fn test_concurrent_allocations_are_unique() {
        let mgr = Arc::new(SequenceManager::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let mgr = Arc::clone(&mgr);
                std::thread::spawn(move || (0..250).map(|_| mgr.allocate().unwrap().value()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (1..=1000).collect::<Vec<_>>());
    }
}
