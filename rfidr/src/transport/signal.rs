// rfidr-rs/rfidr/src/transport/signal.rs
//! Event latch for interrupt-style completion flags.
//!
//! Producers (interrupt handlers, link callbacks) only `raise`. The single
//! consumer clears a flag right before triggering the operation it observes
//! and consumes it when `wait` sees it set, so a flag never carries a stale
//! signal into the next operation.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::transport::EventOutcome;

/// Set of raised-but-unconsumed events shared between producers and the
/// consumer.
#[derive(Debug)]
pub struct EventLatch<K> {
    inner: Arc<(Mutex<HashSet<K>>, Condvar)>,
}

impl<K> Clone for EventLatch<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Copy + Eq + Hash> Default for EventLatch<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + Hash> EventLatch<K> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new((Mutex::new(HashSet::new()), Condvar::new())),
        }
    }

    /// Mark `event` as received and wake the consumer.
    pub fn raise(&self, event: K) {
        let (lock, cvar) = &*self.inner;
        let mut set = lock.lock().unwrap_or_else(|p| p.into_inner());
        set.insert(event);
        cvar.notify_all();
    }

    pub fn clear(&self, event: K) {
        let (lock, _) = &*self.inner;
        let mut set = lock.lock().unwrap_or_else(|p| p.into_inner());
        set.remove(&event);
    }

    pub fn is_raised(&self, event: K) -> bool {
        let (lock, _) = &*self.inner;
        let set = lock.lock().unwrap_or_else(|p| p.into_inner());
        set.contains(&event)
    }

    /// Wait up to `timeout` for `event`, consuming it when seen.
    pub fn wait(&self, event: K, timeout: Duration) -> EventOutcome {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut set = lock.lock().unwrap_or_else(|p| p.into_inner());
        loop {
            if set.remove(&event) {
                return EventOutcome::Received;
            }
            let now = Instant::now();
            if now >= deadline {
                return EventOutcome::TimedOut;
            }
            let (guard, _) = cvar
                .wait_timeout(set, deadline - now)
                .unwrap_or_else(|p| p.into_inner());
            set = guard;
        }
    }
}
