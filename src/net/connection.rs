//! In-flight call tracking for a channel.
//!
//! # Responsibilities
//! - Count calls currently using the channel
//! - Refuse new calls once the channel is closing
//! - Let `close` wait until in-flight calls drain

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Tracks calls issued over one channel.
///
/// Cloned into every client built from the channel; all clones share state.
#[derive(Debug, Clone)]
pub struct CallTracker {
    closed: Arc<AtomicBool>,
    in_flight: Arc<watch::Sender<usize>>,
}

impl CallTracker {
    /// Create a tracker for an open channel.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            closed: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(tx),
        }
    }

    /// Record a new call. Returns `None` once the channel is closed.
    pub fn begin(&self) -> Option<CallGuard> {
        if self.is_closed() {
            return None;
        }
        self.in_flight.send_modify(|count| *count += 1);
        Some(CallGuard {
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Current number of in-flight calls.
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Reject all further calls.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Wait until no calls are in flight or the grace period elapses.
    ///
    /// Returns `true` when the calls drained in time.
    pub async fn drain(&self, grace: Duration) -> bool {
        let mut rx = self.in_flight.subscribe();
        let drained = matches!(
            tokio::time::timeout(grace, rx.wait_for(|count| *count == 0)).await,
            Ok(Ok(_))
        );
        drained
    }
}

impl Default for CallTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that tracks one call's lifetime.
/// Decrements the in-flight count when dropped.
#[derive(Debug)]
pub struct CallGuard {
    in_flight: Arc<watch::Sender<usize>>,
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.in_flight.send_modify(|count| *count = count.saturating_sub(1));
    }
}
