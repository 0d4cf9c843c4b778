//! Counting tracker for in-flight operations.
//!
//! Overlapping operations each hold their own guard, so the exposed state is
//! `Busy(n)` rather than a single shared boolean that the first finisher
//! would clear for everyone.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Observable busy state.
pub enum BusyState {
    /// No operation outstanding.
    Idle,
    /// `n` operations outstanding.
    Busy(usize),
}

#[derive(Debug, Clone, Default)]
/// Shared counter of outstanding operations.
pub struct BusyTracker {
    inflight: Arc<AtomicUsize>,
}

impl BusyTracker {
    /// Create a tracker with nothing outstanding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the start of an operation.
    ///
    /// The returned guard decrements the count when dropped, on every exit
    /// path.
    #[must_use]
    pub fn start(&self) -> BusyGuard {
        self.inflight.fetch_add(1, Ordering::Relaxed);
        BusyGuard {
            inflight: Arc::clone(&self.inflight),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> BusyState {
        match self.inflight.load(Ordering::Relaxed) {
            0 => BusyState::Idle,
            count => BusyState::Busy(count),
        }
    }

    /// Whether any operation is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state() != BusyState::Idle
    }
}

#[derive(Debug)]
/// RAII handle for one outstanding operation.
pub struct BusyGuard {
    inflight: Arc<AtomicUsize>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inflight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::{BusyState, BusyTracker};

    #[test]
    fn overlapping_operations_are_counted() {
        let tracker = BusyTracker::new();
        assert_eq!(tracker.state(), BusyState::Idle);

        let first = tracker.start();
        let second = tracker.start();
        assert_eq!(tracker.state(), BusyState::Busy(2));

        drop(first);
        assert_eq!(
            tracker.state(),
            BusyState::Busy(1),
            "one finisher must not clear the other's busy state"
        );

        drop(second);
        assert_eq!(tracker.state(), BusyState::Idle);
    }

    #[test]
    fn guard_clears_on_early_exit() {
        let tracker = BusyTracker::new();

        fn failing(tracker: &BusyTracker) -> Result<(), String> {
            let _guard = tracker.start();
            Err(String::from("boom"))
        }

        assert!(failing(&tracker).is_err(), "operation should fail");
        assert_eq!(
            tracker.state(),
            BusyState::Idle,
            "guard must release on the error path"
        );
    }
}
