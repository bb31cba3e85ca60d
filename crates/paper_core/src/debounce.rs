//! Save request coalescing on a logical millisecond clock.
//!
//! # Invariants
//! - Each request re-arms the deadline to `now + quiet_window_ms`.
//! - A burst of requests fires exactly once, after the last one goes quiet.

/// Trailing-edge debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    quiet_window_ms: u64,
    deadline_ms: Option<u64>,
}

impl Debouncer {
    pub fn new(quiet_window_ms: u64) -> Self {
        Self {
            quiet_window_ms,
            deadline_ms: None,
        }
    }

    /// Cancels any armed deadline and arms a new one from `now_ms`.
    pub fn request(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(self.quiet_window_ms));
    }

    /// Returns `true` once when the armed deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    /// Disarms and reports whether a request was pending.
    pub fn take_pending(&mut self) -> bool {
        self.deadline_ms.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }
}
