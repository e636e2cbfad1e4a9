//! Failure cooldown for the explanation service.
//!
//! After any failed call the service is left alone for a fixed window. This
//! is an approximate rate limiter: a single mutex around the last failure
//! instant is all the coordination it needs.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default window during which no new attempt is made after a failure.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct FailureCooldown {
    window: Duration,
    last_failure: Mutex<Option<Instant>>,
}

impl FailureCooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_failure: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether a call may be attempted now.
    pub fn can_attempt(&self) -> bool {
        self.can_attempt_at(Instant::now())
    }

    pub fn can_attempt_at(&self, now: Instant) -> bool {
        self.remaining_at(now).is_none()
    }

    /// Time left in the cooldown, `None` if calls are allowed.
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        let last = (*self.lock())?;
        let elapsed = now.saturating_duration_since(last);
        self.window.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now());
    }

    pub fn record_failure_at(&self, at: Instant) {
        *self.lock() = Some(at);
    }

    /// Clear any recorded failure.
    pub fn reset(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.last_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for FailureCooldown {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
