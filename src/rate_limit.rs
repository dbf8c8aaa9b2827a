//! In-memory rate limiting for card creation.
//!
//! DESIGN
//! ======
//! One timestamp per (room, actor) pair in a `HashMap<(i64, i64), Instant>`.
//! A request is accepted when at least the cooldown has elapsed since the
//! pair's last accepted request; denials leave the stamp untouched and
//! report how long the caller still has to wait. Entries are never deleted
//! — the map is bounded by the number of distinct (room, actor) pairs seen
//! in a process lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("cooling down: {}s remaining", remaining.as_secs())]
    CoolingDown { remaining: Duration },
}

impl RateLimitError {
    /// Remaining wait in whole seconds, rounded up so a sub-second wait is
    /// never reported as zero.
    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        let Self::CoolingDown { remaining } = self;
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<HashMap<(i64, i64), Instant>>>,
    cooldown: Duration,
}

impl RateLimiter {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), cooldown }
    }

    /// Check the (room, actor) pair and record the request if accepted.
    ///
    /// First request per pair is always accepted. A denial does not update
    /// the stamp, so waiting out the cooldown always succeeds eventually.
    ///
    /// # Errors
    ///
    /// Returns `CoolingDown` with the remaining wait when the pair's last
    /// accepted request is younger than the cooldown.
    pub fn check_and_record(&self, room_id: i64, actor_id: i64) -> Result<(), RateLimitError> {
        self.check_and_record_at(room_id, actor_id, Instant::now())
    }

    /// Internal: check + record with explicit timestamp (for testing).
    fn check_and_record_at(&self, room_id: i64, actor_id: i64, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some(last) = inner.get(&(room_id, actor_id)) {
            let elapsed = now.duration_since(*last);
            if elapsed < self.cooldown {
                return Err(RateLimitError::CoolingDown { remaining: self.cooldown - elapsed });
            }
        }

        inner.insert((room_id, actor_id), now);
        Ok(())
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
