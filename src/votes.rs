//! Vote aggregation for poll widgets.
//!
//! DESIGN
//! ======
//! One `PollRecord` per posted card, keyed by a minted poll id. The voter
//! map is the source of truth; the cached counts are updated on every
//! transition and must always equal the map census. Toggle semantics:
//! re-submitting a voter's current choice clears it, submitting the other
//! choice switches it in one transition, and an explicit clear removes any
//! standing vote.
//!
//! State is process-local. A poll id that isn't in the map (typically state
//! lost across a restart) is reported as stale and nothing is mutated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    #[error("stale poll: {0}")]
    StalePoll(Uuid),
}

impl crate::widget::ErrorCode for VoteError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::StalePoll(_) => "E_STALE_POLL",
        }
    }
}

/// A voter's standing choice on one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Up,
    Down,
}

/// What an interaction asks for. `Up`/`Down` round-trip through the widget
/// buttons; `Clear` removes a standing vote regardless of its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Up,
    Down,
    Clear,
}

/// Current counts, as shown on the widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub up: u32,
    pub down: u32,
}

#[derive(Debug, Default)]
struct PollRecord {
    up: u32,
    down: u32,
    voters: HashMap<i64, VoteChoice>,
}

impl PollRecord {
    fn tally(&self) -> Tally {
        Tally { up: self.up, down: self.down }
    }

    /// Counts recomputed from the voter map.
    #[allow(clippy::cast_possible_truncation)]
    fn census(&self) -> Tally {
        let up = self.voters.values().filter(|c| **c == VoteChoice::Up).count();
        let down = self.voters.len() - up;
        Tally { up: up as u32, down: down as u32 }
    }
}

// =============================================================================
// POLL STORE
// =============================================================================

#[derive(Clone, Default)]
pub struct PollStore {
    inner: Arc<Mutex<HashMap<Uuid, PollRecord>>>,
}

impl PollStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh zero-count poll and return its minted id.
    #[must_use]
    pub fn create(&self) -> Uuid {
        let poll_id = Uuid::new_v4();
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.insert(poll_id, PollRecord::default());
        poll_id
    }

    /// Apply one voter interaction and return the updated tally.
    ///
    /// # Errors
    ///
    /// Returns `StalePoll` if the id is unknown; no state is created or
    /// mutated in that case.
    pub fn apply(&self, poll_id: Uuid, voter_id: i64, action: VoteAction) -> Result<Tally, VoteError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let record = inner.get_mut(&poll_id).ok_or(VoteError::StalePoll(poll_id))?;

        let prev = record.voters.get(&voter_id).copied();
        let next = match (action, prev) {
            (VoteAction::Clear, _) => None,
            // Toggle off: requesting the standing choice clears it.
            (VoteAction::Up, Some(VoteChoice::Up)) | (VoteAction::Down, Some(VoteChoice::Down)) => None,
            (VoteAction::Up, _) => Some(VoteChoice::Up),
            (VoteAction::Down, _) => Some(VoteChoice::Down),
        };

        match prev {
            Some(VoteChoice::Up) => record.up -= 1,
            Some(VoteChoice::Down) => record.down -= 1,
            None => {}
        }
        record.voters.remove(&voter_id);

        if let Some(choice) = next {
            record.voters.insert(voter_id, choice);
            match choice {
                VoteChoice::Up => record.up += 1,
                VoteChoice::Down => record.down += 1,
            }
        }

        debug_assert_eq!(record.tally(), record.census());
        Ok(record.tally())
    }

    /// Read the current counts without mutating anything.
    ///
    /// # Errors
    ///
    /// Returns `StalePoll` if the id is unknown.
    pub fn tally(&self, poll_id: Uuid) -> Result<Tally, VoteError> {
        let inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner
            .get(&poll_id)
            .map(PollRecord::tally)
            .ok_or(VoteError::StalePoll(poll_id))
    }

    /// Number of live polls. Used by tests to assert that stale interactions
    /// leave no residue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "votes_test.rs"]
mod tests;
