//! Shared application state.
//!
//! DESIGN
//! ======
//! `QuoteState` is constructed once by the host and injected into every
//! service call. It owns the three process-wide maps: live polls, rate
//! limit stamps, and the avatar byte cache, each wrapped in its own
//! component with its own lock. Callers go through component operations
//! and never hold references into the maps.

use std::sync::Arc;

use crate::config::CardConfig;
use crate::rate_limit::RateLimiter;
use crate::render::avatar::AvatarCache;
use crate::votes::PollStore;

/// Shared state, cloneable into tasks — all inner fields are Arc-backed.
#[derive(Clone)]
pub struct QuoteState {
    pub config: Arc<CardConfig>,
    pub polls: PollStore,
    pub rate_limiter: RateLimiter,
    pub avatars: AvatarCache,
}

impl QuoteState {
    #[must_use]
    pub fn new(config: CardConfig) -> Self {
        let rate_limiter = RateLimiter::new(config.cooldown);
        Self {
            config: Arc::new(config),
            polls: PollStore::new(),
            rate_limiter,
            avatars: AvatarCache::new(),
        }
    }

    /// State with configuration read from `QUOTECARD_*` environment
    /// variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(CardConfig::from_env())
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
