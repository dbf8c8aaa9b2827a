//! quotecard — quote-card rendering and ephemeral poll state for chat bots.
//!
//! ARCHITECTURE
//! ============
//! The surrounding chat transport hands this crate a normalized request
//! (author, quoted text, optional avatar fetcher) and posts whatever comes
//! back. Three stateful components do the work: the card renderer (text
//! layout, avatar compositing, size-bounded encoding), the vote aggregator
//! (per-post tallies with one-active-choice-per-voter toggling), and the
//! rate limiter (minimum interval between cards per (room, actor) pair).
//!
//! DESIGN
//! ======
//! - All shared maps (polls, rate-limit stamps, avatar cache) live in
//!   [`state::QuoteState`] and are injected into service calls; nothing is
//!   ambient or global.
//! - Service entry points are [`services::card::create_card`] and
//!   [`services::card::vote`]. Raster work runs on a blocking worker so
//!   interaction handling never waits behind an encode.
//! - State is process-local. Losing it on restart downgrades old widgets to
//!   a stale-poll notice, nothing worse.

pub mod config;
pub mod rate_limit;
pub mod render;
pub mod services;
pub mod state;
pub mod votes;
pub mod widget;

pub use config::{CardBackground, CardConfig};
pub use render::RenderedCard;
pub use services::card::{CardError, CardPost, CreateCardRequest, create_card, poll_tally, vote};
pub use state::QuoteState;
pub use votes::{Tally, VoteAction, VoteChoice, VoteError};
pub use widget::{ErrorCode, WidgetSpec};
