//! Card service — rate-limited card creation and vote interactions.
//!
//! DESIGN
//! ======
//! `create_card` is the whole request flow in order: rate limiter, text
//! validation, avatar fetch, render, poll registration. The avatar fetch
//! happens on the async path outside every lock, and composition/encoding
//! run on a blocking worker so slow raster work never stalls interaction
//! handling for other posts.
//!
//! ERROR HANDLING
//! ==============
//! Only rate limiting, missing text, and render faults surface to the
//! caller. Avatar problems and over-budget encodes are recovered inside
//! the pipeline (placeholder disc, floor-quality output) and logged.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::rate_limit::RateLimitError;
use crate::render::avatar::AvatarFetch;
use crate::render::{self, RenderError, RenderedCard};
use crate::state::QuoteState;
use crate::votes::{Tally, VoteAction, VoteError};
use crate::widget::{self, WidgetSpec};

// =============================================================================
// TYPES
// =============================================================================

/// Normalized card request handed over by the transport layer.
pub struct CreateCardRequest {
    pub room_id: i64,
    pub actor_id: i64,
    /// Display name of the quoted author.
    pub author_name: String,
    /// Raw quoted message text.
    pub quoted_text: String,
    /// Optional avatar source for the quoted author.
    pub avatar: Option<Arc<dyn AvatarFetch>>,
}

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
    #[error("no quotable text in the request")]
    NoText,
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl widget::ErrorCode for CardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RateLimited(_) => "E_RATE_LIMITED",
            Self::NoText => "E_NO_TEXT",
            Self::Render(_) => "E_RENDER",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

/// Everything the transport posts for one card: the encoded image, the
/// minted poll id to key interactions by, and the initial widget.
#[derive(Debug)]
pub struct CardPost {
    pub card: RenderedCard,
    pub poll_id: Uuid,
    pub widget: WidgetSpec,
}

// =============================================================================
// CREATE
// =============================================================================

/// Create a card and its poll.
///
/// # Errors
///
/// `RateLimited` when the (room, actor) pair is still cooling down,
/// `NoText` when the quoted content is empty or is itself a command,
/// `Render` for composition/encoding faults (no partial image is returned).
pub async fn create_card(state: &QuoteState, request: CreateCardRequest) -> Result<CardPost, CardError> {
    if let Err(e) = state.rate_limiter.check_and_record(request.room_id, request.actor_id) {
        info!(
            room_id = request.room_id,
            actor_id = request.actor_id,
            remaining = e.remaining_secs(),
            "card request rate limited"
        );
        return Err(e.into());
    }

    let text = normalize_quote(&request.quoted_text, state.config.max_text_chars).ok_or(CardError::NoText)?;
    let author = truncate_chars(request.author_name.trim(), state.config.max_author_chars);

    // Avatar fetch is I/O: it runs here on the async path, never under a
    // lock and never on the render worker.
    let avatar_bytes = match &request.avatar {
        Some(fetcher) => {
            let fetched = state.avatars.fetch_or_cache(request.actor_id, fetcher.as_ref()).await;
            if fetched.is_none() {
                warn!(actor_id = request.actor_id, "avatar unavailable, card gets the placeholder");
            }
            fetched
        }
        None => None,
    };

    let config = Arc::clone(&state.config);
    let card = tokio::task::spawn_blocking(move || {
        render::render_card(&config, &author, &text, avatar_bytes.as_deref())
    })
    .await
    .map_err(|e| RenderError::Worker(e.to_string()))??;

    let poll_id = state.polls.create();
    info!(%poll_id, room_id = request.room_id, bytes = card.encoded.len(), "card created");

    Ok(CardPost { card, poll_id, widget: widget::poll_widget(Tally::default()) })
}

// =============================================================================
// VOTE
// =============================================================================

/// Apply one widget interaction and return the tally the widget should now
/// show.
///
/// # Errors
///
/// `StalePoll` when the poll id is unknown (typically state lost across a
/// restart); nothing is mutated.
pub fn vote(state: &QuoteState, poll_id: Uuid, voter_id: i64, action: VoteAction) -> Result<Tally, VoteError> {
    match state.polls.apply(poll_id, voter_id, action) {
        Ok(tally) => Ok(tally),
        Err(e) => {
            info!(%poll_id, voter_id, "interaction on stale poll");
            Err(e)
        }
    }
}

/// Current tally without mutating anything, for widget redraws.
///
/// # Errors
///
/// `StalePoll` when the poll id is unknown.
pub fn poll_tally(state: &QuoteState, poll_id: Uuid) -> Result<Tally, VoteError> {
    state.polls.tally(poll_id)
}

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Trim and bound the quoted text. `None` when there is nothing quotable:
/// empty content, or content that is itself a command.
fn normalize_quote(raw: &str, max_chars: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('/') {
        return None;
    }
    Some(truncate_with_ellipsis(trimmed, max_chars))
}

fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
#[path = "card_test.rs"]
mod tests;
