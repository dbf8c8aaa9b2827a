//! Widget surface — labels, button tokens, and error codes for the transport.
//!
//! ARCHITECTURE
//! ============
//! The transport layer posts the card, renders this widget next to it, and
//! round-trips a button's token back as a [`VoteAction`] when someone taps
//! it. Nothing here touches state; it is pure formatting and parsing, kept
//! in one place so the tokens the buttons carry and the tokens the parser
//! accepts can never drift apart.

use serde::{Deserialize, Serialize};

use crate::votes::{Tally, VoteAction};

// =============================================================================
// TOKENS
// =============================================================================

pub const TOKEN_UP: &str = "up";
pub const TOKEN_DOWN: &str = "down";
pub const TOKEN_CLEAR: &str = "clear";

/// Token carried by a widget button for the given action.
#[must_use]
pub fn action_token(action: VoteAction) -> &'static str {
    match action {
        VoteAction::Up => TOKEN_UP,
        VoteAction::Down => TOKEN_DOWN,
        VoteAction::Clear => TOKEN_CLEAR,
    }
}

/// Parse a token round-tripped from a widget interaction. Unknown tokens
/// (from widgets posted by older builds, or forged payloads) map to `None`.
#[must_use]
pub fn parse_action(token: &str) -> Option<VoteAction> {
    match token {
        TOKEN_UP => Some(VoteAction::Up),
        TOKEN_DOWN => Some(VoteAction::Down),
        TOKEN_CLEAR => Some(VoteAction::Clear),
        _ => None,
    }
}

// =============================================================================
// WIDGET SPEC
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetButton {
    pub label: String,
    pub token: String,
}

/// Everything the transport needs to draw the voting widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSpec {
    pub label: String,
    pub buttons: Vec<WidgetButton>,
}

/// Widget status line, e.g. `👍 3 | 👎 1`.
#[must_use]
pub fn poll_label(tally: Tally) -> String {
    format!("👍 {} | 👎 {}", tally.up, tally.down)
}

/// Build the full widget for the current tally: the status label plus the
/// up/down buttons (carrying live counts) and a clear button.
#[must_use]
pub fn poll_widget(tally: Tally) -> WidgetSpec {
    WidgetSpec {
        label: poll_label(tally),
        buttons: vec![
            WidgetButton { label: format!("👍 {}", tally.up), token: TOKEN_UP.into() },
            WidgetButton { label: format!("👎 {}", tally.down), token: TOKEN_DOWN.into() },
            WidgetButton { label: "✖".into(), token: TOKEN_CLEAR.into() },
        ],
    }
}

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for transport-facing errors.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
