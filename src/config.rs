//! Operational configuration for card creation.
//!
//! DESIGN
//! ======
//! Knobs a deployment actually tunes (canvas size, output mode, byte
//! ceiling, cooldown, truncation lengths) live here and can be overridden
//! from `QUOTECARD_*` environment variables, parse-or-default. Cosmetic
//! design constants (padding, avatar diameter, font candidates) are fixed
//! in the compositor and are not configuration.

use std::time::Duration;

const DEFAULT_CANVAS_WIDTH: u32 = 512;
const DEFAULT_CANVAS_HEIGHT: u32 = 512;

/// Sticker ceiling: chat platforms reject sticker uploads above 512 KiB.
const DEFAULT_BYTE_CEILING: usize = 512 * 1024;

const DEFAULT_COOLDOWN_SECS: u64 = 20;

const DEFAULT_MAX_AUTHOR_CHARS: usize = 48;
const DEFAULT_MAX_TEXT_CHARS: usize = 400;

/// JPEG qualities tried in order under a byte ceiling.
pub const QUALITY_LADDER: [u8; 5] = [90, 80, 70, 60, 50];

// =============================================================================
// TYPES
// =============================================================================

/// What lies outside the bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBackground {
    /// Transparent canvas for sticker-style delivery.
    Sticker,
    /// Opaque backdrop for plain photo delivery.
    Photo,
}

#[derive(Debug, Clone)]
pub struct CardConfig {
    pub width: u32,
    pub height: u32,
    pub background: CardBackground,
    /// Maximum encoded size. `None` disables the ceiling and selects the
    /// lossless path.
    pub byte_ceiling: Option<usize>,
    pub quality_ladder: Vec<u8>,
    pub cooldown: Duration,
    pub max_author_chars: usize,
    pub max_text_chars: usize,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            background: CardBackground::Sticker,
            byte_ceiling: Some(DEFAULT_BYTE_CEILING),
            quality_ladder: QUALITY_LADDER.to_vec(),
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
            max_author_chars: DEFAULT_MAX_AUTHOR_CHARS,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

impl CardConfig {
    /// Build a config from environment variables, falling back to defaults
    /// for anything unset or unparseable.
    ///
    /// - `QUOTECARD_WIDTH` / `QUOTECARD_HEIGHT`: canvas dimensions
    /// - `QUOTECARD_BACKGROUND`: "sticker" (default) or "photo"
    /// - `QUOTECARD_BYTE_CEILING`: max encoded bytes, `0` to disable
    /// - `QUOTECARD_COOLDOWN_SECS`: per (room, actor) cooldown
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let ceiling = match env_parse::<usize>("QUOTECARD_BYTE_CEILING", DEFAULT_BYTE_CEILING) {
            0 => None,
            n => Some(n),
        };
        let background = match std::env::var("QUOTECARD_BACKGROUND").as_deref() {
            Ok("photo") => CardBackground::Photo,
            _ => CardBackground::Sticker,
        };

        Self {
            width: env_parse("QUOTECARD_WIDTH", DEFAULT_CANVAS_WIDTH),
            height: env_parse("QUOTECARD_HEIGHT", DEFAULT_CANVAS_HEIGHT),
            background,
            byte_ceiling: ceiling,
            cooldown: Duration::from_secs(env_parse("QUOTECARD_COOLDOWN_SECS", DEFAULT_COOLDOWN_SECS)),
            ..defaults
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
