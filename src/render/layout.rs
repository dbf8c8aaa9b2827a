//! Greedy word-wrap and largest-size-that-fits font selection.
//!
//! DESIGN
//! ======
//! `wrap` fills lines left to right, measuring real pixel widths at the
//! given scale. A single word wider than the line is emitted as an
//! over-width line rather than hyphenated. `fit` walks candidate sizes
//! largest first and takes the first whose wrapped block fits the height;
//! when nothing fits it truncates the text to a fixed character budget and
//! settles on the smallest candidate, so pathological input (one enormous
//! unbroken token) still terminates with bounded output.

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use imageproc::drawing::text_size;

/// Fixed spacing between wrapped lines, in pixels.
pub const INTER_LINE_GAP: u32 = 4;

/// Character budget applied when no candidate size fits.
const FALLBACK_CHAR_BUDGET: usize = 160;

const ELLIPSIS: char = '…';

/// Result of [`fit`]: the chosen scale and the wrapped block.
#[derive(Debug, Clone)]
pub struct FittedText {
    pub scale: PxScale,
    pub lines: Vec<String>,
    pub line_height: u32,
}

impl FittedText {
    /// Total block height: line boxes plus the gaps between them.
    #[must_use]
    pub fn block_height(&self) -> u32 {
        block_height(self.lines.len(), self.line_height)
    }
}

// =============================================================================
// WRAP
// =============================================================================

/// Wrap `text` into lines no wider than `max_width_px` at the given scale.
/// Splits on whitespace only; empty input yields no lines.
#[must_use]
pub fn wrap(text: &str, font: &FontRef<'_>, scale: PxScale, max_width_px: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        let (width, _) = text_size(scale, font, &candidate);
        if width <= max_width_px || current.is_empty() {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// =============================================================================
// FIT
// =============================================================================

/// Pick the largest candidate size whose wrapped block fits the box.
///
/// Candidates are tried in the given (descending) order. Empty text returns
/// the first candidate with no lines. If no candidate fits, the text is cut
/// to [`FALLBACK_CHAR_BUDGET`] characters with an ellipsis and wrapped at
/// the smallest candidate regardless of the resulting height.
#[must_use]
pub fn fit(
    text: &str,
    font: &FontRef<'_>,
    max_width_px: u32,
    max_height_px: u32,
    sizes_descending: &[f32],
) -> FittedText {
    let smallest = sizes_descending.last().copied().unwrap_or(16.0);

    for &size in sizes_descending {
        let scale = PxScale::from(size);
        let lines = wrap(text, font, scale, max_width_px);
        let line_height = line_height(font, scale);
        if block_height(lines.len(), line_height) <= max_height_px {
            return FittedText { scale, lines, line_height };
        }
    }

    let scale = PxScale::from(smallest);
    let truncated = truncate_chars(text, FALLBACK_CHAR_BUDGET);
    let lines = wrap(&truncated, font, scale, max_width_px);
    FittedText { scale, lines, line_height: line_height(font, scale) }
}

/// Height of one line box at the given scale.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn line_height(font: &FontRef<'_>, scale: PxScale) -> u32 {
    font.as_scaled(scale).height().ceil() as u32
}

/// Measured pixel width of a single line.
#[must_use]
pub fn line_width(font: &FontRef<'_>, scale: PxScale, line: &str) -> u32 {
    text_size(scale, font, line).0
}

fn block_height(line_count: usize, line_height: u32) -> u32 {
    #[allow(clippy::cast_possible_truncation)]
    let lines = line_count as u32;
    if lines == 0 {
        return 0;
    }
    lines * line_height + (lines - 1) * INTER_LINE_GAP
}

fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut out: String = text.chars().take(budget.saturating_sub(1)).collect();
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
