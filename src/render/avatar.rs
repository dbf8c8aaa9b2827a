//! Avatar processing — circular cutouts and the per-actor byte cache.
//!
//! DESIGN
//! ======
//! The transport supplies an [`AvatarFetch`] per request; the cache keys raw
//! source bytes by actor id so each actor's picture is fetched at most once
//! per process lifetime. Fetch failures are returned as `None` and never
//! cached, so the next card for that actor retries. Stale cached avatars
//! are an accepted tradeoff.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::warn;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("avatar decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("avatar diameter must be nonzero")]
    ZeroDiameter,
}

/// Source of raw avatar bytes, implemented by the transport layer.
/// `None` means unavailable — the card falls back to a placeholder disc.
#[async_trait::async_trait]
pub trait AvatarFetch: Send + Sync {
    async fn fetch(&self) -> Option<Vec<u8>>;
}

/// Default collaborator: fetch the avatar over HTTP.
pub struct HttpAvatarFetch {
    http: reqwest::Client,
    url: String,
}

impl HttpAvatarFetch {
    #[must_use]
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }
}

#[async_trait::async_trait]
impl AvatarFetch for HttpAvatarFetch {
    async fn fetch(&self) -> Option<Vec<u8>> {
        let response = match self.http.get(self.url.as_str()).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, url = %self.url, "avatar request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(status = %response.status(), url = %self.url, "avatar request rejected");
            return None;
        }
        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                warn!(error = %e, url = %self.url, "avatar body read failed");
                None
            }
        }
    }
}

// =============================================================================
// CIRCULAR CROP
// =============================================================================

/// Decode `source` and produce a `diameter_px` circular cutout: scale and
/// center-crop to a square (crop, never squash), then zero the alpha of
/// every pixel outside the inscribed circle.
///
/// # Errors
///
/// Returns `Decode` for undecodable bytes and `ZeroDiameter` for a zero
/// target size.
pub fn circular_crop(source: &[u8], diameter_px: u32) -> Result<RgbaImage, AvatarError> {
    if diameter_px == 0 {
        return Err(AvatarError::ZeroDiameter);
    }

    let decoded = image::load_from_memory(source)?.to_rgba8();

    let side = decoded.width().min(decoded.height());
    let left = (decoded.width() - side) / 2;
    let top = (decoded.height() - side) / 2;
    let square = imageops::crop_imm(&decoded, left, top, side, side).to_image();

    let mut scaled = if square.width() == diameter_px {
        square
    } else {
        imageops::resize(&square, diameter_px, diameter_px, FilterType::Lanczos3)
    };

    mask_circle(&mut scaled);
    Ok(scaled)
}

fn mask_circle(img: &mut RgbaImage) {
    let size = f64::from(img.width());
    let center = (size - 1.0) / 2.0;
    let radius = size / 2.0;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let dx = f64::from(x) - center;
        let dy = f64::from(y) - center;
        if (dx * dx + dy * dy).sqrt() > radius {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }
}

// =============================================================================
// CACHE
// =============================================================================

#[derive(Clone, Default)]
pub struct AvatarCache {
    inner: Arc<Mutex<HashMap<i64, Vec<u8>>>>,
}

impl AvatarCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached bytes for `actor_id`, or invoke the fetcher once
    /// and cache the result on success. The fetch itself runs outside the
    /// cache lock.
    pub async fn fetch_or_cache(&self, actor_id: i64, fetcher: &dyn AvatarFetch) -> Option<Vec<u8>> {
        {
            let inner = self
                .inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(bytes) = inner.get(&actor_id) {
                return Some(bytes.clone());
            }
        }

        let bytes = fetcher.fetch().await?;

        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Two concurrent misses may both fetch; the first insert wins.
        inner.entry(actor_id).or_insert_with(|| bytes.clone());
        Some(bytes)
    }
}

#[cfg(test)]
#[path = "avatar_test.rs"]
mod tests;
