use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::assets::decode::{self, ImageFormatHint};
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::math::Fnv1a64;

/// Rasterization scale for SVG sources, so scaled-up sprites stay crisp.
const SVG_RASTER_SCALE: f32 = 2.0;

/// Stable identity of an image, derived from its URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct AssetId(u64);

impl AssetId {
    /// Identity of `url` (trimmed).
    pub fn for_url(url: &str) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(url.trim().as_bytes());
        Self(h.finish())
    }

    /// Raw hash value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Decoded image, premultiplied RGBA8, row-major without padding.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Resolution state of one URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetState {
    /// Nothing inserted yet.
    Missing,
    /// Decoded and drawable.
    Ready,
    /// Decoding failed; renderers use their color fallback.
    Failed,
}

/// URL-keyed image cache shared by the renderer and the shell.
///
/// The store never fetches. The embedder inserts the bytes it loaded; `data:` URLs are decoded
/// on demand. Failures are remembered so that a broken URL is reported once, not every frame.
#[derive(Debug, Default)]
pub struct AssetStore {
    images: BTreeMap<AssetId, PreparedImage>,
    failed: BTreeSet<AssetId>,
}

impl AssetStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes` fetched for `url` and cache the result.
    #[tracing::instrument(skip_all, fields(len = bytes.len()))]
    pub fn insert_bytes(&mut self, url: &str, mime: &str, bytes: &[u8]) -> FxResult<AssetId> {
        let id = AssetId::for_url(url);
        let hint = ImageFormatHint::sniff(if mime.is_empty() { url } else { mime }, bytes);
        let decoded = match hint {
            ImageFormatHint::Svg => decode::decode_svg(bytes, SVG_RASTER_SCALE),
            ImageFormatHint::Raster => decode::decode_image(bytes),
        };
        match decoded {
            Ok(img) => {
                tracing::debug!(width = img.width, height = img.height, "asset ready");
                self.failed.remove(&id);
                self.images.insert(id, img);
                Ok(id)
            }
            Err(err) => {
                tracing::warn!(%err, "asset decode failed; effects fall back to color");
                self.images.remove(&id);
                self.failed.insert(id);
                Err(FxError::asset(format!("{url}: {err}")))
            }
        }
    }

    /// Insert an already decoded image under `url`.
    pub fn insert_prepared(&mut self, url: &str, image: PreparedImage) -> AssetId {
        let id = AssetId::for_url(url);
        self.failed.remove(&id);
        self.images.insert(id, image);
        id
    }

    /// Record that the embedder could not load `url`.
    pub fn mark_failed(&mut self, url: &str) -> AssetId {
        let id = AssetId::for_url(url);
        self.images.remove(&id);
        self.failed.insert(id);
        id
    }

    /// Decode `url` locally if it is a `data:` URL that has not been seen yet.
    pub fn ensure_inline(&mut self, url: &str) -> FxResult<()> {
        let id = AssetId::for_url(url);
        if self.images.contains_key(&id) || self.failed.contains(&id) {
            return Ok(());
        }
        match decode::parse_data_url(url) {
            Ok(Some(data)) => self.insert_bytes(url, &data.mime, &data.bytes).map(|_| ()),
            Ok(None) => Ok(()),
            Err(err) => {
                self.failed.insert(id);
                Err(err)
            }
        }
    }

    /// Resolution state of `url`.
    pub fn state(&self, url: &str) -> AssetState {
        let id = AssetId::for_url(url);
        if self.images.contains_key(&id) {
            AssetState::Ready
        } else if self.failed.contains(&id) {
            AssetState::Failed
        } else {
            AssetState::Missing
        }
    }

    /// The id of `url` if it is decoded and drawable.
    pub fn resolve(&self, url: &str) -> Option<AssetId> {
        let id = AssetId::for_url(url);
        self.images.contains_key(&id).then_some(id)
    }

    /// Decoded image for `id`.
    pub fn get(&self, id: AssetId) -> Option<&PreparedImage> {
        self.images.get(&id)
    }

    /// Number of drawable images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// `true` when nothing is drawable.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
