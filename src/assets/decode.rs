use std::sync::Arc;

use anyhow::Context;
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::assets::store::PreparedImage;
use crate::foundation::error::{FxError, FxResult};

const MAX_DIM: u32 = 16_384;

/// Which decoder a payload needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormatHint {
    /// Let the `image` crate sniff the format.
    Raster,
    /// Parse as SVG and rasterize.
    Svg,
}

impl ImageFormatHint {
    /// Guess from a MIME type or URL suffix.
    pub fn sniff(mime_or_url: &str, bytes: &[u8]) -> Self {
        let s = mime_or_url.to_ascii_lowercase();
        let svg_name = s.contains("image/svg") || s.split(['?', '#']).next().is_some_and(|p| p.ends_with(".svg"));
        let head = &bytes[..bytes.len().min(256)];
        let svg_bytes = std::str::from_utf8(head).is_ok_and(|t| {
            let t = t.trim_start();
            t.starts_with("<svg") || (t.starts_with("<?xml") && t.contains("<svg"))
        });
        if svg_name || svg_bytes { Self::Svg } else { Self::Raster }
    }
}

/// Decode raster bytes into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> FxResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(FxError::asset(format!(
            "image size {width}x{height} outside 1..={MAX_DIM}"
        )));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse an SVG document and rasterize it at `scale` times its intrinsic size.
pub fn decode_svg(bytes: &[u8], scale: f32) -> FxResult<PreparedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let size = tree.size();
    let to_px = |v: f32| -> FxResult<u32> {
        let px = (v * scale).ceil();
        if !px.is_finite() || px < 1.0 || px > MAX_DIM as f32 {
            return Err(FxError::asset("svg has invalid or oversized width/height"));
        }
        Ok(px as u32)
    };
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| FxError::asset("failed to allocate svg pixmap"))?;
    let xform = resvg::tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

/// Payload of a `data:` URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUrl {
    /// Declared MIME type (may be empty).
    pub mime: String,
    /// Decoded bytes.
    pub bytes: Vec<u8>,
}

/// Decode a `data:[<mime>][;base64],<payload>` URL.
///
/// Returns `Ok(None)` when `url` is not a data URL.
pub fn parse_data_url(url: &str) -> FxResult<Option<DataUrl>> {
    let Some(rest) = url.trim().strip_prefix("data:") else {
        return Ok(None);
    };
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FxError::asset("data url without payload separator"))?;

    let mut parts = meta.split(';');
    let mime = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(cleaned.as_bytes())
            .context("decode base64 data url")?
    } else {
        urlencoding::decode_binary(payload.as_bytes()).into_owned()
    };

    Ok(Some(DataUrl { mime, bytes }))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
