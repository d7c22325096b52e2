pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod cpu;
pub(crate) mod display;

use crate::assets::store::AssetStore;
use crate::foundation::core::{Affine, BezPath, Canvas};
use crate::foundation::error::FxResult;
use display::{DisplayList, Layer};

/// A rendered frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Zero-sized frame, produced for hosts without area.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
            premultiplied: true,
        }
    }

    /// `true` for a zero-sized frame.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Pass-level rasterizer interface.
///
/// [`RenderBackend::render_display_list`] drives the passes in paint order; backends only
/// implement the individual passes. Tests substitute recording backends here.
pub trait RenderBackend {
    /// Start a frame of `canvas` pixels, cleared to transparent.
    fn begin_frame(&mut self, canvas: Canvas) -> FxResult<()>;

    /// Blur what has been painted so far by `sigma_px` device pixels, inside `clip` (whole frame
    /// when `None`). `transform` maps clip coordinates to device pixels.
    fn backdrop_blur(
        &mut self,
        sigma_px: f64,
        clip: Option<&BezPath>,
        transform: Affine,
    ) -> FxResult<()>;

    /// Paint one layer over the frame. `transform` maps host-local CSS pixels to device pixels.
    fn paint_layer(&mut self, layer: &Layer, transform: Affine, assets: &AssetStore)
    -> FxResult<()>;

    /// Read back the finished frame.
    fn finish_frame(&mut self) -> FxResult<FrameRGBA>;

    /// Rasterize `list` at `pixel_ratio` device pixels per CSS pixel.
    fn render_display_list(
        &mut self,
        list: &DisplayList,
        assets: &AssetStore,
        pixel_ratio: f64,
    ) -> FxResult<FrameRGBA> {
        execute_display_list(self, list, assets, pixel_ratio)
    }
}

#[tracing::instrument(skip_all, fields(layers = list.layers.len(), pixel_ratio = pixel_ratio))]
pub(crate) fn execute_display_list<B: RenderBackend + ?Sized>(
    backend: &mut B,
    list: &DisplayList,
    assets: &AssetStore,
    pixel_ratio: f64,
) -> FxResult<FrameRGBA> {
    let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
        pixel_ratio
    } else {
        1.0
    };
    let canvas = Canvas::from_size(list.size, ratio);
    if canvas.is_empty() {
        tracing::trace!("host has no area; empty frame");
        return Ok(FrameRGBA::empty());
    }

    let transform = Affine::scale(ratio);
    backend.begin_frame(canvas)?;
    for layer in list.sorted_layers() {
        if layer.backdrop_blur_px > 0.0 {
            backend.backdrop_blur(
                layer.backdrop_blur_px * ratio,
                layer.backdrop_clip.as_ref(),
                transform,
            )?;
        }
        if !layer.ops.is_empty() && layer.opacity > 0.0 {
            backend.paint_layer(layer, transform, assets)?;
        }
    }
    backend.finish_frame()
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
