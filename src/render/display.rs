use kurbo::Shape;

use crate::assets::store::AssetId;
use crate::config::color::Color;
use crate::foundation::core::{Affine, BezPath, EffectKind, Point, Rect, Size};
use crate::host::Positioning;

/// Who produced a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum LayerKind {
    /// Page background (color, image or the color under an external video).
    Background,
    /// One effect's visual layer.
    Effect(EffectKind),
    /// Static card content.
    Card,
    /// Audio player chrome.
    Audio,
    /// Click-to-enter overlay.
    Gate,
}

/// One drawing command in host-local CSS pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Fill `path` transformed by `transform`.
    FillPath {
        /// Shape to fill.
        path: BezPath,
        /// Placement.
        transform: Affine,
        /// Fill color (straight alpha).
        color: Color,
    },
    /// Stroke `path` with `width` pixels.
    StrokePath {
        /// Shape to stroke.
        path: BezPath,
        /// Placement.
        transform: Affine,
        /// Stroke width, in path units.
        width: f64,
        /// Stroke color (straight alpha).
        color: Color,
    },
    /// Draw an image stretched over `(0,0)..size`, transformed by `transform`.
    Image {
        /// Decoded asset.
        asset: AssetId,
        /// Destination extent before `transform`.
        size: Size,
        /// Placement.
        transform: Affine,
        /// Global alpha.
        opacity: f64,
    },
}

/// A group of draw ops composited together.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// Producer.
    pub kind: LayerKind,
    /// Stacking order; higher paints later.
    pub z: i32,
    /// Fixed or absolute positioning inside the host.
    pub positioning: Positioning,
    /// Layer opacity.
    pub opacity: f64,
    /// Gaussian blur applied to everything already painted below this layer, inside
    /// `backdrop_clip`. Mirrors `backdrop-filter: blur(...)`.
    pub backdrop_blur_px: f64,
    /// Region the backdrop blur is confined to.
    pub backdrop_clip: Option<BezPath>,
    /// Commands, painted in order.
    pub ops: Vec<DrawOp>,
}

impl Layer {
    /// Empty, fully opaque layer.
    pub fn new(kind: LayerKind, z: i32, positioning: Positioning) -> Self {
        Self {
            kind,
            z,
            positioning,
            opacity: 1.0,
            backdrop_blur_px: 0.0,
            backdrop_clip: None,
            ops: Vec::new(),
        }
    }

    /// Blur whatever lies below, within `clip`.
    pub fn with_backdrop_blur(mut self, blur_px: f64, clip: Option<BezPath>) -> Self {
        self.backdrop_blur_px = if blur_px.is_finite() { blur_px.max(0.0) } else { 0.0 };
        self.backdrop_clip = clip;
        self
    }

    /// Append a filled shape.
    pub fn fill(&mut self, shape: &impl Shape, transform: Affine, color: Color) {
        if color.a <= 0.0 {
            return;
        }
        self.ops.push(DrawOp::FillPath {
            path: shape.to_path(0.1),
            transform,
            color,
        });
    }

    /// Append a stroked shape.
    pub fn stroke(&mut self, shape: &impl Shape, transform: Affine, width: f64, color: Color) {
        if color.a <= 0.0 || width <= 0.0 {
            return;
        }
        self.ops.push(DrawOp::StrokePath {
            path: shape.to_path(0.1),
            transform,
            width,
            color,
        });
    }

    /// Append an image drawn centered on `center` at `size`, rotated by `rotation_rad`.
    pub fn image_centered(
        &mut self,
        asset: AssetId,
        center: Point,
        size: Size,
        rotation_rad: f64,
        opacity: f64,
    ) {
        let transform = Affine::translate(center.to_vec2())
            * Affine::rotate(rotation_rad)
            * Affine::translate((-size.width / 2.0, -size.height / 2.0));
        self.ops.push(DrawOp::Image {
            asset,
            size,
            transform,
            opacity,
        });
    }

    /// `true` when the layer paints nothing and blurs nothing.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty() && self.backdrop_blur_px <= 0.0
    }
}

/// Backend-agnostic frame description in host-local CSS pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayList {
    /// Host extent.
    pub size: Size,
    /// Layers; see [`DisplayList::sorted_layers`].
    pub layers: Vec<Layer>,
}

impl DisplayList {
    /// Empty list for a host of `size`.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            layers: Vec::new(),
        }
    }

    /// Add a layer unless it is empty.
    pub fn push(&mut self, layer: Layer) {
        if !layer.is_empty() {
            self.layers.push(layer);
        }
    }

    /// Layers in paint order; equal `z` keeps insertion order.
    pub fn sorted_layers(&self) -> Vec<&Layer> {
        let mut out: Vec<&Layer> = self.layers.iter().collect();
        out.sort_by_key(|l| l.z);
        out
    }

    /// First layer produced by `kind`.
    pub fn layer(&self, kind: LayerKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    /// Host bounds in local space.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ORIGIN, self.size)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/display.rs"]
mod tests;
