pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Pixel dimensions of a rasterized surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

impl Canvas {
    /// Device-pixel canvas covering a host region of `size` CSS pixels at `pixel_ratio`.
    ///
    /// Negative or non-finite inputs collapse to an empty canvas.
    pub fn from_size(size: Size, pixel_ratio: f64) -> Self {
        fn to_px(v: f64, ratio: f64) -> u32 {
            let px = v * ratio;
            if !px.is_finite() || px <= 0.0 {
                return 0;
            }
            px.ceil().min(f64::from(u16::MAX)) as u32
        }

        let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        Self {
            width: to_px(size.width, ratio),
            height: to_px(size.height, ratio),
        }
    }

    /// Return `true` when the canvas has no pixels.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel (premultiplied).
    pub r: u8,
    /// Green channel (premultiplied).
    pub g: u8,
    /// Blue channel (premultiplied).
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply straight-alpha channels.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

/// Identity of one effect inside a renderer; owner key for listeners, frames and timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum EffectKind {
    /// Snow / ambient particle field.
    Particles,
    /// Pointer trail.
    Trail,
    /// Click bursts.
    Click,
    /// Cursor overlay.
    Cursor,
    /// Card tilt and drag.
    Card,
}

impl EffectKind {
    /// All effects, in paint order (bottom first).
    pub const ALL: [Self; 5] = [
        Self::Particles,
        Self::Card,
        Self::Trail,
        Self::Click,
        Self::Cursor,
    ];
}

/// Non-finite, zero or negative extents have no drawable area.
pub(crate) fn size_is_empty(size: Size) -> bool {
    !(size.width.is_finite() && size.height.is_finite()) || size.width <= 0.0 || size.height <= 0.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
