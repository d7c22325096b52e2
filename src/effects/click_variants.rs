//! Geometry and timing of the click-burst variants.
//!
//! A burst is a set of [`Sprite`]s spawned at the click point. Each sprite carries its own
//! timing and tweens, randomized at spawn time, so painting is a pure function of elapsed time.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use kurbo::{BezPath, Circle, Point, Rect, Vec2};

use crate::animation::ease::Ease;
use crate::animation::tween::{Timing, Tween};
use crate::config::color::Color;
use crate::config::model::ClickEffectKind;
use crate::foundation::core::Affine;
use crate::foundation::math::RandomSource;
use crate::render::display::Layer;

/// Lifetime of a burst, in milliseconds.
pub fn duration_ms(kind: ClickEffectKind) -> f64 {
    match kind {
        ClickEffectKind::Ripple => 600.0,
        ClickEffectKind::Particles => 700.0,
        ClickEffectKind::Ring => 600.0,
        ClickEffectKind::Explosion => 800.0,
        ClickEffectKind::Pulse => 500.0,
        ClickEffectKind::Hearts => 1000.0,
        ClickEffectKind::Stars => 900.0,
        ClickEffectKind::Confetti => 1200.0,
        ClickEffectKind::Smoke => 1500.0,
        ClickEffectKind::Lightning => 400.0,
        ClickEffectKind::Fire => 800.0,
        ClickEffectKind::Bubbles => 1200.0,
        ClickEffectKind::None => 0.0,
    }
}

/// Drawable primitive of a sprite, in sprite-local units centered on the origin.
#[derive(Clone, Debug, PartialEq)]
pub enum SpriteShape {
    /// Stroked circle of diameter `size`.
    Ring {
        /// Border width.
        width: f64,
    },
    /// Filled circle of diameter `size`.
    Dot,
    /// Filled circle with a faint halo.
    Puff,
    /// Stroked circle with a highlight.
    Bubble,
    /// Filled heart.
    Heart,
    /// Filled five-pointed star.
    Star,
    /// Filled rectangle, `size` wide and `size * aspect` tall.
    Paper {
        /// Height over width.
        aspect: f64,
    },
    /// Teardrop pointing up.
    Flame,
    /// Zig-zag polyline, already in sprite-local pixels.
    Bolt(BezPath),
}

/// One animated element of a burst.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    /// What to draw.
    pub shape: SpriteShape,
    /// Nominal extent in pixels.
    pub size: f64,
    /// Fill or stroke color.
    pub color: Color,
    /// Start delay and duration relative to the burst.
    pub timing: Timing,
    /// Displacement from the click point.
    pub offset: Tween<Vec2>,
    /// Extra downward displacement `gravity * t^2`.
    pub gravity: f64,
    /// Uniform scale.
    pub scale: Tween<f64>,
    /// Opacity multiplier.
    pub opacity: Tween<f64>,
    /// Rotation, radians.
    pub rotation: Tween<f64>,
}

impl Sprite {
    fn new(shape: SpriteShape, size: f64, color: Color, timing: Timing) -> Self {
        Self {
            shape,
            size,
            color,
            timing,
            offset: Tween::hold(Vec2::ZERO),
            gravity: 0.0,
            scale: Tween::hold(1.0),
            opacity: Tween::new(1.0, 0.0, Ease::Linear),
            rotation: Tween::hold(0.0),
        }
    }

    fn offset(mut self, to: Vec2, ease: Ease) -> Self {
        self.offset = Tween::new(self.offset.from, to, ease);
        self
    }

    fn offset_from(mut self, from: Vec2, to: Vec2, ease: Ease) -> Self {
        self.offset = Tween::new(from, to, ease);
        self
    }

    fn scale(mut self, from: f64, to: f64, ease: Ease) -> Self {
        self.scale = Tween::new(from, to, ease);
        self
    }

    fn opacity(mut self, from: f64, to: f64, ease: Ease) -> Self {
        self.opacity = Tween::new(from, to, ease);
        self
    }

    fn rotation(mut self, from: f64, to: f64, ease: Ease) -> Self {
        self.rotation = Tween::new(from, to, ease);
        self
    }

    fn gravity(mut self, g: f64) -> Self {
        self.gravity = g;
        self
    }

    /// Whether the sprite draws anything at `elapsed_ms`.
    pub fn is_visible(&self, elapsed_ms: f64) -> bool {
        self.timing.progress(elapsed_ms).is_some()
    }

    /// Append this sprite's ops for the burst at `origin`, `elapsed_ms` after the click.
    pub fn paint(&self, layer: &mut Layer, origin: Point, elapsed_ms: f64) {
        let Some(t) = self.timing.progress(elapsed_ms) else {
            return;
        };
        let opacity = self.opacity.at(t).clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }
        let offset = self.offset.at(t) + Vec2::new(0.0, self.gravity * t * t);
        let transform = Affine::translate(origin.to_vec2() + offset)
            * Affine::rotate(self.rotation.at(t))
            * Affine::scale(self.scale.at(t).max(0.0));
        let color = self.color.fade(opacity);
        let r = self.size / 2.0;

        match &self.shape {
            SpriteShape::Ring { width } => {
                layer.stroke(&Circle::new(Point::ORIGIN, r), transform, *width, color);
            }
            SpriteShape::Dot => layer.fill(&Circle::new(Point::ORIGIN, r), transform, color),
            SpriteShape::Puff => {
                layer.fill(&Circle::new(Point::ORIGIN, r * 1.4), transform, color.fade(0.35));
                layer.fill(&Circle::new(Point::ORIGIN, r), transform, color);
            }
            SpriteShape::Bubble => {
                layer.stroke(&Circle::new(Point::ORIGIN, r), transform, 1.5, color);
                layer.fill(
                    &Circle::new(Point::new(-r * 0.35, -r * 0.35), r * 0.2),
                    transform,
                    Color::WHITE.fade(opacity * 0.8),
                );
            }
            SpriteShape::Heart => layer.fill(&heart_path(r), transform, color),
            SpriteShape::Star => layer.fill(&star_path(r, r * 0.45), transform, color),
            SpriteShape::Paper { aspect } => {
                let h = self.size * aspect;
                layer.fill(
                    &Rect::new(-r, -h / 2.0, r, h / 2.0),
                    transform,
                    color,
                );
            }
            SpriteShape::Flame => layer.fill(&flame_path(r), transform, color),
            SpriteShape::Bolt(path) => layer.stroke(path, transform, 2.0, color),
        }
    }
}

/// Spawn the sprites of one burst.
///
/// `size` is the configured click effect size in pixels; `color` the configured color.
pub fn spawn(
    kind: ClickEffectKind,
    size: f64,
    color: Color,
    rng: &mut dyn RandomSource,
) -> Vec<Sprite> {
    let total = duration_ms(kind);
    let full = Timing::new(0.0, total);
    match kind {
        ClickEffectKind::None => Vec::new(),
        ClickEffectKind::Ripple => vec![
            Sprite::new(SpriteShape::Ring { width: 2.0 }, size, color, full)
                .scale(1.0, 2.0, Ease::OutCubic)
                .opacity(1.0, 0.0, Ease::OutQuad),
        ],
        ClickEffectKind::Ring => vec![
            Sprite::new(SpriteShape::Ring { width: 4.0 }, size, color, full)
                .scale(0.5, 1.8, Ease::OutCubic)
                .opacity(1.0, 0.0, Ease::InQuad),
        ],
        ClickEffectKind::Particles => (0..8)
            .map(|i| {
                let dir = polar(f64::from(i) * PI / 4.0 - FRAC_PI_2);
                Sprite::new(SpriteShape::Dot, 8.0, color, full)
                    .offset_from(dir * (size / 2.0), dir * (size * 1.1), Ease::OutCubic)
                    .scale(1.0, 0.5, Ease::Linear)
            })
            .collect(),
        ClickEffectKind::Explosion => (0..16)
            .map(|_| {
                let delay = rng.range(0.0, 100.0);
                let dir = polar(rng.range(0.0, TAU));
                let dist = rng.range(size * 0.8, size * 1.6);
                let tint = color.mix(Color::rgba(1.0, 0.6, 0.1, color.a), rng.range(0.0, 0.5));
                Sprite::new(
                    SpriteShape::Dot,
                    rng.range(3.0, 7.0),
                    tint,
                    Timing::new(delay, total - delay),
                )
                .offset(dir * dist, Ease::OutCubic)
                .scale(1.2, 0.3, Ease::InQuad)
            })
            .collect(),
        ClickEffectKind::Pulse => vec![
            Sprite::new(SpriteShape::Dot, size, color, full)
                .scale(0.2, 1.5, Ease::OutQuad)
                .opacity(0.6, 0.0, Ease::Linear),
            Sprite::new(
                SpriteShape::Ring { width: 2.0 },
                size,
                color,
                Timing::new(100.0, total - 100.0),
            )
            .scale(0.4, 1.6, Ease::OutCubic),
        ],
        ClickEffectKind::Hearts => (0..5)
            .map(|_| {
                let delay = rng.range(0.0, 150.0);
                let angle = rng.range(-150.0, -30.0).to_radians();
                let dist = rng.range(size, size * 2.0);
                Sprite::new(
                    SpriteShape::Heart,
                    rng.range(10.0, 18.0),
                    color,
                    Timing::new(delay, total - delay),
                )
                .offset(polar(angle) * dist, Ease::OutQuad)
                .scale(0.4, 1.0, Ease::OutBack)
                .rotation(0.0, rng.range(-0.4, 0.4), Ease::Linear)
                .opacity(1.0, 0.0, Ease::InQuad)
            })
            .collect(),
        ClickEffectKind::Stars => (0..6)
            .map(|i| {
                let angle = f64::from(i) * TAU / 6.0 + rng.range(-0.2, 0.2);
                Sprite::new(SpriteShape::Star, rng.range(10.0, 16.0), color, full)
                    .offset(polar(angle) * (size * 0.9), Ease::OutCubic)
                    .scale(0.3, 1.0, Ease::OutBack)
                    .rotation(0.0, PI, Ease::OutQuad)
            })
            .collect(),
        ClickEffectKind::Confetti => (0..14)
            .map(|i| {
                let hue = f64::from(i) * 360.0 / 14.0;
                let tint = if i % 3 == 0 {
                    color
                } else {
                    Color::from_hsl(hue, 0.85, 0.6, 1.0)
                };
                let angle = rng.range(-160.0, -20.0).to_radians();
                let spin = rng.range(-TAU, TAU);
                Sprite::new(
                    SpriteShape::Paper {
                        aspect: rng.range(0.4, 0.7),
                    },
                    rng.range(6.0, 10.0),
                    tint,
                    full,
                )
                .offset(polar(angle) * rng.range(size, size * 1.8), Ease::OutCubic)
                .gravity(size * 1.5)
                .rotation(0.0, spin, Ease::Linear)
                .opacity(1.0, 0.0, Ease::InCubic)
            })
            .collect(),
        ClickEffectKind::Smoke => (0..6)
            .map(|_| {
                let delay = rng.range(0.0, 300.0);
                let grey = color.mix(Color::rgba(0.6, 0.6, 0.6, color.a), 0.6);
                Sprite::new(
                    SpriteShape::Puff,
                    rng.range(size * 0.3, size * 0.6),
                    grey,
                    Timing::new(delay, total - delay),
                )
                .offset(
                    Vec2::new(rng.range(-size * 0.4, size * 0.4), -size * 1.5),
                    Ease::OutQuad,
                )
                .scale(0.5, 2.2, Ease::OutQuad)
                .opacity(0.5, 0.0, Ease::Linear)
            })
            .collect(),
        ClickEffectKind::Lightning => (0..3)
            .map(|_| {
                let angle = rng.range(0.0, TAU);
                let path = bolt_path(size * 1.2, angle, &mut *rng);
                Sprite::new(SpriteShape::Bolt(path), size, color, full)
                    .opacity(1.0, 0.0, Ease::InCubic)
            })
            .collect(),
        ClickEffectKind::Fire => (0..10)
            .map(|_| {
                let delay = rng.range(0.0, 200.0);
                let tint = Color::rgba(1.0, 0.85, 0.2, color.a).mix(color, rng.range(0.3, 1.0));
                Sprite::new(
                    SpriteShape::Flame,
                    rng.range(8.0, 14.0),
                    tint,
                    Timing::new(delay, total - delay),
                )
                .offset_from(
                    Vec2::new(rng.range(-size * 0.3, size * 0.3), 0.0),
                    Vec2::new(rng.range(-size * 0.2, size * 0.2), -rng.range(size * 0.8, size * 1.6)),
                    Ease::OutQuad,
                )
                .scale(1.0, 0.2, Ease::InQuad)
            })
            .collect(),
        ClickEffectKind::Bubbles => (0..8)
            .map(|_| {
                let delay = rng.range(0.0, 250.0);
                Sprite::new(
                    SpriteShape::Bubble,
                    rng.range(8.0, 20.0),
                    color,
                    Timing::new(delay, total - delay),
                )
                .offset(
                    Vec2::new(rng.range(-size * 0.6, size * 0.6), -rng.range(size, size * 2.0)),
                    Ease::OutQuad,
                )
                .scale(0.6, 1.1, Ease::OutQuad)
                .opacity(0.9, 0.0, Ease::InQuad)
            })
            .collect(),
    }
}

fn polar(angle: f64) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

fn heart_path(r: f64) -> BezPath {
    let mut p = BezPath::new();
    p.move_to((0.0, r * 0.9));
    p.curve_to((-r * 1.2, 0.0), (-r * 0.9, -r * 1.1), (0.0, -r * 0.45));
    p.curve_to((r * 0.9, -r * 1.1), (r * 1.2, 0.0), (0.0, r * 0.9));
    p.close_path();
    p
}

fn star_path(outer: f64, inner: f64) -> BezPath {
    let mut p = BezPath::new();
    for i in 0..10 {
        let r = if i % 2 == 0 { outer } else { inner };
        let a = f64::from(i) * PI / 5.0 - FRAC_PI_2;
        let pt = Point::new(a.cos() * r, a.sin() * r);
        if i == 0 {
            p.move_to(pt);
        } else {
            p.line_to(pt);
        }
    }
    p.close_path();
    p
}

fn flame_path(r: f64) -> BezPath {
    let mut p = BezPath::new();
    p.move_to((0.0, -r * 1.6));
    p.quad_to((r * 1.1, -r * 0.2), (0.0, r));
    p.quad_to((-r * 1.1, -r * 0.2), (0.0, -r * 1.6));
    p.close_path();
    p
}

fn bolt_path(length: f64, angle: f64, rng: &mut dyn RandomSource) -> BezPath {
    const SEGMENTS: u32 = 5;
    let dir = polar(angle);
    let normal = Vec2::new(-dir.y, dir.x);
    let mut p = BezPath::new();
    p.move_to(Point::ORIGIN);
    for i in 1..=SEGMENTS {
        let along = length * f64::from(i) / f64::from(SEGMENTS);
        let jitter = if i == SEGMENTS {
            0.0
        } else {
            rng.range(-length * 0.15, length * 0.15)
        };
        p.line_to((dir * along + normal * jitter).to_point());
    }
    p
}

#[cfg(test)]
#[path = "../../tests/unit/effects/click_variants.rs"]
mod tests;
