use kurbo::{BezPath, PathEl};

use crate::config::color::Color;
use crate::config::model::{CardParams, CardPosition, ConfigModel};
use crate::effects::{Effect, EffectCtx, EffectOutput, PaintCtx, Reconfigure, Resources};
use crate::foundation::core::{Affine, EffectKind, Point, Rect, Size, Vec2, size_is_empty};
use crate::host::{EventKind, HostEvent};
use crate::render::display::Layer;

/// Distance from the viewer to the card plane, in CSS pixels.
pub const PERSPECTIVE_PX: f64 = 1000.0;

/// 3D rotation of the card, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct Tilt {
    /// Rotation about the horizontal axis; positive tips the top edge away.
    pub rotate_x_deg: f64,
    /// Rotation about the vertical axis; positive tips the right edge away.
    pub rotate_y_deg: f64,
}

impl Tilt {
    /// No rotation.
    pub const FLAT: Self = Self {
        rotate_x_deg: 0.0,
        rotate_y_deg: 0.0,
    };
}

/// Tilt for a pointer at `pointer` over a card occupying `card`.
///
/// `rotate_y = (dx / half_width) * intensity`, `rotate_x = -(dy / half_height) * intensity`,
/// with offsets measured from the card center. Degenerate cards do not tilt.
pub fn compute_tilt(pointer: Point, card: Rect, intensity_deg: f64) -> Tilt {
    let half = Vec2::new(card.width() / 2.0, card.height() / 2.0);
    if !(half.x > 0.0 && half.y > 0.0) || !intensity_deg.is_finite() {
        return Tilt::FLAT;
    }
    let d = pointer - card.center();
    Tilt {
        rotate_x_deg: -(d.y / half.y) * intensity_deg,
        rotate_y_deg: (d.x / half.x) * intensity_deg,
    }
}

/// Card bounds for a percentage position inside a host.
pub fn card_rect(position: CardPosition, host: Size, card: Size) -> Rect {
    let center = Point::new(host.width * position.x / 100.0, host.height * position.y / 100.0);
    Rect::from_center_size(center, card)
}

/// Project a point of the card plane, given relative to the card center, through the tilt and
/// perspective. The result is relative to the card center as well.
pub fn project(local: Vec2, tilt: Tilt) -> Vec2 {
    let (sy, cy) = tilt.rotate_y_deg.to_radians().sin_cos();
    let (sx, cx) = tilt.rotate_x_deg.to_radians().sin_cos();
    // rotateY, then rotateX (CSS applies the right-most transform first).
    let x1 = local.x * cy;
    let z1 = -local.x * sy;
    let y2 = local.y * cx - z1 * sx;
    let z2 = local.y * sx + z1 * cx;
    let f = PERSPECTIVE_PX / (PERSPECTIVE_PX - z2).max(1.0);
    Vec2::new(x1 * f, y2 * f)
}

/// Corners of `rect` after tilting, clockwise from the top-left.
pub fn projected_corners(rect: Rect, tilt: Tilt) -> [Point; 4] {
    let c = rect.center();
    let (hw, hh) = (rect.width() / 2.0, rect.height() / 2.0);
    [
        Vec2::new(-hw, -hh),
        Vec2::new(hw, -hh),
        Vec2::new(hw, hh),
        Vec2::new(-hw, hh),
    ]
    .map(|v| c + project(v, tilt))
}

/// Project a path drawn relative to the card center and place the result at `center`.
pub fn project_path(path: &BezPath, center: Point, tilt: Tilt) -> BezPath {
    let place = |p: Point| center + project(p.to_vec2(), tilt);
    path.elements()
        .iter()
        .map(|el| match *el {
            PathEl::MoveTo(p) => PathEl::MoveTo(place(p)),
            PathEl::LineTo(p) => PathEl::LineTo(place(p)),
            PathEl::QuadTo(a, b) => PathEl::QuadTo(place(a), place(b)),
            PathEl::CurveTo(a, b, c) => PathEl::CurveTo(place(a), place(b), place(c)),
            PathEl::ClosePath => PathEl::ClosePath,
        })
        .collect()
}

/// Pointer-driven tilt and, when editable, drag repositioning of the profile card.
#[derive(Debug)]
pub struct CardTransform {
    params: CardParams,
    editable: bool,
    card_size: Size,
    tilt: Tilt,
    drag_offset: Option<Vec2>,
    position: CardPosition,
    res: Resources,
}

impl CardTransform {
    pub(crate) fn new(params: CardParams, editable: bool, card_size: Size) -> Self {
        Self {
            position: params.position,
            params,
            editable,
            card_size,
            tilt: Tilt::FLAT,
            drag_offset: None,
            res: Resources::new(EffectKind::Card),
        }
    }

    /// Current tilt.
    pub fn tilt(&self) -> Tilt {
        self.tilt
    }

    /// Current position; follows the pointer while dragging.
    pub fn position(&self) -> CardPosition {
        self.position
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag_offset.is_some()
    }

    /// Card bounds inside a host of `host` size.
    pub fn rect_in(&self, host: Size) -> Rect {
        card_rect(self.position, host, self.card_size)
    }

    fn commit(&mut self, ctx: &mut EffectCtx<'_>) {
        if self.drag_offset.take().is_some() {
            tracing::debug!(x = self.position.x, y = self.position.y, "card position committed");
            ctx.outbox
                .push(EffectOutput::CardPositionCommitted(self.position));
        }
    }

    fn pointer_moved(&mut self, local: Point, host: Size) {
        if let Some(offset) = self.drag_offset {
            if size_is_empty(host) {
                return;
            }
            let center = local - offset;
            self.position = CardPosition::new(
                center.x / host.width * 100.0,
                center.y / host.height * 100.0,
            );
            return;
        }
        if !self.params.tilt_enabled {
            return;
        }
        let rect = self.rect_in(host);
        self.tilt = if rect.contains(local) {
            compute_tilt(local, rect, self.params.tilt_intensity_degrees)
        } else {
            Tilt::FLAT
        };
    }
}

impl Effect for CardTransform {
    fn kind(&self) -> EffectKind {
        EffectKind::Card
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn mount(&mut self, ctx: &mut EffectCtx<'_>) {
        self.res
            .listen(ctx.host, &[EventKind::PointerMove, EventKind::PointerLeave]);
        if self.editable {
            self.res
                .listen(ctx.host, &[EventKind::PointerDown, EventKind::PointerUp]);
        }
    }

    fn unmount(&mut self, ctx: &mut EffectCtx<'_>) {
        self.res.release(ctx.host, ctx.scheduler);
        self.drag_offset = None;
        self.tilt = Tilt::FLAT;
    }

    fn reconfigure(&mut self, config: &ConfigModel, _ctx: &mut EffectCtx<'_>) -> Reconfigure {
        self.params = config.card.clone();
        if !self.params.tilt_enabled {
            self.tilt = Tilt::FLAT;
        }
        if self.drag_offset.is_none() {
            self.position = self.params.position;
        }
        Reconfigure::Applied
    }

    fn on_event(&mut self, event: &HostEvent, ctx: &mut EffectCtx<'_>) {
        let host = ctx.host.size();
        match (event.kind, event.local) {
            (EventKind::PointerMove, Some(local)) => self.pointer_moved(local, host),
            (EventKind::PointerLeave, _) => {
                self.tilt = Tilt::FLAT;
                self.commit(ctx);
            }
            (EventKind::PointerDown, Some(local)) if self.editable => {
                let rect = self.rect_in(host);
                if rect.contains(local) {
                    self.drag_offset = Some(local - rect.center());
                    self.tilt = Tilt::FLAT;
                }
            }
            (EventKind::PointerUp, _) => self.commit(ctx),
            _ => {}
        }
    }

    fn paint(&self, ctx: &PaintCtx<'_>) -> Option<Layer> {
        if !self.is_dragging() {
            return None;
        }
        let corners = projected_corners(self.rect_in(ctx.size), self.tilt);
        let mut outline = BezPath::new();
        outline.move_to(corners[0]);
        for &c in &corners[1..] {
            outline.line_to(c);
        }
        outline.close_path();

        let mut layer = ctx.layer(EffectKind::Card);
        layer.stroke(&outline, Affine::IDENTITY, 2.0, Color::WHITE.with_alpha(0.5));
        Some(layer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/card.rs"]
mod tests;
