use std::cell::Cell;
use std::f64::consts::TAU;

use kurbo::Circle;

use crate::config::model::{ConfigModel, ParticleParams};
use crate::effects::{Effect, EffectCtx, PaintCtx, Reconfigure, Resources};
use crate::foundation::core::{EffectKind, Point, Size, size_is_empty};
use crate::foundation::math::RandomSource;
use crate::host::{EventKind, HostEvent};
use crate::render::display::Layer;
use crate::runtime::scheduler::FRAME_INTERVAL_MS;

/// Distance past an edge at which a particle wraps.
pub const WRAP_MARGIN: f64 = 10.0;

/// Upper bound on one step's frame-normalized delta, so a stalled tab does not teleport flakes.
pub const MAX_STEP: f64 = 4.0;

/// Image particles are drawn at this multiple of their radius.
const IMAGE_SCALE: f64 = 10.0;

/// One simulated flake, in host-local pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Center.
    pub position: Point,
    /// Radius.
    pub size: f64,
    /// Fall speed per nominal frame.
    pub speed: f64,
    /// Sway phase.
    pub wobble: f64,
    /// Sway phase advance per nominal frame.
    pub wobble_speed: f64,
    /// Current rotation, radians.
    pub rotation: f64,
    /// Rotation advance per nominal frame.
    pub rotation_speed: f64,
    /// Per-flake sway phase offset.
    pub sway_offset: f64,
    /// Times this flake re-entered from the top.
    pub wraps: u32,
}

impl Particle {
    fn spawn(params: &ParticleParams, bounds: Size, rng: &mut dyn RandomSource) -> Self {
        Self {
            position: Point::new(
                rng.next_f64() * bounds.width,
                rng.next_f64() * bounds.height,
            ),
            size: (rng.next_f64() * 3.0 + 1.0) * params.size,
            speed: (rng.next_f64() + 0.5) * params.speed,
            wobble: rng.next_f64() * TAU,
            wobble_speed: rng.next_f64() * 0.02 + 0.005,
            rotation: rng.next_f64() * TAU,
            rotation_speed: (rng.next_f64() - 0.5) * 0.02,
            sway_offset: rng.next_f64() * TAU,
            wraps: 0,
        }
    }

    fn step(&mut self, params: &ParticleParams, bounds: Size, dt: f64, rng: &mut dyn RandomSource) {
        self.position.y += self.speed * dt;
        self.wobble += self.wobble_speed * dt;
        self.position.x +=
            (self.wobble + self.sway_offset).sin() * params.sway * 2.0 * dt + params.wind * dt;
        if params.rotation_enabled {
            self.rotation += self.rotation_speed * dt;
        }

        if self.position.y > bounds.height + WRAP_MARGIN {
            self.position.y = -WRAP_MARGIN;
            self.position.x = rng.next_f64() * bounds.width;
            self.wraps += 1;
        }
        if self.position.x > bounds.width + WRAP_MARGIN {
            self.position.x = -WRAP_MARGIN;
        } else if self.position.x < -WRAP_MARGIN {
            self.position.x = bounds.width + WRAP_MARGIN;
        }
    }
}

/// Snow / ambient particle simulation bound to the host region.
#[derive(Debug)]
pub struct ParticleField {
    params: ParticleParams,
    particles: Vec<Particle>,
    bounds: Size,
    last_step_ms: Option<f64>,
    frame_counter: u64,
    res: Resources,
    image_fallback_logged: Cell<bool>,
}

impl ParticleField {
    pub(crate) fn new(params: ParticleParams) -> Self {
        Self {
            params,
            particles: Vec::new(),
            bounds: Size::ZERO,
            last_step_ms: None,
            frame_counter: 0,
            res: Resources::new(EffectKind::Particles),
            image_fallback_logged: Cell::new(false),
        }
    }

    /// Live particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles simulated after degradation.
    pub(crate) fn target_count(&self, ctx: &EffectCtx<'_>) -> u32 {
        match ctx.fidelity.particle_cap {
            Some(cap) => self.params.count.min(cap),
            None => self.params.count,
        }
    }

    fn reseed(&mut self, ctx: &mut EffectCtx<'_>) {
        self.bounds = ctx.host.size();
        self.last_step_ms = None;
        self.particles.clear();
        if size_is_empty(self.bounds) {
            tracing::debug!("host has no area; particle field idles");
            self.res.cancel_frame(ctx.scheduler);
            return;
        }
        let count = self.target_count(ctx);
        self.particles.reserve(count as usize);
        for _ in 0..count {
            self.particles
                .push(Particle::spawn(&self.params, self.bounds, &mut *ctx.rng));
        }
        tracing::debug!(
            count,
            width = self.bounds.width,
            height = self.bounds.height,
            "particle field seeded"
        );
        self.res.request_frame(ctx.scheduler);
    }

    /// Advance every particle by `dt` nominal frames.
    pub(crate) fn step(&mut self, dt: f64, rng: &mut dyn RandomSource) {
        for p in &mut self.particles {
            p.step(&self.params, self.bounds, dt, rng);
        }
    }
}

impl Effect for ParticleField {
    fn kind(&self) -> EffectKind {
        EffectKind::Particles
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn mount(&mut self, ctx: &mut EffectCtx<'_>) {
        let kinds = ctx.host.resize_kinds();
        self.res.listen(ctx.host, kinds);
        self.reseed(ctx);
    }

    fn unmount(&mut self, ctx: &mut EffectCtx<'_>) {
        self.res.release(ctx.host, ctx.scheduler);
        self.particles.clear();
        self.last_step_ms = None;
    }

    fn reconfigure(&mut self, config: &ConfigModel, ctx: &mut EffectCtx<'_>) -> Reconfigure {
        let next = &config.particles;
        let reseed = next.count != self.params.count
            || next.size != self.params.size
            || next.speed != self.params.speed;
        if next.image_ref != self.params.image_ref || next.use_image != self.params.use_image {
            self.image_fallback_logged.set(false);
        }
        self.params = next.clone();
        if reseed {
            self.reseed(ctx);
        }
        Reconfigure::Applied
    }

    fn on_event(&mut self, event: &HostEvent, ctx: &mut EffectCtx<'_>) {
        if matches!(event.kind, EventKind::WindowResize | EventKind::ContainerResize) {
            self.reseed(ctx);
        }
    }

    fn on_frame(&mut self, now_ms: f64, ctx: &mut EffectCtx<'_>) {
        if self.particles.is_empty() {
            return;
        }
        self.res.request_frame(ctx.scheduler);

        self.frame_counter += 1;
        let skip = u64::from(ctx.fidelity.frame_skip.max(1));
        if self.frame_counter % skip != 0 {
            return;
        }
        let dt = match self.last_step_ms {
            None => 1.0,
            Some(last) => ((now_ms - last) / FRAME_INTERVAL_MS).clamp(0.0, MAX_STEP),
        };
        self.last_step_ms = Some(now_ms);
        self.step(dt, &mut *ctx.rng);
    }

    fn paint(&self, ctx: &PaintCtx<'_>) -> Option<Layer> {
        if self.particles.is_empty() {
            return None;
        }
        let image = match (&self.params.image_ref, self.params.use_image) {
            (Some(url), true) => {
                let id = ctx.assets.resolve(url);
                if id.is_none() && !self.image_fallback_logged.replace(true) {
                    tracing::debug!(url = %url, "particle image unavailable; drawing circles");
                }
                id
            }
            _ => None,
        };

        let mut layer = ctx.layer(EffectKind::Particles);
        let color = self.params.color;
        for p in &self.particles {
            let rotation = if self.params.rotation_enabled { p.rotation } else { 0.0 };
            match image {
                Some(id) => {
                    let side = p.size * IMAGE_SCALE;
                    layer.image_centered(
                        id,
                        p.position,
                        Size::new(side, side),
                        rotation,
                        self.params.opacity,
                    );
                }
                None => layer.fill(
                    &Circle::new(p.position, p.size),
                    kurbo::Affine::IDENTITY,
                    color.fade(self.params.opacity),
                ),
            }
        }
        Some(layer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/particles.rs"]
mod tests;
