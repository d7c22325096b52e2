use crate::config::model::{ClickEffectKind, ClickParams, ConfigModel};
use crate::effects::click_variants::{self, Sprite};
use crate::effects::{Effect, EffectCtx, PaintCtx, Reconfigure, Resources};
use crate::foundation::core::{EffectKind, Point};
use crate::host::{EventKind, HostEvent};
use crate::render::display::Layer;
use crate::runtime::scheduler::{FiredTimer, TimerId};

/// One live burst.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickToken {
    /// Monotonic id, unique per mount.
    pub id: u64,
    /// Host-local click point.
    pub origin: Point,
    /// Variant captured at click time.
    pub kind: ClickEffectKind,
    /// Virtual time of the click.
    pub created_ms: f64,
    sprites: Vec<Sprite>,
    timer: TimerId,
}

/// Pool of short-lived bursts spawned on pointer-down.
#[derive(Debug)]
pub struct ClickBurst {
    params: ClickParams,
    tokens: Vec<ClickToken>,
    next_id: u64,
    res: Resources,
}

impl ClickBurst {
    pub(crate) fn new(params: ClickParams) -> Self {
        Self {
            params,
            tokens: Vec::new(),
            next_id: 0,
            res: Resources::new(EffectKind::Click),
        }
    }

    /// Live tokens, in creation order.
    pub fn tokens(&self) -> &[ClickToken] {
        &self.tokens
    }

    fn spawn(&mut self, origin: Point, at_ms: f64, ctx: &mut EffectCtx<'_>) {
        let kind = self.params.kind;
        if kind == ClickEffectKind::None {
            return;
        }
        let id = self.next_id;
        self.next_id += 1;
        let timer = self
            .res
            .timeout(ctx.scheduler, click_variants::duration_ms(kind), id);
        let sprites = click_variants::spawn(kind, self.params.size, self.params.color, &mut *ctx.rng);
        tracing::trace!(id, ?kind, x = origin.x, y = origin.y, "click burst");
        self.tokens.push(ClickToken {
            id,
            origin,
            kind,
            created_ms: at_ms,
            sprites,
            timer,
        });
    }
}

impl Effect for ClickBurst {
    fn kind(&self) -> EffectKind {
        EffectKind::Click
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn mount(&mut self, ctx: &mut EffectCtx<'_>) {
        self.res.listen(ctx.host, &[EventKind::PointerDown]);
    }

    fn unmount(&mut self, ctx: &mut EffectCtx<'_>) {
        let pending = self.tokens.len();
        self.res.release(ctx.host, ctx.scheduler);
        self.tokens.clear();
        if pending > 0 {
            tracing::debug!(pending, "click bursts cancelled on unmount");
        }
    }

    fn reconfigure(&mut self, config: &ConfigModel, _ctx: &mut EffectCtx<'_>) -> Reconfigure {
        // Live tokens keep the variant they were spawned with.
        self.params = config.click.clone();
        Reconfigure::Applied
    }

    fn on_event(&mut self, event: &HostEvent, ctx: &mut EffectCtx<'_>) {
        if let (EventKind::PointerDown, Some(local)) = (event.kind, event.local) {
            self.spawn(local, event.at_ms, ctx);
        }
    }

    fn on_timer(&mut self, timer: &FiredTimer, _ctx: &mut EffectCtx<'_>) {
        self.res.settle(timer.id);
        self.tokens.retain(|t| t.timer != timer.id);
    }

    fn paint(&self, ctx: &PaintCtx<'_>) -> Option<Layer> {
        if self.tokens.is_empty() {
            return None;
        }
        let mut layer = ctx.layer(EffectKind::Click);
        for token in &self.tokens {
            let elapsed = ctx.now_ms - token.created_ms;
            for sprite in &token.sprites {
                sprite.paint(&mut layer, token.origin, elapsed);
            }
        }
        Some(layer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/click.rs"]
mod tests;
