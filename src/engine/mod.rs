pub(crate) mod renderer;
pub(crate) mod stats;

pub use renderer::{CardState, EffectRenderer, create_effect_renderer};
pub use stats::{EffectStats, ResourceStats};
