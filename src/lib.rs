//! biofx is the visual-effects engine behind bio/profile pages.
//!
//! A page is configured by one [`ProfileConfig`] row. From it the engine drives five effects over
//! a window or a single container element:
//!
//! - falling particles ([`Particle`]) with optional sprite images
//! - a pointer trail ([`TrailPoint`]) that decays while the pointer rests
//! - click bursts ([`ClickToken`]) in twelve variants
//! - a custom cursor overlay
//! - a perspective card tilt, draggable in the editor preview
//!
//! [`EffectRenderer`] owns the effects of one host region and advances them on a virtual clock.
//! [`ViewerShell`] composes it with the background, the entry gate, the card content and the
//! audio player into a [`DisplayList`] that [`CpuBackend`] rasterizes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod assets;
mod config;
mod effects;
mod foundation;
mod host;
mod runtime;

pub(crate) mod engine;
pub(crate) mod render;
pub(crate) mod shell;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, EffectKind, Point, Rect, Rgba8Premul, Size, Vec2,
};
pub use crate::foundation::error::{FxError, FxResult};

pub use crate::assets::store::{AssetId, AssetState, AssetStore, PreparedImage};
pub use crate::config::color::Color;
pub use crate::config::device::{DegradationPolicy, DeviceProfile, RendererOptions};
pub use crate::config::model::{
    BackgroundKind, CardParams, CardPosition, ClickEffectKind, ClickParams, ConfigModel,
    CursorKind, CursorParams, ParticleParams, ProfileConfig, TrailParams,
};
pub use crate::effects::card::{PERSPECTIVE_PX, Tilt, card_rect, compute_tilt, project};
pub use crate::effects::click::ClickToken;
pub use crate::effects::click_variants::duration_ms as click_duration_ms;
pub use crate::effects::particles::Particle;
pub use crate::effects::trail::TrailPoint;
pub use crate::engine::{
    CardState, EffectRenderer, EffectStats, ResourceStats, create_effect_renderer,
};
pub use crate::host::{
    CursorStyle, ElementHandle, HostMode, HostSpec, ListenerCounters, Positioning, RawInput,
};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::display::{DisplayList, DrawOp, Layer, LayerKind};
pub use crate::render::{FrameRGBA, RenderBackend};
pub use crate::runtime::scheduler::OwnerCounters;
pub use crate::shell::{
    AudioControls, AudioPlayer, AudioSource, BackgroundVideo, BrandColors, CardContent, CardStyle,
    EntryGate, Platform, PlaybackCommand, SocialLink, ViewMode, ViewerShell,
};
