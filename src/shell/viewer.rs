use std::cell::RefCell;
use std::rc::Rc;

use crate::assets::store::AssetStore;
use crate::config::device::RendererOptions;
use crate::config::model::{BackgroundKind, CardPosition, ConfigModel, ProfileConfig};
use crate::effects::card::{Tilt, card_rect};
use crate::engine::{CardState, EffectRenderer};
use crate::foundation::core::{Affine, Point, Rect, Size};
use crate::foundation::error::FxResult;
use crate::host::{CursorStyle, HostSpec, Positioning};
use crate::render::display::{DisplayList, Layer, LayerKind};
use crate::render::{FrameRGBA, RenderBackend};
use crate::shell::audio::{AudioPlayer, AudioSource, PlaybackCommand};
use crate::shell::card_content::{CardContent, SocialLink};
use crate::shell::gate::{EntryGate, ViewMode};

/// Stacking of the shell's own layers around the effect layers.
pub const BACKGROUND_Z: i32 = 0;
/// Card content sits above particles and below the card chrome.
pub const CARD_CONTENT_Z: i32 = 15;
/// Audio player.
pub const AUDIO_Z: i32 = 25;
/// Entry gate overlay.
pub const GATE_Z: i32 = 100;

/// Video the embedder should play behind the page.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BackgroundVideo {
    /// Video URL.
    pub url: String,
    /// Whether its audio track is the page audio (no separate audio URL).
    pub plays_audio: bool,
}

/// The rendered bio page: background, entry gate, card content, audio player and the effects.
///
/// Effects are mounted only once the gate is open. Pointer input and time are forwarded to the
/// effect renderer; committed card drags are written back into the profile.
pub struct ViewerShell {
    profile: ProfileConfig,
    content: CardContent,
    links: Vec<SocialLink>,
    mode: ViewMode,
    host: HostSpec,
    options: RendererOptions,
    gate: EntryGate,
    renderer: Option<EffectRenderer>,
    audio: Option<AudioPlayer>,
    assets: AssetStore,
    now_ms: f64,
    committed: Rc<RefCell<Vec<CardPosition>>>,
    pending_commits: Vec<CardPosition>,
}

impl std::fmt::Debug for ViewerShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerShell")
            .field("mode", &self.mode)
            .field("entered", &self.gate.is_open())
            .field("renderer", &self.renderer)
            .field("now_ms", &self.now_ms)
            .finish_non_exhaustive()
    }
}

impl ViewerShell {
    /// Shell for `profile` on `host`. Preview mode makes the card draggable.
    pub fn new(
        profile: ProfileConfig,
        links: Vec<SocialLink>,
        mode: ViewMode,
        host: HostSpec,
        mut options: RendererOptions,
    ) -> Self {
        options.editable = mode == ViewMode::Preview;
        let mut shell = Self {
            content: CardContent::from_profile(&profile, &links),
            gate: EntryGate::new(mode, profile.click_to_enter),
            audio: AudioPlayer::from_profile(&profile),
            profile,
            links,
            mode,
            host,
            options,
            renderer: None,
            assets: AssetStore::new(),
            now_ms: 0.0,
            committed: Rc::new(RefCell::new(Vec::new())),
            pending_commits: Vec::new(),
        };
        if shell.gate.is_open() {
            shell.on_entered();
        }
        shell
    }

    fn on_entered(&mut self) {
        self.mount_renderer();
        if let Some(audio) = self.audio.as_mut() {
            audio.request_autoplay();
        }
    }

    fn mount_renderer(&mut self) {
        let mut renderer = EffectRenderer::new(
            ConfigModel::from_profile(&self.profile),
            self.host,
            self.options.clone(),
        );
        let committed = Rc::clone(&self.committed);
        renderer.set_on_position_change(move |position| committed.borrow_mut().push(position));
        self.renderer = Some(renderer);
    }

    fn collect_commits(&mut self) {
        let commits = std::mem::take(&mut *self.committed.borrow_mut());
        for position in commits {
            self.profile.set_card_position(position);
            self.pending_commits.push(position);
        }
    }

    /// Whether the visitor is past the entry gate.
    pub fn is_entered(&self) -> bool {
        self.gate.is_open()
    }

    /// Pointer pressed. On a closed gate a press inside the host enters the page instead of
    /// reaching the effects.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if !self.gate.is_open() {
            if self.contains(Point::new(x, y)) && self.gate.enter() {
                self.on_entered();
            }
            return;
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.pointer_down(x, y);
        }
        self.collect_commits();
    }

    /// Pointer moved.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.pointer_move(x, y);
        }
        self.collect_commits();
    }

    /// Pointer released.
    pub fn pointer_up(&mut self, x: f64, y: f64) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.pointer_up(x, y);
        }
        self.collect_commits();
    }

    /// Pointer left the host.
    pub fn pointer_leave(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.pointer_leave();
        }
        self.collect_commits();
    }

    /// Viewport resized. Only meaningful for window hosting.
    pub fn resize_window(&mut self, viewport: Size) {
        if let HostSpec::Window { viewport: current } = &mut self.host {
            *current = viewport;
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize_window(viewport);
        }
    }

    /// Container re-laid out. Only meaningful for container hosting.
    pub fn resize_container(&mut self, rect: Rect) {
        if let HostSpec::Container { element } = &mut self.host {
            element.rect = rect;
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize_container(rect);
        }
    }

    /// Move time forward.
    pub fn advance(&mut self, dt_ms: f64) {
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return;
        }
        self.now_ms += dt_ms;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.advance(dt_ms);
        }
        self.collect_commits();
    }

    /// Apply an edited profile. Audio keeps playing unless its source changed.
    #[tracing::instrument(skip_all, fields(mode = ?self.mode))]
    pub fn update_profile(&mut self, profile: ProfileConfig, links: Vec<SocialLink>) {
        let was_open = self.gate.is_open();
        self.gate.set_click_to_enter(profile.click_to_enter);
        let source_changed =
            self.audio.as_ref().map(AudioPlayer::source).cloned() != AudioSource::select(&profile);
        self.content = CardContent::from_profile(&profile, &links);
        self.profile = profile;
        self.links = links;

        if source_changed {
            tracing::debug!("audio source changed");
            self.audio = AudioPlayer::from_profile(&self.profile);
            if self.gate.is_open() {
                if let Some(audio) = self.audio.as_mut() {
                    audio.request_autoplay();
                }
            }
        } else if let Some(audio) = self.audio.as_mut() {
            audio.apply_profile(&self.profile);
        }

        if !self.gate.is_open() {
            if self.renderer.take().is_some() {
                tracing::debug!("gate re-armed, effects unmounted");
            }
        } else if let Some(renderer) = self.renderer.as_mut() {
            renderer.update(ConfigModel::from_profile(&self.profile));
        } else if !was_open {
            self.on_entered();
        } else {
            self.mount_renderer();
        }
    }

    /// Put the card back in the middle of the host.
    pub fn recenter(&mut self) {
        self.profile.set_card_position(CardPosition::CENTER);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.update(ConfigModel::from_profile(&self.profile));
        }
    }

    /// Card positions committed by drags since the last call.
    pub fn take_committed_positions(&mut self) -> Vec<CardPosition> {
        std::mem::take(&mut self.pending_commits)
    }

    /// Current profile, including committed drags.
    pub fn profile(&self) -> &ProfileConfig {
        &self.profile
    }

    /// Social links, as last supplied.
    pub fn links(&self) -> &[SocialLink] {
        &self.links
    }

    /// Effect renderer; absent while the gate is closed.
    pub fn renderer(&self) -> Option<&EffectRenderer> {
        self.renderer.as_ref()
    }

    /// Audio player, when the profile has audio.
    pub fn audio(&self) -> Option<&AudioPlayer> {
        self.audio.as_ref()
    }

    /// Mutable audio player for the visitor's control input and host playback callbacks.
    pub fn audio_mut(&mut self) -> Option<&mut AudioPlayer> {
        self.audio.as_mut()
    }

    /// Playback commands issued since the last call.
    pub fn drain_playback_commands(&mut self) -> Vec<PlaybackCommand> {
        self.audio
            .as_mut()
            .map(AudioPlayer::drain_commands)
            .unwrap_or_default()
    }

    /// Background video the embedder should play, if any.
    pub fn background_video(&self) -> Option<BackgroundVideo> {
        if self.profile.background_type != BackgroundKind::Video {
            return None;
        }
        let url = self.profile.background_video_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        Some(BackgroundVideo {
            url: url.to_owned(),
            plays_audio: matches!(
                self.audio.as_ref().map(AudioPlayer::source),
                Some(AudioSource::BackgroundVideo(_))
            ),
        })
    }

    /// Images for the background, avatar and effects.
    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// Mutable access for inserting fetched images.
    pub fn assets_mut(&mut self) -> &mut AssetStore {
        &mut self.assets
    }

    /// Native cursor style for the host element.
    pub fn cursor_style(&self) -> CursorStyle {
        self.renderer
            .as_ref()
            .map(EffectRenderer::cursor_style)
            .unwrap_or_default()
    }

    /// Card geometry as laid out now.
    pub fn card_state(&self) -> CardState {
        match &self.renderer {
            Some(renderer) => renderer.card_state(),
            None => {
                let position = self.profile.card_position();
                CardState {
                    rect: card_rect(position, self.host.size(), self.options.card_size),
                    tilt: Tilt::FLAT,
                    position,
                    dragging: false,
                }
            }
        }
    }

    /// The whole page as one display list.
    pub fn display_list(&self) -> DisplayList {
        let size = self.host.size();
        let positioning = self.host.positioning();
        let mut list = DisplayList::new(size);
        list.push(self.background_layer(size, positioning));

        if !self.gate.is_open() {
            list.push(self.gate.paint(size, self.now_ms, GATE_Z, positioning));
            return list;
        }

        let card = self.card_state();
        list.push(self.content.paint(card.rect, card.tilt, CARD_CONTENT_Z, positioning, &self.assets));
        if let Some(renderer) = &self.renderer {
            for layer in renderer.effect_layers_with(&self.assets) {
                list.push(layer);
            }
        }
        if let Some(audio) = &self.audio {
            list.push(audio.paint(card.rect.center(), AUDIO_Z, positioning));
        }
        list
    }

    /// Rasterize the page at the effective device pixel ratio.
    #[tracing::instrument(skip_all, fields(entered = self.gate.is_open()))]
    pub fn render(&self, backend: &mut dyn RenderBackend) -> FxResult<FrameRGBA> {
        let pixel_ratio = self.options.degradation.pixel_ratio(&self.options.device);
        backend.render_display_list(&self.display_list(), &self.assets, pixel_ratio)
    }

    fn contains(&self, window_point: Point) -> bool {
        match &self.host {
            HostSpec::Window { .. } => true,
            HostSpec::Container { element } => element.rect.abs().contains(window_point),
        }
    }

    fn background_layer(&self, size: Size, positioning: Positioning) -> Layer {
        let bounds = Rect::from_origin_size(Point::ORIGIN, size);
        let mut layer = Layer::new(LayerKind::Background, BACKGROUND_Z, positioning);
        layer.fill(&bounds, Affine::IDENTITY, self.profile.background_color_or_default());

        if self.profile.background_type != BackgroundKind::Image {
            return layer;
        }
        let Some(url) = self.profile.background_image_url.as_deref() else {
            return layer;
        };
        let Some((id, image)) = self
            .assets
            .resolve(url.trim())
            .and_then(|id| Some((id, self.assets.get(id)?)))
        else {
            return layer;
        };
        let (w, h) = (f64::from(image.width), f64::from(image.height));
        if w > 0.0 && h > 0.0 {
            let cover = (size.width / w).max(size.height / h);
            layer.image_centered(id, bounds.center(), Size::new(w * cover, h * cover), 0.0, 1.0);
        }
        layer
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shell/viewer.rs"]
mod tests;
