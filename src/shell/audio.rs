use kurbo::{BezPath, RoundedRect};

use crate::config::color::Color;
use crate::config::model::{BackgroundKind, ProfileConfig};
use crate::foundation::core::{Affine, Point, Rect, Size};
use crate::host::Positioning;
use crate::render::display::{Layer, LayerKind};

/// Initial volume.
pub const DEFAULT_VOLUME: f64 = 0.5;
/// Bass boost low-shelf corner frequency.
pub const BASS_SHELF_HZ: f64 = 200.0;
/// Bass boost gain.
pub const BASS_BOOST_DB: f64 = 15.0;
/// Playback rate range.
pub const TEMPO_RANGE: (f64, f64) = (0.5, 2.0);
/// Vertical distance from the card center to the player's top edge.
pub const CARD_OFFSET_PX: f64 = 180.0;

const BUTTON: f64 = 32.0;
const GAP: f64 = 8.0;
const PADDING: f64 = 8.0;
const VOLUME_SLIDER: f64 = 80.0;
const TEMPO_SLIDER: f64 = 104.0;
const EXPAND_BUTTON: f64 = 24.0;

/// Where the page audio comes from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum AudioSource {
    /// Dedicated audio file.
    Url(String),
    /// The audio track of the background video.
    BackgroundVideo(String),
}

impl AudioSource {
    /// Explicit audio first; otherwise the background video's own track.
    pub fn select(profile: &ProfileConfig) -> Option<Self> {
        let non_empty = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        if let Some(url) = non_empty(&profile.audio_url) {
            return Some(Self::Url(url));
        }
        if profile.background_type == BackgroundKind::Video {
            return non_empty(&profile.background_video_url).map(Self::BackgroundVideo);
        }
        None
    }
}

/// Which controls the visitor sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct AudioControls {
    /// Mute button and, expanded, the volume slider.
    pub volume: bool,
    /// Bass boost toggle.
    pub bass_boost: bool,
    /// Tempo slider, when expanded.
    pub tempo: bool,
}

/// Instruction for the host media element.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum PlaybackCommand {
    /// Attach the source.
    Load(AudioSource),
    /// Start playback; the host answers with [`AudioPlayer::playback_started`] or
    /// [`AudioPlayer::playback_rejected`].
    Play,
    /// Pause.
    Pause,
    /// Effective element volume.
    SetVolume(f64),
    /// Loop flag.
    SetLoop(bool),
    /// Playback rate.
    SetPlaybackRate(f64),
    /// Low-shelf filter at `frequency_hz` with `gain_db`.
    SetBassShelf {
        /// Corner frequency.
        frequency_hz: f64,
        /// Gain.
        gain_db: f64,
    },
}

/// Page audio player state machine.
///
/// Holds no media itself; every state change is mirrored as a [`PlaybackCommand`] the embedder
/// applies to the real element.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPlayer {
    source: AudioSource,
    autoplay: bool,
    looping: bool,
    controls: AudioControls,
    volume: f64,
    muted: bool,
    bass_boost: bool,
    tempo: f64,
    expanded: bool,
    playing: bool,
    play_pending: bool,
    commands: Vec<PlaybackCommand>,
}

impl AudioPlayer {
    /// Player for `profile`, if it has any audio.
    pub fn from_profile(profile: &ProfileConfig) -> Option<Self> {
        let source = AudioSource::select(profile)?;
        let mut player = Self {
            source: source.clone(),
            autoplay: profile.audio_autoplay,
            looping: profile.audio_loop,
            controls: AudioControls {
                volume: profile.show_volume_slider,
                bass_boost: profile.show_bass_boost,
                tempo: profile.show_tempo_slider,
            },
            volume: DEFAULT_VOLUME,
            muted: false,
            bass_boost: false,
            tempo: 1.0,
            expanded: false,
            playing: false,
            play_pending: false,
            commands: Vec::new(),
        };
        player.commands.extend([
            PlaybackCommand::Load(source),
            PlaybackCommand::SetVolume(DEFAULT_VOLUME),
            PlaybackCommand::SetLoop(player.looping),
            PlaybackCommand::SetPlaybackRate(1.0),
        ]);
        Some(player)
    }

    /// Take over flag changes from an edited profile without resetting the visitor's state.
    pub(crate) fn apply_profile(&mut self, profile: &ProfileConfig) {
        self.autoplay = profile.audio_autoplay;
        self.controls = AudioControls {
            volume: profile.show_volume_slider,
            bass_boost: profile.show_bass_boost,
            tempo: profile.show_tempo_slider,
        };
        if self.looping != profile.audio_loop {
            self.looping = profile.audio_loop;
            self.commands.push(PlaybackCommand::SetLoop(self.looping));
        }
    }

    /// Issue the autoplay attempt, if enabled. Browsers may still refuse it.
    pub fn request_autoplay(&mut self) {
        if self.autoplay && !self.playing && !self.play_pending {
            tracing::debug!("requesting audio autoplay");
            self.play_pending = true;
            self.commands.push(PlaybackCommand::Play);
        }
    }

    /// The host started playback.
    pub fn playback_started(&mut self) {
        self.play_pending = false;
        self.playing = true;
    }

    /// The host refused to play; the player stays paused.
    pub fn playback_rejected(&mut self) {
        if self.play_pending {
            tracing::debug!("audio playback rejected by host");
        }
        self.play_pending = false;
        self.playing = false;
    }

    /// Play/pause button.
    pub fn toggle_play(&mut self) {
        if self.playing {
            self.playing = false;
            self.commands.push(PlaybackCommand::Pause);
        } else if !self.play_pending {
            self.play_pending = true;
            self.commands.push(PlaybackCommand::Play);
        }
    }

    /// Volume slider; clamps to `[0, 1]` and unmutes on any audible value.
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { self.volume };
        if self.volume > 0.0 {
            self.muted = false;
        }
        self.commands
            .push(PlaybackCommand::SetVolume(self.effective_volume()));
    }

    /// Mute button.
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.commands
            .push(PlaybackCommand::SetVolume(self.effective_volume()));
    }

    /// Volume the element plays at.
    pub fn effective_volume(&self) -> f64 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Bass boost button.
    pub fn toggle_bass_boost(&mut self) {
        self.bass_boost = !self.bass_boost;
        self.commands.push(PlaybackCommand::SetBassShelf {
            frequency_hz: BASS_SHELF_HZ,
            gain_db: self.bass_gain_db(),
        });
    }

    /// Current shelf gain.
    pub fn bass_gain_db(&self) -> f64 {
        if self.bass_boost { BASS_BOOST_DB } else { 0.0 }
    }

    /// Tempo slider, clamped to [`TEMPO_RANGE`].
    pub fn set_tempo(&mut self, tempo: f64) {
        let (lo, hi) = TEMPO_RANGE;
        self.tempo = crate::foundation::math::clamp_or(tempo, lo, hi, self.tempo);
        self.commands.push(PlaybackCommand::SetPlaybackRate(self.tempo));
    }

    /// Expand toggle; reveals the sliders.
    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Commands issued since the last call.
    pub fn drain_commands(&mut self) -> Vec<PlaybackCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Source being played.
    pub fn source(&self) -> &AudioSource {
        &self.source
    }

    /// Visible controls.
    pub fn controls(&self) -> AudioControls {
        self.controls
    }

    /// Whether audio is playing.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the sliders are revealed.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Current playback rate.
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Player extent for the current controls.
    pub fn size(&self) -> Size {
        let mut width = PADDING * 2.0 + BUTTON + GAP + EXPAND_BUTTON;
        if self.controls.volume {
            width += BUTTON + GAP;
            if self.expanded {
                width += VOLUME_SLIDER + GAP;
            }
        }
        if self.controls.bass_boost {
            width += BUTTON + GAP;
        }
        if self.controls.tempo && self.expanded {
            width += TEMPO_SLIDER + GAP;
        }
        Size::new(width, BUTTON + PADDING * 2.0)
    }

    /// Bounds when anchored under a card centered at `card_center`: horizontally centered, top
    /// edge [`CARD_OFFSET_PX`] below the center.
    pub fn bounds(&self, card_center: Point) -> Rect {
        let size = self.size();
        Rect::from_origin_size(
            (card_center.x - size.width / 2.0, card_center.y + CARD_OFFSET_PX),
            size,
        )
    }

    /// Panel chrome with the play/pause glyph.
    pub fn paint(&self, card_center: Point, z: i32, positioning: Positioning) -> Layer {
        let bounds = self.bounds(card_center);
        let panel = RoundedRect::from_rect(bounds, 8.0);
        let mut layer = Layer::new(LayerKind::Audio, z, positioning)
            .with_backdrop_blur(16.0, Some(kurbo::Shape::to_path(&panel, 0.1)));
        layer.fill(&panel, Affine::IDENTITY, Color::BLACK.with_alpha(0.8));
        layer.stroke(&panel, Affine::IDENTITY, 1.0, Color::WHITE.with_alpha(0.1));

        let glyph_at = Affine::translate((bounds.x0 + PADDING + BUTTON / 2.0, bounds.center().y));
        layer.fill(&self.play_glyph(), glyph_at, Color::WHITE);
        layer
    }

    fn play_glyph(&self) -> BezPath {
        let mut p = BezPath::new();
        if self.playing {
            for x in [-5.0, 2.0] {
                p.move_to((x, -6.0));
                p.line_to((x + 3.0, -6.0));
                p.line_to((x + 3.0, 6.0));
                p.line_to((x, 6.0));
                p.close_path();
            }
        } else {
            p.move_to((-4.0, -6.0));
            p.line_to((6.0, 0.0));
            p.line_to((-4.0, 6.0));
            p.close_path();
        }
        p
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shell/audio.rs"]
mod tests;
