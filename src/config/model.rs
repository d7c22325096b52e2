use std::str::FromStr;

use crate::config::color::{self, Color};
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::math::clamp_or;

const DEFAULT_BACKGROUND: Color = Color::rgba(10.0 / 255.0, 10.0 / 255.0, 10.0 / 255.0, 1.0);
const DEFAULT_CARD_BACKGROUND: Color = Color::rgba(20.0 / 255.0, 20.0 / 255.0, 20.0 / 255.0, 0.8);
const DEFAULT_CARD_BORDER: Color = Color::rgba(1.0, 1.0, 1.0, 0.2);
const DEFAULT_BIO: Color = Color::rgba(1.0, 1.0, 1.0, 0.8);

/// Particle count range.
pub const PARTICLE_COUNT_RANGE: (f64, f64) = (10.0, 500.0);
/// Trail length range; zero disables the trail without unmounting it.
pub const TRAIL_LENGTH_RANGE: (f64, f64) = (0.0, 50.0);
/// Card position range in percent of the host extent.
pub const CARD_POSITION_RANGE: (f64, f64) = (10.0, 90.0);

/// How the page background is painted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    /// Solid `background_color`.
    #[default]
    Color,
    /// Cover-fitted `background_image_url`.
    Image,
    /// Externally decoded `background_video_url`.
    Video,
}

impl FromStr for BackgroundKind {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" => Ok(Self::Color),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(FxError::validation(format!(
                "unknown background type \"{other}\""
            ))),
        }
    }
}

/// Which pointer replacement is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorKind {
    /// Native pointer, no overlay.
    #[default]
    Default,
    /// Ring and dot (or image) overlay following the pointer.
    Custom,
    /// Native pointer suppressed inside the host, no overlay.
    Hidden,
}

impl FromStr for CursorKind {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "custom" => Ok(Self::Custom),
            "hidden" => Ok(Self::Hidden),
            other => Err(FxError::validation(format!("unknown cursor type \"{other}\""))),
        }
    }
}

/// Click-burst variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum ClickEffectKind {
    #[default]
    Ripple,
    Particles,
    Ring,
    Explosion,
    Pulse,
    Hearts,
    Stars,
    Confetti,
    Smoke,
    Lightning,
    Fire,
    Bubbles,
    /// No burst; the click effect is not mounted.
    None,
}

impl ClickEffectKind {
    /// Every variant that draws something, in declaration order.
    pub const ANIMATED: [Self; 12] = [
        Self::Ripple,
        Self::Particles,
        Self::Ring,
        Self::Explosion,
        Self::Pulse,
        Self::Hearts,
        Self::Stars,
        Self::Confetti,
        Self::Smoke,
        Self::Lightning,
        Self::Fire,
        Self::Bubbles,
    ];
}

impl FromStr for ClickEffectKind {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "ripple" => Self::Ripple,
            "particles" => Self::Particles,
            "ring" => Self::Ring,
            "explosion" => Self::Explosion,
            "pulse" => Self::Pulse,
            "hearts" => Self::Hearts,
            "stars" => Self::Stars,
            "confetti" => Self::Confetti,
            "smoke" => Self::Smoke,
            "lightning" => Self::Lightning,
            "fire" => Self::Fire,
            "bubbles" => Self::Bubbles,
            "none" => Self::None,
            other => {
                return Err(FxError::validation(format!(
                    "unknown click effect \"{other}\""
                )));
            }
        };
        Ok(kind)
    }
}

/// Persisted profile row, as read from storage or edited in memory.
///
/// Every field has a product default so partial rows deserialize. Colors and enum strings are
/// read leniently: an unparsable value becomes the default instead of rejecting the row.
/// Numbers accept `null`, which later sanitizes to the default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ProfileConfig {
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,

    #[serde(deserialize_with = "lenient_enum")]
    pub background_type: BackgroundKind,
    #[serde(deserialize_with = "color::lenient")]
    pub background_color: Option<Color>,
    pub background_image_url: Option<String>,
    pub background_video_url: Option<String>,

    pub audio_url: Option<String>,
    pub audio_autoplay: bool,
    pub audio_loop: bool,
    pub show_volume_slider: bool,
    pub show_bass_boost: bool,
    pub show_tempo_slider: bool,

    pub snow_enabled: bool,
    #[serde(deserialize_with = "lenient_number")]
    pub snow_count: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub snow_speed: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub snow_wind: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub snow_size: f64,
    #[serde(deserialize_with = "color::lenient")]
    pub snow_color: Option<Color>,
    #[serde(deserialize_with = "lenient_number")]
    pub snow_opacity: f64,
    pub snow_use_image: bool,
    pub snow_image_url: Option<String>,
    pub snow_rotation: bool,
    #[serde(deserialize_with = "lenient_number")]
    pub snow_sway: f64,

    #[serde(deserialize_with = "lenient_number")]
    pub card_position_x: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub card_position_y: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub card_padding: f64,
    #[serde(deserialize_with = "color::lenient")]
    pub card_background: Option<Color>,
    #[serde(deserialize_with = "lenient_number")]
    pub card_border_radius: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub card_blur: f64,
    pub card_tilt_enabled: bool,
    #[serde(deserialize_with = "lenient_number")]
    pub card_tilt_intensity: f64,
    pub card_glow_enabled: bool,
    #[serde(deserialize_with = "color::lenient")]
    pub card_glow_color: Option<Color>,
    pub card_border_enabled: bool,
    #[serde(deserialize_with = "color::lenient")]
    pub card_border_color: Option<Color>,
    #[serde(deserialize_with = "lenient_number")]
    pub card_border_width: f64,

    #[serde(deserialize_with = "color::lenient")]
    pub name_color: Option<Color>,
    pub name_glow_enabled: bool,
    #[serde(deserialize_with = "color::lenient")]
    pub name_glow_color: Option<Color>,
    #[serde(deserialize_with = "color::lenient")]
    pub bio_color: Option<Color>,

    #[serde(deserialize_with = "lenient_enum")]
    pub cursor_type: CursorKind,
    pub cursor_image_url: Option<String>,
    #[serde(deserialize_with = "color::lenient")]
    pub cursor_color: Option<Color>,

    pub mouse_trail_enabled: bool,
    #[serde(deserialize_with = "color::lenient")]
    pub mouse_trail_color: Option<Color>,
    #[serde(deserialize_with = "lenient_number")]
    pub mouse_trail_length: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub mouse_trail_size: f64,
    pub mouse_trail_fade: bool,
    pub mouse_trail_rainbow: bool,

    pub click_effect_enabled: bool,
    #[serde(deserialize_with = "lenient_enum")]
    pub click_effect_type: ClickEffectKind,
    #[serde(deserialize_with = "color::lenient")]
    pub click_effect_color: Option<Color>,
    #[serde(deserialize_with = "lenient_number")]
    pub click_effect_size: f64,

    pub click_to_enter: bool,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            display_name: None,
            bio: None,
            avatar_url: None,
            background_type: BackgroundKind::Color,
            background_color: Some(DEFAULT_BACKGROUND),
            background_image_url: None,
            background_video_url: None,
            audio_url: None,
            audio_autoplay: false,
            audio_loop: true,
            show_volume_slider: true,
            show_bass_boost: false,
            show_tempo_slider: false,
            snow_enabled: false,
            snow_count: 50.0,
            snow_speed: 1.0,
            snow_wind: 0.0,
            snow_size: 1.0,
            snow_color: Some(Color::WHITE),
            snow_opacity: 0.8,
            snow_use_image: false,
            snow_image_url: None,
            snow_rotation: true,
            snow_sway: 1.0,
            card_position_x: 50.0,
            card_position_y: 50.0,
            card_padding: 24.0,
            card_background: Some(DEFAULT_CARD_BACKGROUND),
            card_border_radius: 16.0,
            card_blur: 10.0,
            card_tilt_enabled: true,
            card_tilt_intensity: 10.0,
            card_glow_enabled: false,
            card_glow_color: Some(Color::WHITE),
            card_border_enabled: false,
            card_border_color: Some(DEFAULT_CARD_BORDER),
            card_border_width: 1.0,
            name_color: Some(Color::WHITE),
            name_glow_enabled: false,
            name_glow_color: Some(Color::WHITE),
            bio_color: Some(DEFAULT_BIO),
            cursor_type: CursorKind::Default,
            cursor_image_url: None,
            cursor_color: Some(Color::WHITE),
            mouse_trail_enabled: false,
            mouse_trail_color: Some(Color::WHITE),
            mouse_trail_length: 20.0,
            mouse_trail_size: 10.0,
            mouse_trail_fade: true,
            mouse_trail_rainbow: false,
            click_effect_enabled: false,
            click_effect_type: ClickEffectKind::Ripple,
            click_effect_color: Some(Color::WHITE),
            click_effect_size: 40.0,
            click_to_enter: false,
        }
    }
}

impl ProfileConfig {
    /// Parse a profile row from JSON.
    pub fn from_json_str(s: &str) -> FxResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize the row back to JSON.
    pub fn to_json_string(&self) -> FxResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Name shown on the card; falls back to the username.
    pub fn shown_name(&self) -> &str {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }

    /// Store a committed card position (percent).
    pub fn set_card_position(&mut self, position: CardPosition) {
        self.card_position_x = position.x;
        self.card_position_y = position.y;
    }

    /// Sanitized card position.
    pub fn card_position(&self) -> CardPosition {
        CardPosition::new(self.card_position_x, self.card_position_y)
    }

    pub(crate) fn background_color_or_default(&self) -> Color {
        self.background_color.unwrap_or(DEFAULT_BACKGROUND)
    }

    pub(crate) fn card_background_or_default(&self) -> Color {
        self.card_background.unwrap_or(DEFAULT_CARD_BACKGROUND)
    }

    pub(crate) fn card_border_color_or_default(&self) -> Color {
        self.card_border_color.unwrap_or(DEFAULT_CARD_BORDER)
    }

    pub(crate) fn bio_color_or_default(&self) -> Color {
        self.bio_color.unwrap_or(DEFAULT_BIO)
    }
}

/// Card center in percent of the host extent, clamped to `[10, 90]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CardPosition {
    /// Horizontal center, percent.
    pub x: f64,
    /// Vertical center, percent.
    pub y: f64,
}

impl CardPosition {
    /// The centered position.
    pub const CENTER: Self = Self { x: 50.0, y: 50.0 };

    /// Build a clamped position; non-finite axes take 50%.
    pub fn new(x: f64, y: f64) -> Self {
        let (lo, hi) = CARD_POSITION_RANGE;
        Self {
            x: clamp_or(x, lo, hi, 50.0),
            y: clamp_or(y, lo, hi, 50.0),
        }
    }
}

impl Default for CardPosition {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Snow / ambient particle parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ParticleParams {
    pub enabled: bool,
    pub count: u32,
    pub speed: f64,
    pub wind: f64,
    pub size: f64,
    pub opacity: f64,
    pub sway: f64,
    pub rotation_enabled: bool,
    pub color: Color,
    pub use_image: bool,
    pub image_ref: Option<String>,
}

/// Pointer trail parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TrailParams {
    pub enabled: bool,
    pub color: Color,
    pub length: u32,
    pub dot_size: f64,
    pub fade: bool,
    pub rainbow: bool,
}

/// Click burst parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ClickParams {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: ClickEffectKind,
    pub color: Color,
    pub size: f64,
}

/// Cursor overlay parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct CursorParams {
    #[serde(rename = "type")]
    pub kind: CursorKind,
    pub color: Color,
    pub image_ref: Option<String>,
}

/// Card tilt and placement parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct CardParams {
    pub tilt_enabled: bool,
    pub tilt_intensity_degrees: f64,
    pub position: CardPosition,
}

/// Declarative description of every effect, as consumed by the renderer.
///
/// Always produced through [`ConfigModel::from_profile`] or [`ConfigModel::sanitized`], so every
/// number sits inside its documented range.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ConfigModel {
    pub particles: ParticleParams,
    pub trail: TrailParams,
    pub click: ClickParams,
    pub cursor: CursorParams,
    pub card: CardParams,
}

impl Default for ConfigModel {
    fn default() -> Self {
        Self::from_profile(&ProfileConfig::default())
    }
}

impl ConfigModel {
    /// Derive the renderer config from a profile row.
    pub fn from_profile(p: &ProfileConfig) -> Self {
        Self {
            particles: ParticleParams {
                enabled: p.snow_enabled,
                count: to_count(p.snow_count, PARTICLE_COUNT_RANGE, 50.0),
                speed: clamp_or(p.snow_speed, 0.1, 3.0, 1.0),
                wind: clamp_or(p.snow_wind, -2.0, 2.0, 0.0),
                size: clamp_or(p.snow_size, 0.5, 5.0, 1.0),
                opacity: clamp_or(p.snow_opacity, 0.1, 1.0, 0.8),
                sway: clamp_or(p.snow_sway, 0.0, 3.0, 1.0),
                rotation_enabled: p.snow_rotation,
                color: p.snow_color.unwrap_or(Color::WHITE),
                use_image: p.snow_use_image,
                image_ref: non_empty(&p.snow_image_url),
            },
            trail: TrailParams {
                enabled: p.mouse_trail_enabled,
                color: p.mouse_trail_color.unwrap_or(Color::WHITE),
                length: to_count(p.mouse_trail_length, TRAIL_LENGTH_RANGE, 20.0),
                dot_size: clamp_or(p.mouse_trail_size, 2.0, 30.0, 10.0),
                fade: p.mouse_trail_fade,
                rainbow: p.mouse_trail_rainbow,
            },
            click: ClickParams {
                enabled: p.click_effect_enabled,
                kind: p.click_effect_type,
                color: p.click_effect_color.unwrap_or(Color::WHITE),
                size: clamp_or(p.click_effect_size, 8.0, 200.0, 40.0),
            },
            cursor: CursorParams {
                kind: p.cursor_type,
                color: p.cursor_color.unwrap_or(Color::WHITE),
                image_ref: non_empty(&p.cursor_image_url),
            },
            card: CardParams {
                tilt_enabled: p.card_tilt_enabled,
                tilt_intensity_degrees: clamp_or(p.card_tilt_intensity, 5.0, 30.0, 10.0),
                position: p.card_position(),
            },
        }
    }

    /// Re-clamp a config that did not come through [`ConfigModel::from_profile`].
    pub fn sanitized(mut self) -> Self {
        let p = &mut self.particles;
        p.count = to_count(f64::from(p.count), PARTICLE_COUNT_RANGE, 50.0);
        p.speed = clamp_or(p.speed, 0.1, 3.0, 1.0);
        p.wind = clamp_or(p.wind, -2.0, 2.0, 0.0);
        p.size = clamp_or(p.size, 0.5, 5.0, 1.0);
        p.opacity = clamp_or(p.opacity, 0.1, 1.0, 0.8);
        p.sway = clamp_or(p.sway, 0.0, 3.0, 1.0);
        p.image_ref = non_empty(&p.image_ref);

        let t = &mut self.trail;
        t.length = to_count(f64::from(t.length), TRAIL_LENGTH_RANGE, 20.0);
        t.dot_size = clamp_or(t.dot_size, 2.0, 30.0, 10.0);

        self.click.size = clamp_or(self.click.size, 8.0, 200.0, 40.0);
        self.cursor.image_ref = non_empty(&self.cursor.image_ref);

        let c = &mut self.card;
        c.tilt_intensity_degrees = clamp_or(c.tilt_intensity_degrees, 5.0, 30.0, 10.0);
        c.position = CardPosition::new(c.position.x, c.position.y);
        self
    }

    /// Parse and sanitize a camelCase JSON config.
    pub fn from_json_str(s: &str) -> FxResult<Self> {
        let raw: Self = serde_json::from_str(s)?;
        Ok(raw.sanitized())
    }
}

fn to_count(v: f64, (lo, hi): (f64, f64), fallback: f64) -> u32 {
    clamp_or(v, lo, hi, fallback).round() as u32
}

fn non_empty(url: &Option<String>) -> Option<String> {
    url.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Accept a number, a numeric string or `null` (mapped to NaN, sanitized later).
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    let raw = <Option<Raw> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Num(v)) => v,
        Some(Raw::Text(s)) => s.trim().parse().unwrap_or(f64::NAN),
        None => f64::NAN,
    })
}

fn lenient_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr<Err = FxError> + Default,
{
    let raw = <Option<String> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(match raw {
        Some(s) => s.parse().unwrap_or_else(|err: FxError| {
            tracing::warn!(value = %s, %err, "falling back to default variant");
            T::default()
        }),
        None => T::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
