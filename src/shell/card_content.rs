use std::str::FromStr;

use kurbo::{Circle, RoundedRect, Shape};

use crate::assets::store::AssetStore;
use crate::config::color::{self, Color};
use crate::config::model::ProfileConfig;
use crate::effects::card::{Tilt, project, project_path};
use crate::foundation::core::{Affine, Point, Rect, Size, Vec2};
use crate::foundation::error::FxError;
use crate::host::Positioning;
use crate::render::display::{Layer, LayerKind};

/// Avatar diameter.
pub const AVATAR_SIZE: f64 = 96.0;
/// Height of one social-link chip.
pub const LINK_CHIP_HEIGHT: f64 = 36.0;
/// Gap between chips.
pub const LINK_CHIP_GAP: f64 = 12.0;
const LINK_CHIP_WIDTH: f64 = 44.0;
const GLOW_SPREAD: f64 = 40.0;
const GLOW_ALPHA: f64 = 0x40 as f64 / 255.0;

/// Social platform of a link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Platform {
    Discord,
    Steam,
    Xbox,
    Twitter,
    Instagram,
    Youtube,
    Tiktok,
    Github,
    Twitch,
    Spotify,
    Snapchat,
    Reddit,
    Linkedin,
    Paypal,
    Cashapp,
    #[default]
    Custom,
}

impl FromStr for Platform {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let p = match s.trim().to_ascii_lowercase().as_str() {
            "discord" => Self::Discord,
            "steam" => Self::Steam,
            "xbox" => Self::Xbox,
            "twitter" | "x" => Self::Twitter,
            "instagram" => Self::Instagram,
            "youtube" => Self::Youtube,
            "tiktok" => Self::Tiktok,
            "github" => Self::Github,
            "twitch" => Self::Twitch,
            "spotify" => Self::Spotify,
            "snapchat" => Self::Snapchat,
            "reddit" => Self::Reddit,
            "linkedin" => Self::Linkedin,
            "paypal" => Self::Paypal,
            "cashapp" => Self::Cashapp,
            "custom" => Self::Custom,
            other => return Err(FxError::validation(format!("unknown platform \"{other}\""))),
        };
        Ok(p)
    }
}

/// Icon and chip colors of a platform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrandColors {
    /// Icon tint.
    pub icon: Color,
    /// Chip background.
    pub background: Color,
}

impl Platform {
    /// Brand palette.
    pub fn brand(self) -> BrandColors {
        let (icon, (r, g, b, a)) = match self {
            Self::Discord => (0x5865F2, (88, 101, 242, 0.2)),
            Self::Steam => (0x000000, (0, 0, 0, 0.3)),
            Self::Xbox => (0x107C10, (16, 124, 16, 0.2)),
            Self::Twitter => (0x000000, (0, 0, 0, 0.3)),
            Self::Instagram => (0xE4405F, (228, 64, 95, 0.2)),
            Self::Youtube => (0xFF0000, (255, 0, 0, 0.2)),
            Self::Tiktok => (0x000000, (255, 255, 255, 0.1)),
            Self::Github => (0xFFFFFF, (255, 255, 255, 0.1)),
            Self::Twitch => (0x9146FF, (145, 70, 255, 0.2)),
            Self::Spotify => (0x1DB954, (29, 185, 84, 0.2)),
            Self::Snapchat => (0xFFFC00, (255, 252, 0, 0.2)),
            Self::Reddit => (0xFF4500, (255, 69, 0, 0.2)),
            Self::Linkedin => (0x0A66C2, (10, 102, 194, 0.2)),
            Self::Paypal => (0x00457C, (0, 69, 124, 0.2)),
            Self::Cashapp => (0x00D632, (0, 214, 50, 0.2)),
            Self::Custom => (0xFFFFFF, (255, 255, 255, 0.1)),
        };
        let [_, ir, ig, ib] = u32::to_be_bytes(icon);
        BrandColors {
            icon: Color::from_rgb8(ir, ig, ib, 1.0),
            background: Color::from_rgb8(r, g, b, a),
        }
    }
}

/// One social link row.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SocialLink {
    /// Row id.
    pub id: String,
    /// Visible label; empty shows the icon alone.
    pub title: String,
    /// Target URL.
    pub url: String,
    /// Platform; unknown strings read as `custom`.
    #[serde(deserialize_with = "lenient_platform")]
    pub icon_type: Platform,
    /// Icon for `custom` links.
    pub custom_icon_url: Option<String>,
    /// Icon tint override.
    #[serde(deserialize_with = "color::lenient")]
    pub icon_color: Option<Color>,
    /// Chip background override.
    #[serde(deserialize_with = "color::lenient")]
    pub background_color: Option<Color>,
    /// Sort key.
    pub display_order: i32,
}

impl Default for SocialLink {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            url: String::new(),
            icon_type: Platform::Custom,
            custom_icon_url: None,
            icon_color: None,
            background_color: None,
            display_order: 0,
        }
    }
}

impl SocialLink {
    /// Icon tint after overrides.
    pub fn icon_color(&self) -> Color {
        self.icon_color.unwrap_or(self.icon_type.brand().icon)
    }

    /// Chip background after overrides.
    pub fn chip_color(&self) -> Color {
        self.background_color
            .unwrap_or(self.icon_type.brand().background)
    }
}

fn lenient_platform<'de, D>(deserializer: D) -> Result<Platform, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = <Option<String> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.parse().ok())
        .unwrap_or(Platform::Custom))
}

/// Card chrome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardStyle {
    /// Inner padding.
    pub padding: f64,
    /// Fill.
    pub background: Color,
    /// Corner radius.
    pub radius: f64,
    /// Backdrop blur radius; zero disables it.
    pub blur_px: f64,
    /// Glow color, when enabled.
    pub glow: Option<Color>,
    /// Border width and color, when enabled.
    pub border: Option<(f64, Color)>,
}

impl CardStyle {
    /// Style for `profile`, with out-of-range numbers replaced.
    pub fn from_profile(profile: &ProfileConfig) -> Self {
        use crate::foundation::math::clamp_or;

        Self {
            padding: clamp_or(profile.card_padding, 0.0, 64.0, 24.0),
            background: profile.card_background_or_default(),
            radius: clamp_or(profile.card_border_radius, 0.0, 64.0, 16.0),
            blur_px: clamp_or(profile.card_blur, 0.0, 40.0, 10.0),
            glow: profile
                .card_glow_enabled
                .then(|| profile.card_glow_color.unwrap_or(Color::WHITE)),
            border: profile.card_border_enabled.then(|| {
                (
                    clamp_or(profile.card_border_width, 0.0, 10.0, 1.0),
                    profile.card_border_color_or_default(),
                )
            }),
        }
    }
}

/// Static profile card: avatar, name, bio and links.
///
/// Text is not rasterized here; the embedder lays it out from [`CardContent::name`] and
/// [`CardContent::bio`]. The chrome, avatar and link chips are painted through the card tilt.
#[derive(Clone, Debug, PartialEq)]
pub struct CardContent {
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Display name, or the username.
    pub name: String,
    /// Bio text.
    pub bio: Option<String>,
    /// Name color.
    pub name_color: Color,
    /// Name glow, when enabled.
    pub name_glow: Option<Color>,
    /// Bio color.
    pub bio_color: Color,
    /// Links, by `display_order`.
    pub links: Vec<SocialLink>,
    /// Chrome.
    pub style: CardStyle,
}

impl CardContent {
    /// Content for `profile` and its links.
    pub fn from_profile(profile: &ProfileConfig, links: &[SocialLink]) -> Self {
        let mut links = links.to_vec();
        links.sort_by_key(|l| l.display_order);
        Self {
            avatar_url: profile
                .avatar_url
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            name: profile.shown_name().to_owned(),
            bio: profile.bio.clone().filter(|b| !b.trim().is_empty()),
            name_color: profile.name_color.unwrap_or(Color::WHITE),
            name_glow: profile
                .name_glow_enabled
                .then(|| profile.name_glow_color.unwrap_or(Color::WHITE)),
            bio_color: profile.bio_color_or_default(),
            links,
            style: CardStyle::from_profile(profile),
        }
    }

    /// Uppercased first letter of the name, shown when the avatar is missing.
    pub fn avatar_fallback(&self) -> Option<char> {
        self.name.chars().next().map(|c| c.to_ascii_uppercase())
    }

    /// Link chip centers relative to the card center, one row wrapped to the content width.
    pub fn link_slots(&self, card: Size) -> Vec<Vec2> {
        let inner = (card.width - 2.0 * self.style.padding).max(LINK_CHIP_WIDTH);
        let per_row = (((inner + LINK_CHIP_GAP) / (LINK_CHIP_WIDTH + LINK_CHIP_GAP)).floor() as usize).max(1);
        let bottom = card.height / 2.0 - self.style.padding - LINK_CHIP_HEIGHT / 2.0;
        let rows = self.links.len().div_ceil(per_row);

        let mut out = Vec::with_capacity(self.links.len());
        for (i, _) in self.links.iter().enumerate() {
            let row = i / per_row;
            let in_row = (self.links.len() - row * per_row).min(per_row);
            let col = i % per_row;
            let row_width = in_row as f64 * LINK_CHIP_WIDTH + (in_row as f64 - 1.0) * LINK_CHIP_GAP;
            let x = -row_width / 2.0 + LINK_CHIP_WIDTH / 2.0 + col as f64 * (LINK_CHIP_WIDTH + LINK_CHIP_GAP);
            let y = bottom - (rows - 1 - row) as f64 * (LINK_CHIP_HEIGHT + LINK_CHIP_GAP);
            out.push(Vec2::new(x, y));
        }
        out
    }

    /// Paint the card at `rect` under `tilt`.
    pub fn paint(
        &self,
        rect: Rect,
        tilt: Tilt,
        z: i32,
        positioning: Positioning,
        assets: &AssetStore,
    ) -> Layer {
        let center = rect.center();
        let size = rect.size();
        let local = Rect::from_center_size(Point::ORIGIN, size);
        let outline = project_path(
            &RoundedRect::from_rect(local, self.style.radius).to_path(0.1),
            center,
            tilt,
        );

        let style = &self.style;
        let mut layer = Layer::new(LayerKind::Card, z, positioning)
            .with_backdrop_blur(style.blur_px, Some(outline.clone()));

        if let Some(glow) = style.glow {
            layer.stroke(&outline, Affine::IDENTITY, GLOW_SPREAD, glow.with_alpha(GLOW_ALPHA * glow.a));
        }
        layer.fill(&outline, Affine::IDENTITY, style.background);
        if let Some((width, color)) = style.border {
            layer.stroke(&outline, Affine::IDENTITY, width, color);
        }

        let avatar_center = Vec2::new(0.0, -size.height / 2.0 + style.padding + AVATAR_SIZE / 2.0);
        if let Some(url) = &self.avatar_url {
            let at = center + project(avatar_center, tilt);
            match assets.resolve(url) {
                Some(id) => layer.image_centered(id, at, Size::new(AVATAR_SIZE, AVATAR_SIZE), 0.0, 1.0),
                None => {
                    let disc = Circle::new(avatar_center.to_point(), AVATAR_SIZE / 2.0).to_path(0.1);
                    layer.fill(&project_path(&disc, center, tilt), Affine::IDENTITY, Color::WHITE.with_alpha(0.1));
                }
            }
        }

        for (link, slot) in self.links.iter().zip(self.link_slots(size)) {
            let chip = Rect::from_center_size(slot.to_point(), Size::new(LINK_CHIP_WIDTH, LINK_CHIP_HEIGHT));
            let chip = project_path(&RoundedRect::from_rect(chip, 8.0).to_path(0.1), center, tilt);
            layer.fill(&chip, Affine::IDENTITY, link.chip_color());
            let icon = Circle::new(slot.to_point(), 10.0).to_path(0.1);
            layer.fill(&project_path(&icon, center, tilt), Affine::IDENTITY, link.icon_color());
        }
        layer
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shell/card_content.rs"]
mod tests;
