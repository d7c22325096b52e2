use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{FxError, FxResult};

/// Straight-alpha color with normalized `0..=1` channels.
///
/// Parsed from the CSS-ish strings stored in profile records: `#rgb`, `#rrggbb`, `#rrggbbaa`,
/// `rgb(...)`, `rgba(...)`, `hsl(...)`, `hsla(...)` and a few names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);

    /// Build from normalized channels.
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels and a normalized alpha.
    pub fn from_rgb8(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            a,
        )
    }

    /// HSL(A) with hue in degrees and saturation/lightness in `0..=1`.
    pub fn from_hsl(h: f64, s: f64, l: f64, a: f64) -> Self {
        hsla_to_rgba(h, s, l, a)
    }

    /// Replace the alpha channel.
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Multiply the alpha channel.
    pub fn fade(self, factor: f64) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Linear blend towards `other` by `t`.
    pub fn mix(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        Self::rgba(
            lerp(self.r, other.r),
            lerp(self.g, other.g),
            lerp(self.b, other.b),
            lerp(self.a, other.a),
        )
    }

    /// Parse a CSS color string.
    pub fn parse(s: &str) -> FxResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(FxError::validation("color must be non-empty"));
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
            return parse_rgb_args(args);
        }
        if let Some(args) = function_args(&lower, "hsla").or_else(|| function_args(&lower, "hsl")) {
            return parse_hsl_args(args);
        }
        match lower.as_str() {
            "white" => Ok(Self::WHITE),
            "black" => Ok(Self::BLACK),
            "transparent" => Ok(Self::rgba(0.0, 0.0, 0.0, 0.0)),
            "red" => Ok(Self::rgba(1.0, 0.0, 0.0, 1.0)),
            _ => Err(FxError::validation(format!("unsupported color \"{s}\""))),
        }
    }

    /// Convert to premultiplied RGBA8.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        let a = self.a.clamp(0.0, 1.0);
        Rgba8Premul {
            r: to_u8(self.r.clamp(0.0, 1.0) * a),
            g: to_u8(self.g.clamp(0.0, 1.0) * a),
            b: to_u8(self.b.clamp(0.0, 1.0) * a),
            a: to_u8(a),
        }
    }

    /// Render as `#rrggbb` (opaque) or `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        let c = |x: f64| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
        if c(self.a) == 255 {
            format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                c(self.r),
                c(self.g),
                c(self.b),
                c(self.a)
            )
        }
    }
}

impl serde::Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Deserialize an optional color, mapping unparsable strings to `None`.
///
/// Profile rows are edited by hand and by older editors; a bad color must not reject the
/// whole record.
pub(crate) fn lenient<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = <Option<String> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match Color::parse(&s) {
        Ok(c) => Some(c),
        Err(err) => {
            tracing::warn!(value = %s, %err, "ignoring unparsable color");
            None
        }
    }))
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn split_args(args: &str) -> Vec<&str> {
    args.split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_number(part: &str) -> FxResult<f64> {
    let v: f64 = part
        .trim_end_matches("deg")
        .parse()
        .map_err(|_| FxError::validation(format!("invalid color component \"{part}\"")))?;
    if !v.is_finite() {
        return Err(FxError::validation("color component must be finite"));
    }
    Ok(v)
}

fn parse_unit(part: &str) -> FxResult<f64> {
    match part.strip_suffix('%') {
        Some(p) => Ok(parse_number(p)? / 100.0),
        None => parse_number(part),
    }
}

fn parse_alpha(parts: &[&str], idx: usize) -> FxResult<f64> {
    match parts.get(idx) {
        Some(p) => Ok(parse_unit(p)?.clamp(0.0, 1.0)),
        None => Ok(1.0),
    }
}

fn parse_rgb_args(args: &str) -> FxResult<Color> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err(FxError::validation("rgb()/rgba() expects 3 or 4 components"));
    }
    let channel = |p: &str| -> FxResult<f64> {
        match p.strip_suffix('%') {
            Some(pct) => Ok((parse_number(pct)? / 100.0).clamp(0.0, 1.0)),
            None => Ok((parse_number(p)? / 255.0).clamp(0.0, 1.0)),
        }
    };
    Ok(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        parse_alpha(&parts, 3)?,
    ))
}

fn parse_hsl_args(args: &str) -> FxResult<Color> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err(FxError::validation("hsl()/hsla() expects 3 or 4 components"));
    }
    let h = parse_number(parts[0])?;
    let s = parse_unit(parts[1])?;
    let l = parse_unit(parts[2])?;
    Ok(hsla_to_rgba(h, s, l, parse_alpha(&parts, 3)?))
}

fn parse_hex(s: &str) -> FxResult<Color> {
    fn hex_byte(pair: &str) -> FxResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| FxError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    if !s.is_ascii() {
        return Err(FxError::validation("hex color must be ascii"));
    }

    let (r, g, b, a) = match s.len() {
        3 | 4 => {
            let expand = |i: usize| hex_byte(&s[i..i + 1].repeat(2));
            let a = if s.len() == 4 { expand(3)? } else { 255 };
            (expand(0)?, expand(1)?, expand(2)?, a)
        }
        6 | 8 => {
            let a = if s.len() == 8 { hex_byte(&s[6..8])? } else { 255 };
            (
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
                a,
            )
        }
        _ => {
            return Err(FxError::validation(
                "hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA",
            ));
        }
    };

    Ok(Color::from_rgb8(r, g, b, f64::from(a) / 255.0))
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> Color {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let a = a.clamp(0.0, 1.0);

    if s == 0.0 {
        return Color::rgba(l, l, l, a);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    Color::rgba(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
        a,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/config/color.rs"]
mod tests;
