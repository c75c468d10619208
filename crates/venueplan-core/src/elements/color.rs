//! Fill and border colors as persisted in layouts.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// RGBA8 color that round-trips through CSS-style strings.
///
/// Layouts store colors as `#rrggbb`, `#rrggbbaa`, `#rgb` or the keyword
/// `transparent`. Anything else parses as black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Default fill for palette elements.
    pub const fn palette_blue() -> Self {
        Self::new(0x3b, 0x82, 0xf6, 255)
    }

    /// A fully transparent color carries no visible fill.
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Parse a CSS-style color string.
    pub fn parse(color: &str) -> Self {
        let color = color.trim();
        if color.eq_ignore_ascii_case("transparent") {
            return Self::transparent();
        }
        if color.eq_ignore_ascii_case("white") {
            return Self::white();
        }

        if let Some(hex) = color.strip_prefix('#').filter(|h| h.is_ascii()) {
            let channel = |s: &str| u8::from_str_radix(s, 16).ok();
            match hex.len() {
                3 => {
                    let short = |s: &str| channel(s).map(|v| v * 17);
                    if let (Some(r), Some(g), Some(b)) = (short(&hex[0..1]), short(&hex[1..2]), short(&hex[2..3])) {
                        return Self::new(r, g, b, 255);
                    }
                }
                6 => {
                    if let (Some(r), Some(g), Some(b)) = (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])) {
                        return Self::new(r, g, b, 255);
                    }
                }
                8 => {
                    if let (Some(r), Some(g), Some(b), Some(a)) = (
                        channel(&hex[0..2]),
                        channel(&hex[2..4]),
                        channel(&hex[4..6]),
                        channel(&hex[6..8]),
                    ) {
                        return Self::new(r, g, b, a);
                    }
                }
                _ => {}
            }
        }

        log::debug!("Unrecognised color {:?}, using black", color);
        Self::black()
    }

    /// Format as the string stored in layouts.
    pub fn to_css(&self) -> String {
        match self.a {
            0 => "transparent".to_string(),
            255 => format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b),
            a => format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, a),
        }
    }

    /// Color with an extra opacity factor folded into alpha.
    pub fn with_opacity(&self, opacity: f64) -> Color {
        let alpha = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Color::from_rgba8(self.r, self.g, self.b, alpha)
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::palette_blue()
    }
}

impl From<String> for SerializableColor {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_css()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}
