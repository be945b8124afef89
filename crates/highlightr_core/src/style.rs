//! Colors, fonts and the resolved attribute set painted onto text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    /// Fallback for color literals that cannot be resolved.
    pub const GRAY: Color = Color::rgb(128, 128, 128);

    /// Opaque color from its components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Resolves a stylesheet color literal.
    ///
    /// Accepts `#RRGGBB`, `#RGB` and the names `white`, `black`, `red`,
    /// `green`, `blue` (case-insensitive). Anything else resolves to
    /// [`Color::GRAY`].
    pub fn parse_css(value: &str) -> Self {
        let value = value.trim();
        let Some(hex) = value.strip_prefix('#') else {
            return match value.to_ascii_lowercase().as_str() {
                "white" => Self::WHITE,
                "black" => Self::BLACK,
                "red" => Self::RED,
                "green" => Self::GREEN,
                "blue" => Self::BLUE,
                _ => Self::GRAY,
            };
        };
        parse_hex(hex).unwrap_or(Self::GRAY)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |idx: usize| u8::from_str_radix(&hex[idx..idx + 1], 16).ok();
    let byte = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
    match hex.len() {
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        // #RGB duplicates each nibble: 0xF -> 0xFF.
        3 => Some(Color::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
        _ => None,
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Face variant of a font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontVariant {
    #[default]
    Regular,
    Bold,
    Italic,
    Oblique,
}

/// Font description: family, point size and face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub variant: FontVariant,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            variant: FontVariant::Regular,
        }
    }

    pub fn with_variant(&self, variant: FontVariant) -> Self {
        Self {
            variant,
            ..self.clone()
        }
    }
}

/// Derives bold/italic/oblique faces from a base font.
///
/// Platform font lookup lives behind this trait so themes can be compiled
/// without touching a font system.
pub trait FontResolver: Send + Sync {
    /// Returns the `variant` face of `base`'s family, or `None` when the
    /// family has no such face.
    fn derive_variant(&self, base: &Font, variant: FontVariant) -> Option<Font>;
}

/// Resolver that assumes every family provides every face.
#[derive(Debug, Clone, Copy, Default)]
pub struct FamilyFontResolver;

impl FontResolver for FamilyFontResolver {
    fn derive_variant(&self, base: &Font, variant: FontVariant) -> Option<Font> {
        Some(base.with_variant(variant))
    }
}

/// Paragraph-level layout settings attached to highlighted text.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParagraphStyle {
    pub line_spacing: f32,
}

/// Fully resolved attribute set for one run of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleAttributes {
    pub font: Font,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<ParagraphStyle>,
}

impl StyleAttributes {
    /// Plain attributes carrying only a font.
    pub fn plain(font: Font) -> Self {
        Self {
            font,
            foreground: None,
            background: None,
            paragraph: None,
        }
    }
}
