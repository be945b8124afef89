//! Theme compilation: stylesheet text to a scope style table.

mod assets;
mod stylesheet;
#[cfg(test)]
mod tests;

pub use assets::ThemeAssets;

use crate::constants::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE};
use crate::style::{
    Color, FamilyFontResolver, Font, FontResolver, FontVariant, ParagraphStyle, StyleAttributes,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use stylesheet::{base_background, light_stylesheet, strip_stylesheet, StrippedTheme};

/// Attributes a single scope defines; `None` fields fall through to outer scopes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScopeStyle {
    pub font: Option<Font>,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

impl ScopeStyle {
    fn is_empty(&self) -> bool {
        self.font.is_none() && self.foreground.is_none() && self.background.is_none()
    }

    fn apply_to(&self, attrs: &mut StyleAttributes) {
        if let Some(font) = &self.font {
            attrs.font = font.clone();
        }
        if let Some(color) = self.foreground {
            attrs.foreground = Some(color);
        }
        if let Some(color) = self.background {
            attrs.background = Some(color);
        }
    }
}

/// A compiled highlighting theme.
///
/// The parsed declaration table is kept so font and spacing changes only
/// re-resolve attributes instead of re-parsing the stylesheet.
#[derive(Clone)]
pub struct Theme {
    source: Arc<str>,
    stripped: Arc<StrippedTheme>,
    light_stylesheet: String,
    scopes: HashMap<String, ScopeStyle>,
    background: Color,
    code_font: Font,
    bold_font: Font,
    italic_font: Font,
    paragraph: ParagraphStyle,
    resolver: Arc<dyn FontResolver>,
}

impl fmt::Debug for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Theme")
            .field("scopes", &self.scopes.len())
            .field("background", &self.background)
            .field("code_font", &self.code_font)
            .field("paragraph", &self.paragraph)
            .finish_non_exhaustive()
    }
}

impl Theme {
    /// Compiles `stylesheet` with the default code font.
    pub fn new(stylesheet: &str) -> Self {
        Self::with_font(
            stylesheet,
            Font::new(DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE),
            Arc::new(FamilyFontResolver),
        )
    }

    /// Compiles `stylesheet` using `code_font` and a platform font resolver.
    pub fn with_font(stylesheet: &str, code_font: Font, resolver: Arc<dyn FontResolver>) -> Self {
        let stripped = strip_stylesheet(stylesheet);
        let light_stylesheet = light_stylesheet(&stripped);
        let background = base_background(&stripped)
            .map(background_color)
            .unwrap_or(Color::WHITE);
        let mut theme = Self {
            source: Arc::from(stylesheet),
            stripped: Arc::new(stripped),
            light_stylesheet,
            scopes: HashMap::new(),
            background,
            bold_font: code_font.clone(),
            italic_font: code_font.clone(),
            code_font,
            paragraph: ParagraphStyle::default(),
            resolver,
        };
        theme.set_fonts(theme.code_font.clone(), None, None);
        theme
    }

    /// Raw stylesheet text this theme was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Stylesheet without the document background, for the HTML path.
    pub fn light_stylesheet(&self) -> &str {
        &self.light_stylesheet
    }

    /// Document background; white when the theme declares none.
    pub fn background(&self) -> Color {
        self.background
    }

    pub fn code_font(&self) -> &Font {
        &self.code_font
    }

    pub fn bold_font(&self) -> &Font {
        &self.bold_font
    }

    pub fn italic_font(&self) -> &Font {
        &self.italic_font
    }

    pub fn line_spacing(&self) -> f32 {
        self.paragraph.line_spacing
    }

    /// Compiled style for `scope` (without the leading dot).
    pub fn scope_style(&self, scope: &str) -> Option<&ScopeStyle> {
        self.scopes.get(scope)
    }

    /// Names of every scope with at least one resolved attribute.
    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    /// Changes the code font and derives bold/italic faces from it.
    pub fn set_code_font(&mut self, code_font: Font) {
        self.set_fonts(code_font, None, None);
    }

    /// Changes the code font with optional explicit italic/bold faces.
    ///
    /// An explicit italic face is only kept when it belongs to the code
    /// font's family; otherwise the oblique face is derived.
    pub fn set_fonts(&mut self, code_font: Font, italic: Option<Font>, bold: Option<Font>) {
        let resolver = Arc::clone(&self.resolver);
        self.bold_font = bold
            .or_else(|| resolver.derive_variant(&code_font, FontVariant::Bold))
            .unwrap_or_else(|| code_font.clone());
        self.italic_font = italic
            .filter(|font| font.family == code_font.family)
            .or_else(|| resolver.derive_variant(&code_font, FontVariant::Oblique))
            .or_else(|| resolver.derive_variant(&code_font, FontVariant::Italic))
            .unwrap_or_else(|| code_font.clone());
        self.code_font = code_font;
        self.recompile();
    }

    pub fn set_line_spacing(&mut self, line_spacing: f32) {
        self.paragraph.line_spacing = line_spacing;
        self.recompile();
    }

    /// Attributes for plain text outside every scope.
    pub fn base_attributes(&self) -> StyleAttributes {
        StyleAttributes::plain(self.code_font.clone())
    }

    /// Resolves the attribute set for text under `stack`.
    ///
    /// Starts from the code font and applies each entry outermost first, so
    /// inner scopes override the fields they define. An entry holding
    /// several space-separated classes applies each class in order.
    pub fn resolve<S: AsRef<str>>(&self, stack: &[S]) -> StyleAttributes {
        let mut attrs = self.base_attributes();
        attrs.paragraph = Some(self.paragraph);
        for entry in stack {
            for class in entry.as_ref().split_whitespace() {
                if let Some(style) = self.scopes.get(class) {
                    style.apply_to(&mut attrs);
                }
            }
        }
        attrs
    }

    fn recompile(&mut self) {
        let mut scopes = HashMap::with_capacity(self.stripped.len());
        for (selector, declarations) in self.stripped.iter() {
            let mut style = ScopeStyle::default();
            for (property, value) in declarations {
                match property.as_str() {
                    "color" => style.foreground = Some(Color::parse_css(value)),
                    "background-color" => style.background = Some(Color::parse_css(value)),
                    "font-style" => style.font = Some(self.font_for_style(value)),
                    "font-weight" => style.font = Some(self.font_for_weight(value)),
                    _ => {}
                }
            }
            if !style.is_empty() {
                let name = selector.trim_start_matches('.');
                scopes.insert(name.to_string(), style);
            }
        }
        self.scopes = scopes;
    }

    fn font_for_style(&self, value: &str) -> Font {
        match value.trim().to_ascii_lowercase().as_str() {
            "italic" | "oblique" => self.italic_font.clone(),
            _ => self.code_font.clone(),
        }
    }

    fn font_for_weight(&self, value: &str) -> Font {
        let value = value.trim().to_ascii_lowercase();
        let bold = match value.as_str() {
            "bold" | "bolder" => true,
            numeric => numeric.parse::<u32>().map(|w| w >= 600).unwrap_or(false),
        };
        if bold {
            self.bold_font.clone()
        } else {
            self.code_font.clone()
        }
    }
}

/// Background declarations may carry more than a color (`#fff url(..)`).
fn background_color(value: &str) -> Color {
    match value.find('#') {
        Some(start) => {
            let hex = value[start..]
                .split(|ch: char| ch.is_whitespace())
                .next()
                .unwrap_or_default();
            Color::parse_css(hex)
        }
        None => Color::parse_css(value),
    }
}
