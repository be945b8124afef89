//! Highlighter facade: an engine plus the active theme.

use crate::config::Config;
use crate::constants::BASE_SCOPE;
use crate::engine::HighlightEngine;
use crate::error::HighlightError;
use crate::markup::{parse_markup, AttributedText};
use crate::style::{FamilyFontResolver, Font, FontResolver};
use crate::theme::{Theme, ThemeAssets};
use std::sync::Arc;
use tracing::debug;

/// Produces attributed or HTML output for source text.
///
/// Cloning is cheap; clones share the engine and the current theme until
/// one of them changes its theme or fonts.
#[derive(Clone)]
pub struct Highlighter {
    engine: Arc<dyn HighlightEngine>,
    assets: ThemeAssets,
    theme: Arc<Theme>,
    resolver: Arc<dyn FontResolver>,
}

impl Highlighter {
    /// Builds a highlighter and activates `config.theme`.
    ///
    /// # Errors
    /// Fails when the configured theme cannot be found or read; no
    /// partially initialized highlighter is returned.
    pub fn new(
        engine: Arc<dyn HighlightEngine>,
        assets: ThemeAssets,
        config: &Config,
    ) -> Result<Self, HighlightError> {
        Self::with_font_resolver(engine, assets, config, Arc::new(FamilyFontResolver))
    }

    /// Like [`Highlighter::new`] with a platform font resolver.
    pub fn with_font_resolver(
        engine: Arc<dyn HighlightEngine>,
        assets: ThemeAssets,
        config: &Config,
        resolver: Arc<dyn FontResolver>,
    ) -> Result<Self, HighlightError> {
        let code_font = Font::new(config.font_family.clone(), config.font_size);
        let stylesheet = assets.load(&config.theme)?;
        let theme = Theme::with_font(&stylesheet, code_font, Arc::clone(&resolver));
        debug!(theme = config.theme.as_str(), "highlighter ready");
        Ok(Self {
            engine,
            assets,
            theme: Arc::new(theme),
            resolver,
        })
    }

    /// Builds the syntect engine and theme assets described by `config`.
    #[cfg(feature = "syntect")]
    pub fn from_config(config: &Config) -> Result<Self, HighlightError> {
        let engine = crate::engine::SyntectEngine::from_config(config)?;
        let assets = match config.theme_dir.as_deref() {
            Some(dir) => ThemeAssets::with_dir(dir),
            None => ThemeAssets::bundled(),
        };
        Self::new(Arc::new(engine), assets, config)
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub(crate) fn shared_theme(&self) -> Arc<Theme> {
        Arc::clone(&self.theme)
    }

    pub(crate) fn engine(&self) -> Arc<dyn HighlightEngine> {
        Arc::clone(&self.engine)
    }

    /// Activates the theme called `name`, keeping the current fonts.
    ///
    /// # Errors
    /// Leaves the current theme in place when `name` cannot be loaded.
    pub fn set_theme(&mut self, name: &str) -> Result<(), HighlightError> {
        let stylesheet = self.assets.load(name)?;
        let mut theme = Theme::with_font(
            &stylesheet,
            self.theme.code_font().clone(),
            Arc::clone(&self.resolver),
        );
        theme.set_line_spacing(self.theme.line_spacing());
        self.theme = Arc::new(theme);
        debug!(theme = name, "theme activated");
        Ok(())
    }

    pub fn set_code_font(&mut self, font: Font) {
        Arc::make_mut(&mut self.theme).set_code_font(font);
    }

    pub fn set_fonts(&mut self, code_font: Font, italic: Option<Font>, bold: Option<Font>) {
        Arc::make_mut(&mut self.theme).set_fonts(code_font, italic, bold);
    }

    pub fn set_line_spacing(&mut self, line_spacing: f32) {
        Arc::make_mut(&mut self.theme).set_line_spacing(line_spacing);
    }

    pub fn available_themes(&self) -> Vec<String> {
        self.assets.available_themes()
    }

    pub fn supported_languages(&self) -> Vec<String> {
        self.engine.supported_languages()
    }

    pub fn is_supported_language(&self, language: &str) -> bool {
        self.engine.is_supported_language(language)
    }

    /// Highlights `code` into attribute runs (the fast-render path).
    pub fn highlight(
        &self,
        language: Option<&str>,
        code: &str,
    ) -> Result<AttributedText, HighlightError> {
        let markup = self.engine.highlight_markup(language, code)?;
        parse_markup(&markup, &self.theme)
    }

    /// Highlights `code` into a standalone HTML fragment styled by the
    /// theme's light stylesheet.
    pub fn highlight_html(
        &self,
        language: Option<&str>,
        code: &str,
    ) -> Result<String, HighlightError> {
        let markup = self.engine.highlight_markup(language, code)?;
        Ok(format!(
            "<style>{}</style><pre><code class=\"{}\">{}</code></pre>",
            self.theme.light_stylesheet(),
            BASE_SCOPE,
            markup
        ))
    }
}
