//! Core library for highlightr (themes, markup parsing, incremental highlighting).

/// Rope-backed text storage with run-length attribute maps.
pub mod buffer;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Background highlight scheduling against a live buffer.
pub mod controller;
/// Highlight engine abstraction and the syntect-backed implementation.
pub mod engine;
/// Environment mutation helpers used by tests.
pub mod env;
/// Library error types.
pub mod error;
/// Highlighter facade combining an engine with the active theme.
pub mod highlighter;
/// Tagged markup to attribute run conversion.
pub mod markup;
/// Colors, fonts and resolved style attributes.
pub mod style;
/// Stylesheet compilation and bundled theme assets.
pub mod theme;

#[cfg(test)]
pub(crate) mod test_support;

pub use buffer::{AttributeRun, EditKind, EditRecord, TextBuffer};
pub use config::Config;
pub use constants::{BASE_SCOPE, DEFAULT_DEBOUNCE_MS, DEFAULT_THEME};
pub use controller::{HighlightController, HighlightObserver};
pub use engine::HighlightEngine;
#[cfg(feature = "syntect")]
pub use engine::SyntectEngine;
pub use error::HighlightError;
pub use highlighter::Highlighter;
pub use markup::{parse_markup, AttributedText};
pub use style::{
    Color, FamilyFontResolver, Font, FontResolver, FontVariant, ParagraphStyle, StyleAttributes,
};
pub use theme::{Theme, ThemeAssets};
