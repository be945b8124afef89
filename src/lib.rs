//! Root crate facade for highlightr.
//!
//! Re-exports the core library so hosts depend on one crate. The `syntect`
//! feature (on by default) enables the bundled grammar engine.

pub use highlightr_core::{
    buffer, config, constants, controller, engine, env, error, highlighter, markup, style, theme,
};
pub use highlightr_core::{
    parse_markup, AttributeRun, AttributedText, Color, Config, EditKind, EditRecord,
    FamilyFontResolver, Font, FontResolver, FontVariant, HighlightController, HighlightEngine,
    HighlightError, HighlightObserver, Highlighter, ParagraphStyle, StyleAttributes, TextBuffer,
    Theme, ThemeAssets, BASE_SCOPE, DEFAULT_DEBOUNCE_MS, DEFAULT_THEME,
};

#[cfg(feature = "syntect")]
pub use highlightr_core::SyntectEngine;
