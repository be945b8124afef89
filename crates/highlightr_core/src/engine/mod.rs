//! Highlight engine abstraction.
//!
//! An engine turns source text into tagged markup: literal text with nested
//! `<span class="scope">...</span>` markers and HTML-escaped `&`, `<`, `>`.
//! Everything downstream (markup parsing, buffer painting) only sees that
//! string, so engines are interchangeable and tests can use a fake.

#[cfg(feature = "syntect")]
mod syntect_engine;

#[cfg(feature = "syntect")]
pub use syntect_engine::SyntectEngine;

use crate::error::HighlightError;

/// Source-to-markup highlighting capability.
pub trait HighlightEngine: Send + Sync {
    /// Highlights `source` as `language`; `None` asks the engine to detect
    /// the language itself.
    ///
    /// # Errors
    /// Unknown languages and grammar failures are reported as errors; the
    /// caller decides whether they are fatal.
    fn highlight_markup(
        &self,
        language: Option<&str>,
        source: &str,
    ) -> Result<String, HighlightError>;

    /// Identifiers accepted by [`HighlightEngine::highlight_markup`].
    fn supported_languages(&self) -> Vec<String>;

    fn is_supported_language(&self, language: &str) -> bool;
}
