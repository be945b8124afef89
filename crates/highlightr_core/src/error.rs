//! Error types for theme loading, engine calls and markup parsing.
use thiserror::Error;

/// Top-level library error type.
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),

    #[error("Theme '{name}' could not be read: {source}")]
    ThemeRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine initialization failed: {0}")]
    EngineInit(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Malformed markup at offset {offset}: {reason}")]
    Markup { offset: usize, reason: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "syntect")]
impl From<syntect::Error> for HighlightError {
    fn from(value: syntect::Error) -> Self {
        Self::Engine(value.to_string())
    }
}
