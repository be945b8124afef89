//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_THEME,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for highlightr.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Theme activated at construction.
    pub theme: String,
    /// Extra directory scanned for `*.css` themes.
    pub theme_dir: Option<PathBuf>,
    /// Extra directory of grammar definitions loaded into the engine.
    pub syntax_dir: Option<PathBuf>,
    /// Coalescing delay before a scheduled engine call.
    pub debounce_ms: u64,
    pub font_family: String,
    pub font_size: f32,
    /// Emits per-request trace events when enabled.
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            theme_dir: None,
            syntax_dir: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            trace: false,
        }
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            theme: env_nonempty("HIGHLIGHTR_THEME").unwrap_or(defaults.theme),
            theme_dir: env_nonempty("HIGHLIGHTR_THEME_DIR").map(PathBuf::from),
            syntax_dir: env_nonempty("HIGHLIGHTR_SYNTAX_DIR").map(PathBuf::from),
            debounce_ms: env_nonempty("HIGHLIGHTR_DEBOUNCE_MS")
                .and_then(|ms| ms.parse().ok())
                .unwrap_or(defaults.debounce_ms),
            font_family: env_nonempty("HIGHLIGHTR_FONT_FAMILY").unwrap_or(defaults.font_family),
            font_size: env_nonempty("HIGHLIGHTR_FONT_SIZE")
                .and_then(|size| size.parse().ok())
                .filter(|size: &f32| size.is_finite() && *size > 0.0)
                .unwrap_or(defaults.font_size),
            trace: env_flag_enabled("HIGHLIGHTR_TRACE"),
        }
    }

    /// Coalescing delay as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
