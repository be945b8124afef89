//! Bundled and on-disk theme stylesheets.

use crate::error::HighlightError;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const BUNDLED_THEMES: &[(&str, &str)] = &[
    ("github", include_str!("../../themes/github.min.css")),
    ("monokai", include_str!("../../themes/monokai.min.css")),
    ("pojoaque", include_str!("../../themes/pojoaque.min.css")),
];

const THEME_SUFFIXES: &[&str] = &[".min.css", ".css"];

/// Locates theme stylesheets by name.
///
/// Themes in the optional directory shadow bundled themes of the same name.
#[derive(Debug, Clone, Default)]
pub struct ThemeAssets {
    dir: Option<PathBuf>,
}

fn theme_name_from_file(file_name: &str) -> Option<&str> {
    THEME_SUFFIXES
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .filter(|name| !name.is_empty())
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && name != "."
        && name != ".."
}

impl ThemeAssets {
    /// Only the themes compiled into the library.
    pub fn bundled() -> Self {
        Self { dir: None }
    }

    /// Bundled themes plus every `*.css` file in `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Sorted names of every available theme.
    pub fn available_themes(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = BUNDLED_THEMES
            .iter()
            .map(|(name, _)| (*name).to_string())
            .collect();
        if let Some(dir) = self.dir.as_deref() {
            match fs::read_dir(dir) {
                Ok(entries) => {
                    for entry in entries.flatten() {
                        let file_name = entry.file_name();
                        if let Some(name) = file_name.to_str().and_then(theme_name_from_file) {
                            names.insert(name.to_string());
                        }
                    }
                }
                Err(err) => warn!(dir = %dir.display(), "theme directory unreadable: {}", err),
            }
        }
        names.into_iter().collect()
    }

    /// Loads the stylesheet text for `name`.
    ///
    /// # Errors
    /// [`HighlightError::ThemeNotFound`] when no theme has that name and
    /// [`HighlightError::ThemeRead`] when its file cannot be read as UTF-8.
    pub fn load(&self, name: &str) -> Result<String, HighlightError> {
        if !is_plain_name(name) {
            return Err(HighlightError::ThemeNotFound(name.to_string()));
        }
        if let Some(dir) = self.dir.as_deref() {
            for suffix in THEME_SUFFIXES {
                let path = dir.join(format!("{name}{suffix}"));
                if path.is_file() {
                    return fs::read_to_string(&path).map_err(|source| {
                        HighlightError::ThemeRead {
                            name: name.to_string(),
                            source,
                        }
                    });
                }
            }
        }
        BUNDLED_THEMES
            .iter()
            .find(|(bundled, _)| *bundled == name)
            .map(|(_, css)| (*css).to_string())
            .ok_or_else(|| HighlightError::ThemeNotFound(name.to_string()))
    }
}
