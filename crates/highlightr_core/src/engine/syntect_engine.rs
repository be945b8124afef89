//! syntect-backed engine emitting hljs-prefixed class markup.

use super::HighlightEngine;
use crate::config::Config;
use crate::constants::SCOPE_CLASS_PREFIX;
use crate::error::HighlightError;
use std::path::Path;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::debug;

/// Engine running syntect grammars in-process.
pub struct SyntectEngine {
    syntaxes: SyntaxSet,
}

impl Default for SyntectEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn normalized_syntax_key(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

fn is_plain_alias(language: &str) -> bool {
    matches!(
        language.to_ascii_lowercase().as_str(),
        "text" | "txt" | "plain" | "plaintext"
    )
}

fn alias_candidates(language_lower: &str) -> &'static [&'static str] {
    match language_lower {
        "cs" | "csharp" => &["C#", "cs"],
        "shell" | "bash" | "sh" | "zsh" => &["Bourne Again Shell (bash)", "bash", "sh"],
        "cpp" | "c++" => &["C++", "cpp", "cc"],
        "objectivec" | "objc" => &["Objective-C", "m"],
        "dockerfile" => &["Dockerfile", "bash", "sh"],
        "makefile" => &["Makefile", "make"],
        "latex" => &["LaTeX", "tex"],
        "javascript" | "js" => &["JavaScript", "js"],
        "python" | "py" => &["Python", "py"],
        "rust" | "rs" => &["Rust", "rs"],
        _ => &[],
    }
}

impl SyntectEngine {
    /// Engine with syntect's bundled grammars.
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Bundled grammars plus every grammar found under `dir`.
    ///
    /// # Errors
    /// [`HighlightError::EngineInit`] when the directory cannot be walked or
    /// a grammar fails to load.
    pub fn with_syntax_dir(dir: &Path) -> Result<Self, HighlightError> {
        let mut builder = SyntaxSet::load_defaults_newlines().into_builder();
        builder.add_from_folder(dir, true).map_err(|err| {
            HighlightError::EngineInit(format!("grammars in {}: {}", dir.display(), err))
        })?;
        let syntaxes = builder.build();
        debug!(
            target: "highlightr::engine",
            grammars = syntaxes.syntaxes().len(),
            "loaded grammar directory"
        );
        Ok(Self { syntaxes })
    }

    /// Engine honoring `config.syntax_dir`.
    pub fn from_config(config: &Config) -> Result<Self, HighlightError> {
        match config.syntax_dir.as_deref() {
            Some(dir) => Self::with_syntax_dir(dir),
            None => Ok(Self::new()),
        }
    }

    fn try_candidate(&self, candidate: &str) -> Option<&SyntaxReference> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(syntax) = self.syntaxes.find_syntax_by_name(trimmed) {
            return Some(syntax);
        }
        if let Some(syntax) = self.syntaxes.find_syntax_by_extension(trimmed) {
            return Some(syntax);
        }
        let normalized = normalized_syntax_key(trimmed);
        self.syntaxes.syntaxes().iter().find(|syntax| {
            syntax.name.eq_ignore_ascii_case(trimmed)
                || (!normalized.is_empty() && normalized_syntax_key(&syntax.name) == normalized)
                || syntax
                    .file_extensions
                    .iter()
                    .any(|ext| ext.eq_ignore_ascii_case(trimmed))
        })
    }

    /// Resolves a language identifier to a grammar.
    ///
    /// # Returns
    /// `None` for identifiers no grammar or alias matches.
    fn resolve(&self, language: &str) -> Option<&SyntaxReference> {
        let trimmed = language.trim();
        if trimmed.is_empty() {
            return None;
        }
        if is_plain_alias(trimmed) {
            return Some(self.syntaxes.find_syntax_plain_text());
        }
        if let Some(syntax) = self.try_candidate(trimmed) {
            return Some(syntax);
        }
        alias_candidates(&trimmed.to_ascii_lowercase())
            .iter()
            .find_map(|candidate| self.try_candidate(candidate))
    }

    fn detect(&self, source: &str) -> &SyntaxReference {
        source
            .lines()
            .next()
            .and_then(|line| self.syntaxes.find_syntax_by_first_line(line))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }
}

impl HighlightEngine for SyntectEngine {
    fn highlight_markup(
        &self,
        language: Option<&str>,
        source: &str,
    ) -> Result<String, HighlightError> {
        let syntax = match language {
            Some(language) => self
                .resolve(language)
                .ok_or_else(|| HighlightError::UnsupportedLanguage(language.to_string()))?,
            None => self.detect(source),
        };
        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntaxes,
            ClassStyle::SpacedPrefixed {
                prefix: SCOPE_CLASS_PREFIX,
            },
        );
        for line in LinesWithEndings::from(source) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }

    fn supported_languages(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .syntaxes
            .syntaxes()
            .iter()
            .map(|syntax| syntax.name.clone())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    fn is_supported_language(&self, language: &str) -> bool {
        self.resolve(language).is_some()
    }
}
