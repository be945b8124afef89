//! Command-line front end: highlight files to the terminal, HTML or JSON.

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use highlightr_core::{
    AttributedText, Config, FontVariant, HighlightEngine, Highlighter, SyntectEngine, ThemeAssets,
};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "highlightr", about = "Syntax highlighting with CSS themes", version)]
struct Cli {
    /// Theme name (can also be set via HIGHLIGHTR_THEME env var)
    #[arg(short, long, global = true, env = "HIGHLIGHTR_THEME")]
    theme: Option<String>,

    /// Extra directory of `.css` themes (HIGHLIGHTR_THEME_DIR)
    #[arg(long, global = true, env = "HIGHLIGHTR_THEME_DIR")]
    theme_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Highlight a file (or stdin) and print it
    Render {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Language identifier; detected from the first line when omitted
        #[arg(short, long)]
        language: Option<String>,
        /// Emit an HTML fragment styled by the theme
        #[arg(long, conflicts_with = "json")]
        html: bool,
        /// Emit the decoded text and attribute runs as JSON
        #[arg(long)]
        json: bool,
    },
    /// List supported language identifiers
    Languages,
    /// List available theme names
    Themes,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Ansi,
    Html,
    Json,
}

impl OutputFormat {
    fn from_flags(html: bool, json: bool) -> Self {
        match (html, json) {
            (true, _) => Self::Html,
            (_, true) => Self::Json,
            _ => Self::Ansi,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("highlightr=warn,highlightr_core=warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Environment config with command-line overrides applied.
fn resolve_config(theme: Option<String>, theme_dir: Option<PathBuf>) -> Config {
    let mut config = Config::from_env();
    if let Some(theme) = theme.filter(|name| !name.trim().is_empty()) {
        config.theme = theme;
    }
    if theme_dir.is_some() {
        config.theme_dir = theme_dir;
    }
    config
}

fn theme_assets(config: &Config) -> ThemeAssets {
    match config.theme_dir.as_deref() {
        Some(dir) => ThemeAssets::with_dir(dir),
        None => ThemeAssets::bundled(),
    }
}

fn read_source(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read stdin")?;
            Ok(source)
        }
    }
}

/// Renders runs as 24-bit ANSI escapes, resetting after every run.
fn render_ansi(text: &AttributedText) -> String {
    let mut offsets: Vec<usize> = text.text.char_indices().map(|(idx, _)| idx).collect();
    offsets.push(text.text.len());
    let mut out = String::with_capacity(text.text.len() * 2);
    for run in &text.runs {
        let (Some(&start), Some(&end)) = (offsets.get(run.range.start), offsets.get(run.range.end))
        else {
            continue;
        };
        let attrs = &run.attributes;
        let mut styled = false;
        match attrs.font.variant {
            FontVariant::Bold => {
                out.push_str("\x1b[1m");
                styled = true;
            }
            FontVariant::Italic | FontVariant::Oblique => {
                out.push_str("\x1b[3m");
                styled = true;
            }
            FontVariant::Regular => {}
        }
        if let Some(color) = attrs.foreground {
            out.push_str(&format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b));
            styled = true;
        }
        out.push_str(&text.text[start..end]);
        if styled {
            out.push_str("\x1b[0m");
        }
    }
    out
}

fn render(
    highlighter: &Highlighter,
    language: Option<&str>,
    source: &str,
    format: OutputFormat,
) -> Result<String> {
    if let Some(language) = language {
        if !highlighter.is_supported_language(language) {
            bail!("unsupported language '{}' (see `highlightr languages`)", language);
        }
    }
    let output = match format {
        OutputFormat::Html => highlighter.highlight_html(language, source)?,
        OutputFormat::Json => {
            let text = highlighter.highlight(language, source)?;
            serde_json::to_string_pretty(&text).context("failed to encode runs")?
        }
        OutputFormat::Ansi => render_ansi(&highlighter.highlight(language, source)?),
    };
    Ok(output)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = resolve_config(cli.theme, cli.theme_dir);
    debug!(theme = config.theme.as_str(), "resolved config");

    let mut stdout = io::stdout().lock();
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "highlightr", &mut stdout);
        }
        Commands::Themes => {
            for name in theme_assets(&config).available_themes() {
                writeln!(stdout, "{}", name)?;
            }
        }
        Commands::Languages => {
            let engine = SyntectEngine::from_config(&config)?;
            for language in engine.supported_languages() {
                writeln!(stdout, "{}", language)?;
            }
        }
        Commands::Render {
            file,
            language,
            html,
            json,
        } => {
            let highlighter = Highlighter::from_config(&config)
                .with_context(|| format!("failed to load theme '{}'", config.theme))?;
            let source = read_source(file.as_ref())?;
            let format = OutputFormat::from_flags(html, json);
            let output = render(&highlighter, language.as_deref(), &source, format)?;
            stdout.write_all(output.as_bytes())?;
            if format != OutputFormat::Ansi {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
