//! Unit tests for the `highlightr` CLI entrypoint module.

use super::{render, render_ansi, resolve_config, theme_assets, Cli, Commands, OutputFormat};
use clap::Parser;
use highlightr_core::env::{env_lock, EnvGuard};
use highlightr_core::{
    AttributeRun, AttributedText, Color, Config, Font, FontVariant, Highlighter, StyleAttributes,
};

fn highlighter() -> Highlighter {
    Highlighter::from_config(&Config::default()).expect("default highlighter")
}

#[test]
fn cli_parses_render_flags() {
    let cli = Cli::try_parse_from(["highlightr", "render", "main.rs", "-l", "rust", "--json"])
        .expect("cli should parse render");
    match cli.command {
        Commands::Render {
            file,
            language,
            html,
            json,
        } => {
            assert_eq!(file.as_deref(), Some(std::path::Path::new("main.rs")));
            assert_eq!(language.as_deref(), Some("rust"));
            assert!(!html);
            assert!(json);
        }
        _ => panic!("expected render command"),
    }
}

#[test]
fn cli_rejects_html_with_json() {
    assert!(Cli::try_parse_from(["highlightr", "render", "--html", "--json"]).is_err());
}

#[test]
fn output_format_prefers_explicit_flags() {
    assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Ansi);
    assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Html);
    assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Json);
}

#[test]
fn flags_override_environment_config() {
    let _lock = env_lock().lock().expect("env lock");
    let _theme = EnvGuard::set("HIGHLIGHTR_THEME", "monokai");
    let _dir = EnvGuard::remove("HIGHLIGHTR_THEME_DIR");

    assert_eq!(resolve_config(None, None).theme, "monokai");
    let config = resolve_config(Some("github".to_string()), Some("/tmp/themes".into()));
    assert_eq!(config.theme, "github");
    assert_eq!(
        config.theme_dir.as_deref(),
        Some(std::path::Path::new("/tmp/themes"))
    );
    assert_eq!(resolve_config(Some("  ".to_string()), None).theme, "monokai");
}

#[test]
fn theme_dir_adds_custom_themes() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("paper.css"), ".hljs{color:#111}").expect("write theme");
    let config = Config {
        theme_dir: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let themes = theme_assets(&config).available_themes();
    assert!(themes.contains(&"paper".to_string()));
    assert!(themes.contains(&"pojoaque".to_string()));
}

#[test]
fn ansi_output_wraps_styled_runs() {
    let plain = StyleAttributes::plain(Font::new("Courier", 14.0));
    let mut bold =
        StyleAttributes::plain(Font::new("Courier", 14.0).with_variant(FontVariant::Bold));
    bold.foreground = Some(Color::RED);
    let text = AttributedText {
        text: "é=1".to_string(),
        runs: vec![
            AttributeRun {
                range: 0..2,
                attributes: plain,
            },
            AttributeRun {
                range: 2..3,
                attributes: bold,
            },
        ],
    };
    assert_eq!(render_ansi(&text), "é=\x1b[1m\x1b[38;2;255;0;0m1\x1b[0m");
}

#[test]
fn render_json_round_trips_source_text() {
    let source = "fn main() { let s = \"<&>\"; }\n";
    let output = render(&highlighter(), Some("rust"), source, OutputFormat::Json)
        .expect("json output should render");
    let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid json");
    assert_eq!(parsed["text"], source);
    assert!(parsed["runs"].as_array().is_some_and(|runs| runs.len() > 1));
}

#[test]
fn render_html_wraps_engine_markup() {
    let output = render(&highlighter(), Some("rust"), "let x = 1;\n", OutputFormat::Html)
        .expect("html output should render");
    assert!(output.starts_with("<style>"));
    assert!(output.contains("<pre><code class=\"hljs\">"));
    assert!(output.contains("hljs-rust"));
}

#[test]
fn render_rejects_unknown_language() {
    let err = render(&highlighter(), Some("klingon"), "x", OutputFormat::Ansi)
        .expect_err("unknown language should fail");
    assert!(err.to_string().contains("klingon"));
}
