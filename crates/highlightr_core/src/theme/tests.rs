//! Theme compilation tests: selectors, merging, colors, fonts and assets.

use super::stylesheet::{light_stylesheet, strip_stylesheet};
use super::*;
use crate::error::HighlightError;
use tempfile::TempDir;

fn fg(theme: &Theme, scope: &str) -> Option<Color> {
    theme.scope_style(scope).and_then(|style| style.foreground)
}

#[test]
fn color_rules_resolve_hex_named_and_fallback() {
    let theme = Theme::new(".foo{color:#FF0000;}.bar{color:red;}.baz{color:nope;}");
    assert_eq!(fg(&theme, "foo"), Some(Color::RED));
    assert_eq!(fg(&theme, "bar"), Some(Color::RED));
    assert_eq!(fg(&theme, "baz"), Some(Color::GRAY));
}

#[test]
fn grouped_selectors_apply_to_each_scope() {
    let theme = Theme::new(".a, .b{color:#00f}.c .d{color:#0f0}");
    for scope in ["a", "b"] {
        assert_eq!(fg(&theme, scope), Some(Color::BLUE), "scope: {scope}");
    }
    for scope in ["c", "d"] {
        assert_eq!(fg(&theme, scope), Some(Color::GREEN), "scope: {scope}");
    }
}

#[test]
fn later_declarations_merge_property_wise() {
    let theme = Theme::new(".a{color:#f00;background-color:#000}.a{color:#00f}");
    let style = theme.scope_style("a").expect("scope a");
    assert_eq!(style.foreground, Some(Color::BLUE));
    assert_eq!(style.background, Some(Color::BLACK));
}

#[test]
fn unrecognized_properties_and_broken_blocks_are_skipped() {
    let theme = Theme::new(
        "/* header */.a{padding:1em;display:block}.b{color}.c{color:#fff}@media print{.d{color:#000}}",
    );
    assert!(theme.scope_style("a").is_none());
    assert!(theme.scope_style("b").is_none());
    assert_eq!(fg(&theme, "c"), Some(Color::WHITE));
    assert_eq!(fg(&theme, "d"), Some(Color::BLACK));
}

#[test]
fn element_qualified_selector_uses_class() {
    let theme = Theme::new("pre code.hljs{color:#000}");
    assert_eq!(fg(&theme, "hljs"), Some(Color::BLACK));
}

#[test]
fn font_weight_and_style_pick_derived_faces() {
    let theme = Theme::new(
        ".b{font-weight:bold}.n{font-weight:700}.l{font-weight:400}.i{font-style:italic}.o{font-style:oblique}",
    );
    let variant = |scope: &str| {
        theme
            .scope_style(scope)
            .and_then(|style| style.font.as_ref())
            .map(|font| font.variant)
    };
    assert_eq!(variant("b"), Some(FontVariant::Bold));
    assert_eq!(variant("n"), Some(FontVariant::Bold));
    assert_eq!(variant("l"), Some(FontVariant::Regular));
    // Italic requests resolve to the oblique face the resolver derives first.
    assert_eq!(variant("i"), Some(FontVariant::Oblique));
    assert_eq!(variant("o"), Some(FontVariant::Oblique));
}

#[test]
fn later_font_property_in_block_wins() {
    let theme =
        Theme::new(".x{font-style:italic;font-weight:bold}.y{font-weight:bold;font-style:italic}");
    let font = |scope: &str| theme.scope_style(scope).and_then(|s| s.font.clone());
    assert_eq!(font("x").map(|f| f.variant), Some(FontVariant::Bold));
    assert_eq!(font("y").map(|f| f.variant), Some(FontVariant::Oblique));
}

#[test]
fn base_background_sets_theme_background_and_is_stripped() {
    let theme = Theme::new(".hljs{background:#181914;color:#dccf8f}.a{background-color:#fff}");
    assert_eq!(theme.background(), Color::rgb(0x18, 0x19, 0x14));
    assert_eq!(theme.light_stylesheet(), ".hljs{color:#dccf8f;}.a{background-color:#fff;}");
}

#[test]
fn background_defaults_to_white() {
    assert_eq!(Theme::new(".a{color:#000}").background(), Color::WHITE);
    assert_eq!(
        Theme::new(".hljs{background-color:black}").background(),
        Color::BLACK
    );
    assert_eq!(
        Theme::new(".hljs{background:#fdf6e3 url(bg.png)}").background(),
        Color::rgb(0xfd, 0xf6, 0xe3)
    );
}

#[test]
fn light_stylesheet_keeps_file_order() {
    let stripped = strip_stylesheet(".b{color:#000}.a{color:#fff;font-weight:bold}");
    assert_eq!(
        light_stylesheet(&stripped),
        ".b{color:#000;}.a{color:#fff;font-weight:bold;}"
    );
}

#[test]
fn resolve_overrides_inner_scopes_and_keeps_base_font() {
    let theme = Theme::new(".a{color:#f00;background-color:#000}.b{color:#00f;font-weight:bold}");
    let attrs = theme.resolve(&["hljs", "a", "b"]);
    assert_eq!(attrs.foreground, Some(Color::BLUE));
    assert_eq!(attrs.background, Some(Color::BLACK));
    assert_eq!(attrs.font.variant, FontVariant::Bold);

    let base = theme.resolve(&["hljs"]);
    assert_eq!(base.foreground, None);
    assert_eq!(base.font, *theme.code_font());
}

#[test]
fn resolve_applies_each_class_of_multi_class_entry() {
    let theme = Theme::new(".hljs-keyword{color:#f00}.hljs-control{font-style:italic}");
    let attrs = theme.resolve(&["hljs", "hljs-keyword hljs-control hljs-rust"]);
    assert_eq!(attrs.foreground, Some(Color::RED));
    assert_eq!(attrs.font.variant, FontVariant::Oblique);
}

#[test]
fn font_change_recompiles_without_reparsing_and_is_idempotent() {
    let mut theme = Theme::new(".k{font-weight:bold;color:#f00}");
    let before = theme.scope_style("k").cloned();
    theme.set_code_font(Font::new("Menlo", 12.0));
    let bold = theme.scope_style("k").and_then(|s| s.font.clone()).expect("bold");
    assert_eq!(bold.family, "Menlo");
    assert_eq!(bold.size, 12.0);
    assert_eq!(bold.variant, FontVariant::Bold);

    let once = theme.scope_style("k").cloned();
    theme.set_code_font(Font::new("Menlo", 12.0));
    assert_eq!(theme.scope_style("k").cloned(), once);
    assert_ne!(before, once);
    assert_eq!(theme.source(), ".k{font-weight:bold;color:#f00}");
}

#[test]
fn explicit_italic_from_other_family_is_replaced() {
    let mut theme = Theme::new(".i{font-style:italic}");
    let code = Font::new("Menlo", 12.0);
    let foreign = Font::new("Times", 12.0).with_variant(FontVariant::Italic);
    theme.set_fonts(code.clone(), Some(foreign), None);
    assert_eq!(theme.italic_font().family, "Menlo");

    let native = code.with_variant(FontVariant::Italic);
    theme.set_fonts(code, Some(native.clone()), None);
    assert_eq!(*theme.italic_font(), native);
}

struct NoFaces;

impl FontResolver for NoFaces {
    fn derive_variant(&self, _base: &Font, _variant: FontVariant) -> Option<Font> {
        None
    }
}

#[test]
fn missing_faces_fall_back_to_code_font() {
    let code = Font::new("Pixel", 9.0);
    let theme = Theme::with_font(".b{font-weight:bold}", code.clone(), Arc::new(NoFaces));
    assert_eq!(*theme.bold_font(), code);
    assert_eq!(*theme.italic_font(), code);
}

#[test]
fn line_spacing_reaches_resolved_paragraph_style() {
    let mut theme = Theme::new(".a{color:#000}");
    theme.set_line_spacing(3.0);
    let attrs = theme.resolve(&["hljs", "a"]);
    assert_eq!(attrs.paragraph.map(|p| p.line_spacing), Some(3.0));
}

#[test]
fn bundled_themes_are_listed_and_compile() {
    let assets = ThemeAssets::bundled();
    let names = assets.available_themes();
    assert_eq!(names, vec!["github", "monokai", "pojoaque"]);
    for name in names {
        let css = assets.load(&name).expect("bundled theme");
        let theme = Theme::new(&css);
        assert!(theme.scope_style("hljs-keyword").is_some(), "theme: {name}");
    }
}

#[test]
fn directory_themes_shadow_bundled_and_strip_suffixes() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("solar.min.css"), ".hljs{color:#000}").expect("write");
    std::fs::write(dir.path().join("github.css"), ".hljs{color:#fff}").expect("write");
    std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

    let assets = ThemeAssets::with_dir(dir.path());
    let names = assets.available_themes();
    assert!(names.contains(&"solar".to_string()));
    assert!(!names.iter().any(|name| name.contains("notes")));
    assert_eq!(names.iter().filter(|name| *name == "github").count(), 1);
    assert_eq!(assets.load("github").expect("shadowed"), ".hljs{color:#fff}");
}

#[test]
fn missing_and_unreadable_themes_error() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("broken.css"), [0xff, 0xfe, 0x00]).expect("write");
    let assets = ThemeAssets::with_dir(dir.path());

    assert!(matches!(
        assets.load("does-not-exist"),
        Err(HighlightError::ThemeNotFound(_))
    ));
    assert!(matches!(
        assets.load("../etc/passwd"),
        Err(HighlightError::ThemeNotFound(_))
    ));
    assert!(matches!(
        assets.load("broken"),
        Err(HighlightError::ThemeRead { .. })
    ));
}
