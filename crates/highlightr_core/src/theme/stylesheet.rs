//! Parsing of hljs-style stylesheets into per-scope declaration tables.

use crate::constants::BASE_SCOPE;
use indexmap::IndexMap;

/// Property name to raw value, in declaration order.
pub(crate) type Declarations = IndexMap<String, String>;

/// Selector class (with its leading dot) to merged declarations.
pub(crate) type StrippedTheme = IndexMap<String, Declarations>;

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn is_scope_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

/// Extracts `.class` names from a selector list.
///
/// Selectors are split on commas and whitespace; each token contributes the
/// class after its last dot (`pre code.hljs` yields `.hljs`). Tokens with
/// pseudo-classes, attribute selectors or no class at all are skipped.
fn selector_scopes(selector: &str) -> Vec<String> {
    selector
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter_map(|token| {
            let dot = token.rfind('.')?;
            let name = &token[dot + 1..];
            if name.is_empty() || !name.chars().all(is_scope_char) {
                return None;
            }
            Some(format!(".{name}"))
        })
        .collect()
}

fn parse_declarations(body: &str) -> Declarations {
    let mut declarations = Declarations::new();
    for pair in body.split(';') {
        let Some((property, value)) = pair.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim();
        if property.is_empty() || value.is_empty() {
            continue;
        }
        declarations.shift_remove(&property);
        declarations.insert(property, value.to_string());
    }
    declarations
}

/// Parses every `selector { declarations }` block of `css`.
///
/// A selector naming several classes applies its declarations to each of
/// them. Repeated declarations for a class merge property-wise; the last one
/// in file order wins and moves to the end of the class's declaration list.
/// Blocks without a usable class or declaration are skipped.
pub(crate) fn strip_stylesheet(css: &str) -> StrippedTheme {
    let css = strip_comments(css);
    let mut theme = StrippedTheme::new();
    let mut rest = css.as_str();

    while let Some(open) = rest.find('{') {
        let selector = rest[..open].rsplit(['}', ';']).next().unwrap_or_default();
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let body = &after[..close];
        if body.contains('{') {
            // Group rule such as `@media`: descend into its blocks.
            rest = after;
            continue;
        }
        rest = &after[close + 1..];

        let declarations = parse_declarations(body);
        if declarations.is_empty() {
            continue;
        }
        for scope in selector_scopes(selector) {
            let merged = theme.entry(scope).or_default();
            for (property, value) in &declarations {
                merged.shift_remove(property);
                merged.insert(property.clone(), value.clone());
            }
        }
    }
    theme
}

fn is_base_background(selector: &str, property: &str) -> bool {
    selector.strip_prefix('.') == Some(BASE_SCOPE)
        && (property == "background" || property == "background-color")
}

/// Re-serializes a stripped theme without the document scope's background.
pub(crate) fn light_stylesheet(theme: &StrippedTheme) -> String {
    let mut out = String::new();
    for (selector, declarations) in theme {
        out.push_str(selector);
        out.push('{');
        for (property, value) in declarations {
            if is_base_background(selector, property) {
                continue;
            }
            out.push_str(property);
            out.push(':');
            out.push_str(value);
            out.push(';');
        }
        out.push('}');
    }
    out
}

/// Raw background value declared on the document scope, if any.
pub(crate) fn base_background(theme: &StrippedTheme) -> Option<&str> {
    let base = theme.get(format!(".{BASE_SCOPE}").as_str())?;
    base.get("background")
        .or_else(|| base.get("background-color"))
        .map(String::as_str)
}
