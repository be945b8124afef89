//! Conversion of engine markup (`<span class="...">` trees) into attribute runs.

mod entities;

use crate::buffer::AttributeRun;
use crate::constants::BASE_SCOPE;
use crate::error::HighlightError;
use crate::style::StyleAttributes;
use crate::theme::Theme;
use serde::Serialize;

const SPAN_OPEN: &str = "<span class=\"";
const SPAN_OPEN_END: &str = "\">";
const SPAN_CLOSE: &str = "</span>";

/// Plain text plus the attribute runs painting it.
///
/// Runs are ordered, contiguous and cover `[0, len_chars)` exactly. Offsets
/// are character indices into `text`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AttributedText {
    pub text: String,
    pub runs: Vec<AttributeRun>,
}

impl AttributedText {
    pub fn len_chars(&self) -> usize {
        self.runs.last().map(|run| run.range.end).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Run containing character `index`.
    pub fn run_at(&self, index: usize) -> Option<&AttributeRun> {
        let idx = self.runs.partition_point(|run| run.range.end <= index);
        self.runs.get(idx).filter(|run| run.range.contains(&index))
    }
}

/// Accumulates text segments, merging adjacent segments with equal styles.
#[derive(Default)]
struct RunBuilder {
    text: String,
    runs: Vec<AttributeRun>,
    len_chars: usize,
}

impl RunBuilder {
    fn push(&mut self, segment: &str, attrs: &StyleAttributes) {
        if segment.is_empty() {
            return;
        }
        let start = self.len_chars;
        self.len_chars += segment.chars().count();
        self.text.push_str(segment);
        match self.runs.last_mut() {
            Some(last) if last.attributes == *attrs => last.range.end = self.len_chars,
            _ => self.runs.push(AttributeRun {
                range: start..self.len_chars,
                attributes: attrs.clone(),
            }),
        }
    }
}

/// Parses engine markup into attributed text using `theme`'s scope table.
///
/// Text outside every span is styled by the document scope. A `</span>`
/// with no open span is ignored, and a `<` that starts neither tag form is
/// kept as a literal character. HTML entities in the resulting text are
/// decoded and run offsets shifted accordingly.
///
/// # Errors
/// [`HighlightError::Markup`] when an opening span tag is never terminated.
pub fn parse_markup(markup: &str, theme: &Theme) -> Result<AttributedText, HighlightError> {
    let mut builder = RunBuilder::default();
    let mut stack: Vec<&str> = vec![BASE_SCOPE];
    let mut attrs = theme.resolve(&stack);
    let mut pos = 0usize;

    while pos < markup.len() {
        let rest = &markup[pos..];
        let Some(lt) = rest.find('<') else {
            builder.push(rest, &attrs);
            break;
        };
        builder.push(&rest[..lt], &attrs);
        let tag = &rest[lt..];

        if let Some(after_open) = tag.strip_prefix(SPAN_OPEN) {
            let Some(class_len) = after_open.find(SPAN_OPEN_END) else {
                return Err(HighlightError::Markup {
                    offset: pos + lt,
                    reason: "unterminated span tag",
                });
            };
            stack.push(&after_open[..class_len]);
            attrs = theme.resolve(&stack);
            pos += lt + SPAN_OPEN.len() + class_len + SPAN_OPEN_END.len();
        } else if tag.starts_with(SPAN_CLOSE) {
            if stack.len() > 1 {
                stack.pop();
                attrs = theme.resolve(&stack);
            }
            pos += lt + SPAN_CLOSE.len();
        } else {
            builder.push("<", &attrs);
            pos += lt + 1;
        }
    }

    Ok(entities::decode(&builder.text, builder.runs))
}
