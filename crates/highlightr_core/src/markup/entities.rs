//! HTML character entity decoding with run offset correction.

use super::AttributedText;
use crate::buffer::AttributeRun;
use tracing::debug;

/// Longest entity body considered (`&` and `;` excluded).
const MAX_ENTITY_LEN: usize = 32;

/// Named entities recognized by the decoder: the markup escapes engines
/// emit plus common typographic names. Anything else stays literal.
fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "middot" => '\u{b7}',
        "bull" => '\u{2022}',
        "times" => '\u{d7}',
        "divide" => '\u{f7}',
        "deg" => '\u{b0}',
        "sect" => '\u{a7}',
        "para" => '\u{b6}',
        "cent" => '\u{a2}',
        "pound" => '\u{a3}',
        "yen" => '\u{a5}',
        "euro" => '\u{20ac}',
        _ => return None,
    };
    Some(ch)
}

fn decode_entity(body: &str) -> Option<char> {
    let Some(numeric) = body.strip_prefix('#') else {
        return named_entity(body);
    };
    let code = match numeric.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => numeric.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

/// Decodes the entity at the start of `s` (which begins with `&`).
///
/// # Returns
/// The decoded character and the entity's length in bytes (all ASCII, so
/// also its length in characters).
fn entity_at(s: &str) -> Option<(char, usize)> {
    let bytes = s.as_bytes();
    let mut idx = 1;
    if bytes.get(idx) == Some(&b'#') {
        idx += 1;
    }
    let body_start = idx;
    while idx < bytes.len() && idx <= MAX_ENTITY_LEN && bytes[idx].is_ascii_alphanumeric() {
        idx += 1;
    }
    if idx == body_start || bytes.get(idx) != Some(&b';') {
        return None;
    }
    let decoded = decode_entity(&s[1..idx]);
    if decoded.is_none() {
        debug!(target: "highlightr::markup", entity = &s[..=idx], "unknown entity left undecoded");
    }
    decoded.map(|ch| (ch, idx + 1))
}

/// Replaces every decodable entity in `text` and remaps `runs` onto the
/// decoded text in a single forward pass.
pub(super) fn decode(text: &str, runs: Vec<AttributeRun>) -> AttributedText {
    let mut decoded = String::with_capacity(text.len());
    // (start, len) of each replaced entity, in original character offsets.
    let mut replaced: Vec<(usize, usize)> = Vec::new();
    let mut char_pos = 0usize;
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        let head = &rest[..amp];
        decoded.push_str(head);
        char_pos += head.chars().count();
        let candidate = &rest[amp..];
        match entity_at(candidate) {
            Some((ch, len)) => {
                decoded.push(ch);
                replaced.push((char_pos, len));
                char_pos += len;
                rest = &candidate[len..];
            }
            None => {
                decoded.push('&');
                char_pos += 1;
                rest = &candidate[1..];
            }
        }
    }
    decoded.push_str(rest);

    if replaced.is_empty() {
        return AttributedText {
            text: decoded,
            runs,
        };
    }

    let mut remapper = OffsetRemapper {
        replaced: &replaced,
        next: 0,
        shift: 0,
    };
    let mut out: Vec<AttributeRun> = Vec::with_capacity(runs.len());
    for run in runs {
        let start = remapper.map(run.range.start);
        let end = remapper.map(run.range.end);
        if end <= start {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.range.end == start && last.attributes == run.attributes => {
                last.range.end = end;
            }
            _ => out.push(AttributeRun {
                range: start..end,
                attributes: run.attributes,
            }),
        }
    }

    AttributedText {
        text: decoded,
        runs: out,
    }
}

/// Maps ascending original offsets to decoded offsets.
struct OffsetRemapper<'a> {
    replaced: &'a [(usize, usize)],
    next: usize,
    shift: usize,
}

impl OffsetRemapper<'_> {
    fn map(&mut self, pos: usize) -> usize {
        while let Some(&(start, len)) = self.replaced.get(self.next) {
            if start + len <= pos {
                self.shift += len - 1;
                self.next += 1;
            } else if start < pos {
                // Boundary inside an entity snaps to the entity's start.
                return start - self.shift;
            } else {
                break;
            }
        }
        pos - self.shift
    }
}

#[cfg(test)]
mod tests {
    use super::entity_at;

    #[test]
    fn well_formed_entities_decode_or_stay_literal() {
        assert_eq!(entity_at("&hellip; rest"), Some(('\u{2026}', 8)));
        assert_eq!(entity_at("&#x41;"), Some(('A', 6)));
        assert_eq!(entity_at("&#39;"), Some(('\'', 5)));
        assert_eq!(entity_at("&frobnicate;"), None);
        assert_eq!(entity_at("&#xZZ;"), None);
        assert_eq!(entity_at("& amp;"), None);
        assert_eq!(entity_at("&amp"), None);
    }
}
