//! Rope-backed text storage with a run-length attribute map.

use crate::constants::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE};
use crate::style::{Font, StyleAttributes};
use ropey::Rope;
use serde::Serialize;
use std::ops::Range;

/// One attribute assignment over a character range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRun {
    pub range: Range<usize>,
    pub attributes: StyleAttributes,
}

/// What a buffer mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Characters,
    Attributes,
}

/// Summary of one buffer mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    pub kind: EditKind,
    /// Affected range in the pre-edit buffer.
    pub range: Range<usize>,
    /// Length in characters of what now occupies `range`.
    pub replacement_len: usize,
}

impl EditRecord {
    /// Character delta (`replacement_len - range.len()`).
    pub fn change_in_length(&self) -> isize {
        self.replacement_len as isize - self.range.len() as isize
    }

    /// Affected range in the post-edit buffer.
    pub fn edited_range(&self) -> Range<usize> {
        self.range.start..self.range.start + self.replacement_len
    }
}

/// Ordered, contiguous runs covering `[0, len)`.
#[derive(Debug, Clone, Default)]
struct RunMap {
    runs: Vec<AttributeRun>,
}

impl RunMap {
    /// Ensures a run boundary at `pos` and returns the index of the first
    /// run starting at or after it.
    fn split(&mut self, pos: usize) -> usize {
        let idx = self.runs.partition_point(|run| run.range.end <= pos);
        match self.runs.get(idx) {
            Some(run) if run.range.start < pos => {
                let mut tail = run.clone();
                tail.range.start = pos;
                self.runs[idx].range.end = pos;
                self.runs.insert(idx + 1, tail);
                idx + 1
            }
            _ => idx,
        }
    }

    /// Replaces `range` by `new_len` characters styled with `attributes`
    /// and shifts every following run.
    fn splice(&mut self, range: Range<usize>, new_len: usize, attributes: StyleAttributes) {
        let first = self.split(range.start);
        let last = self.split(range.end);
        self.runs.drain(first..last);
        let removed = range.len();
        if new_len != removed {
            for run in &mut self.runs[first..] {
                run.range.start = run.range.start + new_len - removed;
                run.range.end = run.range.end + new_len - removed;
            }
        }
        if new_len > 0 {
            self.runs.insert(
                first,
                AttributeRun {
                    range: range.start..range.start + new_len,
                    attributes,
                },
            );
            self.merge_at(first + 1);
        }
        self.merge_at(first);
    }

    /// Overlays ascending, non-overlapping `placed` runs on `window` in one
    /// pass. Parts of `window` no run covers keep their attributes.
    fn overlay(&mut self, window: Range<usize>, placed: Vec<AttributeRun>) {
        let first = self.split(window.start);
        let last = self.split(window.end);
        let old = &self.runs[first..last];
        let mut rebuilt: Vec<AttributeRun> = Vec::with_capacity(placed.len() + old.len());
        let mut old_idx = 0;
        let mut cursor = window.start;
        for run in placed {
            fill_gap(&mut rebuilt, old, &mut old_idx, cursor..run.range.start);
            cursor = run.range.end;
            push_merged(&mut rebuilt, run);
        }
        fill_gap(&mut rebuilt, old, &mut old_idx, cursor..window.end);
        let end = first + rebuilt.len();
        self.runs.splice(first..last, rebuilt);
        self.merge_at(end);
        self.merge_at(first);
    }

    /// Merges the runs at `idx - 1` and `idx` when they are adjacent and equal.
    fn merge_at(&mut self, idx: usize) {
        if idx == 0 || idx >= self.runs.len() {
            return;
        }
        let (head, tail) = self.runs.split_at_mut(idx);
        let (prev, next) = (&mut head[idx - 1], &tail[0]);
        if prev.range.end == next.range.start && prev.attributes == next.attributes {
            prev.range.end = next.range.end;
            self.runs.remove(idx);
        }
    }

    fn run_at(&self, index: usize) -> Option<&AttributeRun> {
        let idx = self.runs.partition_point(|run| run.range.end <= index);
        self.runs.get(idx).filter(|run| run.range.contains(&index))
    }
}

/// Copies the pieces of `old` (contiguous, starting at or before
/// `gap.start`) that fall inside `gap`.
fn fill_gap(out: &mut Vec<AttributeRun>, old: &[AttributeRun], idx: &mut usize, gap: Range<usize>) {
    if gap.is_empty() {
        return;
    }
    while *idx < old.len() && old[*idx].range.end <= gap.start {
        *idx += 1;
    }
    let mut at = *idx;
    while let Some(run) = old.get(at).filter(|run| run.range.start < gap.end) {
        push_merged(
            out,
            AttributeRun {
                range: run.range.start.max(gap.start)..run.range.end.min(gap.end),
                attributes: run.attributes.clone(),
            },
        );
        if run.range.end > gap.end {
            break;
        }
        at += 1;
    }
    *idx = at;
}

fn push_merged(out: &mut Vec<AttributeRun>, run: AttributeRun) {
    if let Some(prev) = out.last_mut() {
        if prev.range.end == run.range.start && prev.attributes == run.attributes {
            prev.range.end = run.range.end;
            return;
        }
    }
    out.push(run);
}

/// Editable text with per-character style attributes.
///
/// Offsets are character indices. The attribute map always covers exactly
/// `[0, len_chars)`; adjacent runs with equal attributes are merged.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    runs: RunMap,
    default_attributes: StyleAttributes,
    revision: u64,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new(
            "",
            StyleAttributes::plain(Font::new(DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE)),
        )
    }
}

impl TextBuffer {
    /// Create a buffer whose text is styled with `default_attributes`.
    pub fn new(text: &str, default_attributes: StyleAttributes) -> Self {
        let rope = Rope::from_str(text);
        let mut runs = RunMap::default();
        let len = rope.len_chars();
        if len > 0 {
            runs.runs.push(AttributeRun {
                range: 0..len,
                attributes: default_attributes.clone(),
            });
        }
        Self {
            rope,
            runs,
            default_attributes,
            revision: 0,
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Monotonic mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Whole buffer as UTF-8.
    pub fn string(&self) -> String {
        self.rope.to_string()
    }

    /// Text in `range`, clamped to the buffer.
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    /// Current attribute runs, ordered and contiguous.
    pub fn runs(&self) -> &[AttributeRun] {
        &self.runs.runs
    }

    pub fn default_attributes(&self) -> &StyleAttributes {
        &self.default_attributes
    }

    /// Replaces the attributes given to text inserted into an empty buffer.
    pub fn set_default_attributes(&mut self, attributes: StyleAttributes) {
        self.default_attributes = attributes;
    }

    /// Attributes at `index` with the effective range of their run.
    pub fn attributes_at(&self, index: usize) -> Option<(&StyleAttributes, Range<usize>)> {
        self.runs
            .run_at(index)
            .map(|run| (&run.attributes, run.range.clone()))
    }

    /// Expands `range` to whole paragraphs, line terminators included.
    pub fn paragraph_range(&self, range: Range<usize>) -> Range<usize> {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        let para_start = self.rope.line_to_char(self.rope.char_to_line(start));
        let last = if end > start { end - 1 } else { start };
        let last_line = self.rope.char_to_line(last.min(len));
        let para_end = if last_line + 1 < self.rope.len_lines() {
            self.rope.line_to_char(last_line + 1)
        } else {
            len
        };
        para_start..para_end.max(end)
    }

    /// Replace the characters in `range` with `text`.
    ///
    /// New characters take the attributes of the first replaced character;
    /// for a pure insertion, those of the preceding character, else the
    /// following one, else the buffer default.
    ///
    /// # Returns
    /// The edit record, or `None` when nothing changed.
    pub fn replace_characters(&mut self, range: Range<usize>, text: &str) -> Option<EditRecord> {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        if start == end && text.is_empty() {
            return None;
        }
        let inherited = self.inherited_attributes(start, end);
        let inserted = text.chars().count();
        if start < end {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
        self.runs.splice(start..end, inserted, inherited);
        self.revision = self.revision.wrapping_add(1);
        Some(EditRecord {
            kind: EditKind::Characters,
            range: start..end,
            replacement_len: inserted,
        })
    }

    /// Set `attributes` on `range` without touching characters.
    pub fn set_attributes(
        &mut self,
        range: Range<usize>,
        attributes: StyleAttributes,
    ) -> Option<EditRecord> {
        let len = self.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start >= end {
            return None;
        }
        self.runs.splice(start..end, end - start, attributes);
        self.revision = self.revision.wrapping_add(1);
        Some(EditRecord {
            kind: EditKind::Attributes,
            range: start..end,
            replacement_len: end - start,
        })
    }

    /// Applies run-local `runs` at `origin` as one attribute-only edit.
    ///
    /// Each run is shifted by `origin` and clamped to the buffer; runs left
    /// empty by the clamp are dropped. Runs are expected in ascending order;
    /// any part of a run overlapping an earlier one is ignored. The whole
    /// window is rebuilt in one pass.
    pub fn apply_attribute_runs(
        &mut self,
        origin: usize,
        runs: &[AttributeRun],
    ) -> Option<EditRecord> {
        let len = self.len_chars();
        let mut placed = Vec::with_capacity(runs.len());
        let mut cursor = 0usize;
        for run in runs {
            let start = origin.saturating_add(run.range.start).max(cursor);
            let end = origin.saturating_add(run.range.end).min(len);
            if end <= start {
                continue;
            }
            placed.push(AttributeRun {
                range: start..end,
                attributes: run.attributes.clone(),
            });
            cursor = end;
        }
        let range = placed.first()?.range.start..placed.last()?.range.end;
        self.runs.overlay(range.clone(), placed);
        self.revision = self.revision.wrapping_add(1);
        Some(EditRecord {
            kind: EditKind::Attributes,
            replacement_len: range.len(),
            range,
        })
    }

    fn inherited_attributes(&self, start: usize, end: usize) -> StyleAttributes {
        let source = if start < end {
            Some(start)
        } else if start > 0 {
            Some(start - 1)
        } else if start < self.len_chars() {
            Some(start)
        } else {
            None
        };
        source
            .and_then(|index| self.runs.run_at(index))
            .map(|run| run.attributes.clone())
            .unwrap_or_else(|| self.default_attributes.clone())
    }
}
