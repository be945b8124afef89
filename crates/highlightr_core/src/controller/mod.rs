//! Incremental highlighting for a live, editable buffer.
//!
//! Every character edit rehighlights from the start of the edited paragraph
//! to the end of the buffer, since a newly opened comment or string can
//! change lexical state arbitrarily far past the edit. Engine calls run on a
//! background worker; their results are validated and applied only when the
//! host calls [`HighlightController::apply_ready`] (or
//! [`HighlightController::wait_and_apply`]) on its own thread.

mod worker;


use self::worker::{
    spawn_highlight_worker, HighlightJob, HighlightOutcome, HighlightResult, HighlightWorker,
};
use crate::buffer::{EditKind, EditRecord, TextBuffer};
use crate::config::Config;
use crate::error::HighlightError;
use crate::highlighter::Highlighter;
use crate::style::{Font, StyleAttributes};
use crossbeam_channel::RecvTimeoutError;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Host hooks around each highlight pass. Both methods are optional.
pub trait HighlightObserver: Send {
    /// Return `false` to skip highlighting `range`.
    fn should_highlight(&mut self, _range: Range<usize>) -> bool {
        true
    }

    /// Called once per issued pass that was not superseded.
    fn did_highlight(&mut self, _range: Range<usize>, _success: bool) {}
}

/// Owns a [`TextBuffer`] and keeps its attributes in sync with the engine.
///
/// All buffer mutation (host edits and highlight application) happens
/// through `&mut self`, so there is exactly one writer.
pub struct HighlightController {
    buffer: TextBuffer,
    highlighter: Highlighter,
    language: Option<String>,
    observer: Option<Box<dyn HighlightObserver>>,
    current: Arc<AtomicU64>,
    worker: HighlightWorker,
    trace_enabled: bool,
}

impl HighlightController {
    /// Creates a controller over an empty buffer and starts its worker.
    ///
    /// # Errors
    /// Fails when the worker thread cannot be spawned.
    pub fn new(highlighter: Highlighter, config: &Config) -> Result<Self, HighlightError> {
        let current = Arc::new(AtomicU64::new(0));
        let worker = spawn_highlight_worker(
            highlighter.engine(),
            Arc::clone(&current),
            config.debounce(),
            config.trace,
        )?;
        let buffer = TextBuffer::new("", highlighter.theme().base_attributes());
        Ok(Self {
            buffer,
            highlighter,
            language: None,
            observer: None,
            current,
            worker,
            trace_enabled: config.trace,
        })
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn string(&self) -> String {
        self.buffer.string()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    pub fn attributes_at(&self, index: usize) -> Option<(&StyleAttributes, Range<usize>)> {
        self.buffer.attributes_at(index)
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Token of the newest issued request (0 before the first).
    pub fn current_token(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn set_observer(&mut self, observer: Option<Box<dyn HighlightObserver>>) {
        self.observer = observer;
    }

    /// Replaces the characters in `range` with `text` and schedules a
    /// rehighlight of the affected region.
    pub fn replace_characters(&mut self, range: Range<usize>, text: &str) -> Option<EditRecord> {
        let edit = self.buffer.replace_characters(range, text)?;
        self.process_editing(&edit);
        Some(edit)
    }

    /// Sets attributes directly. Attribute edits never trigger highlighting.
    pub fn set_attributes(
        &mut self,
        range: Range<usize>,
        attributes: StyleAttributes,
    ) -> Option<EditRecord> {
        let edit = self.buffer.set_attributes(range, attributes)?;
        self.process_editing(&edit);
        Some(edit)
    }

    /// Sets the language and rehighlights the whole buffer. `None` turns
    /// highlighting off and abandons any pending pass.
    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language.filter(|lang| !lang.is_empty());
        if self.language.is_some() {
            self.rehighlight();
        } else {
            self.current.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// Activates theme `name` and repaints the whole buffer with it.
    ///
    /// # Errors
    /// Leaves the current theme and attributes untouched on failure.
    pub fn set_theme(&mut self, name: &str) -> Result<(), HighlightError> {
        self.highlighter.set_theme(name)?;
        self.theme_changed();
        Ok(())
    }

    pub fn set_code_font(&mut self, font: Font) {
        self.highlighter.set_code_font(font);
        self.theme_changed();
    }

    /// Sets the code font with optional explicit italic and bold faces,
    /// then repaints the whole buffer.
    pub fn set_fonts(&mut self, code_font: Font, italic: Option<Font>, bold: Option<Font>) {
        self.highlighter.set_fonts(code_font, italic, bold);
        self.theme_changed();
    }

    pub fn set_line_spacing(&mut self, line_spacing: f32) {
        self.highlighter.set_line_spacing(line_spacing);
        self.theme_changed();
    }

    /// Schedules a highlight pass over the whole buffer.
    pub fn rehighlight(&mut self) {
        let len = self.buffer.len_chars();
        self.highlight(0..len);
    }

    /// Applies every result the worker has finished so far.
    ///
    /// # Returns
    /// The number of results processed, including rejected ones.
    pub fn apply_ready(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(result) = self.worker.rx.try_recv() {
            self.apply_result(result);
            processed += 1;
        }
        processed
    }

    /// Blocks up to `timeout` for one result, then applies it together with
    /// anything else already finished.
    ///
    /// # Returns
    /// The number of results processed; 0 on timeout.
    pub fn wait_and_apply(&mut self, timeout: Duration) -> usize {
        match self.worker.rx.recv_timeout(timeout) {
            Ok(result) => {
                self.apply_result(result);
                1 + self.apply_ready()
            }
            Err(RecvTimeoutError::Timeout) => 0,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("highlight worker disconnected");
                0
            }
        }
    }

    fn theme_changed(&mut self) {
        self.buffer
            .set_default_attributes(self.highlighter.theme().base_attributes());
        self.rehighlight();
    }

    fn process_editing(&mut self, edit: &EditRecord) {
        if self.language.is_none() || edit.kind != EditKind::Characters {
            return;
        }
        let paragraph = self.buffer.paragraph_range(edit.edited_range());
        if paragraph.is_empty() {
            return;
        }
        self.highlight(paragraph.start..self.buffer.len_chars());
    }

    fn highlight(&mut self, range: Range<usize>) {
        let Some(language) = self.language.clone() else {
            return;
        };
        if range.is_empty() {
            return;
        }
        if let Some(observer) = self.observer.as_mut() {
            if !observer.should_highlight(range.clone()) {
                debug!(target: "highlightr::controller", ?range, "highlight vetoed");
                return;
            }
        }
        let token = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        let job = HighlightJob {
            token,
            range: range.clone(),
            language,
            snapshot: self.buffer.slice(range.clone()),
            theme: self.highlighter.shared_theme(),
            issued: Instant::now(),
        };
        if self.worker.tx.send(job).is_err() {
            warn!("highlight worker is gone; skipping highlight");
            self.notify(range, false);
            return;
        }
        if self.trace_enabled {
            info!(
                target: "highlightr::controller",
                event = "issued",
                token = token,
                start = range.start,
                end = range.end,
                "highlight request issued"
            );
        }
    }

    fn apply_result(&mut self, result: HighlightResult) {
        let HighlightResult {
            token,
            range,
            snapshot,
            outcome,
        } = result;
        if token != self.current_token() {
            self.trace_rejection(token, "superseded");
            return;
        }
        let parsed = match outcome {
            HighlightOutcome::Parsed(parsed) => parsed,
            HighlightOutcome::Failed(err) => {
                debug!(target: "highlightr::controller", token, error = %err, "highlight failed");
                self.notify(range, false);
                return;
            }
        };
        if range.end > self.buffer.len_chars() {
            self.trace_rejection(token, "range_out_of_bounds");
            self.notify(range, false);
            return;
        }
        if self.buffer.slice(range.clone()) != snapshot {
            self.trace_rejection(token, "text_changed");
            self.notify(range, false);
            return;
        }
        if parsed.text != snapshot {
            self.trace_rejection(token, "engine_text_mismatch");
            self.notify(range, false);
            return;
        }
        self.buffer.apply_attribute_runs(range.start, &parsed.runs);
        if self.trace_enabled {
            info!(
                target: "highlightr::controller",
                event = "applied",
                token = token,
                runs = parsed.runs.len(),
                "highlight applied"
            );
        }
        self.notify(range, true);
    }

    fn trace_rejection(&self, token: u64, reason: &'static str) {
        if self.trace_enabled {
            info!(
                target: "highlightr::controller",
                event = "rejected",
                token = token,
                reason = reason,
                "highlight result rejected"
            );
        }
    }

    fn notify(&mut self, range: Range<usize>, success: bool) {
        if let Some(observer) = self.observer.as_mut() {
            observer.did_highlight(range, success);
        }
    }
}
