//! Deterministic engine and observer doubles shared by unit tests.

use crate::controller::HighlightObserver;
use crate::engine::HighlightEngine;
use crate::error::HighlightError;
use crossbeam_channel::{Receiver, Sender};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const TOY_LANGUAGE: &str = "toy";
pub(crate) const WAIT: Duration = Duration::from_secs(5);

/// Engine for the `toy` language: escapes markup characters and wraps each
/// run of ASCII digits in a span of one configurable class.
pub(crate) struct FakeEngine {
    number_class: String,
    failing: AtomicBool,
    calls: AtomicUsize,
    gate: Option<(Sender<()>, Receiver<()>)>,
}

/// Test-side end of a gated [`FakeEngine`].
pub(crate) struct EngineGate {
    pub(crate) entered: Receiver<()>,
    pub(crate) release: Sender<()>,
}

impl EngineGate {
    /// Waits for the engine to start a call, then lets it finish.
    pub(crate) fn pass_one(&self) {
        self.entered.recv_timeout(WAIT).expect("engine call");
        self.release.send(()).expect("release engine");
    }
}

impl FakeEngine {
    pub(crate) fn with_class(number_class: &str) -> Self {
        Self {
            number_class: number_class.to_string(),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub(crate) fn numbers() -> Self {
        Self::with_class("hljs-number")
    }

    pub(crate) fn failing() -> Self {
        let engine = Self::numbers();
        engine.set_failing(true);
        engine
    }

    /// Every call blocks after signalling `entered` until `release` fires.
    pub(crate) fn gated(number_class: &str) -> (Self, EngineGate) {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let mut engine = Self::with_class(number_class);
        engine.gate = Some((entered_tx, release_rx));
        (
            engine,
            EngineGate {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HighlightEngine for FakeEngine {
    fn highlight_markup(
        &self,
        language: Option<&str>,
        source: &str,
    ) -> Result<String, HighlightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((entered, release)) = &self.gate {
            let _ = entered.send(());
            let _ = release.recv();
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(HighlightError::Engine("fake engine failure".to_string()));
        }
        if let Some(language) = language.filter(|lang| *lang != TOY_LANGUAGE) {
            return Err(HighlightError::UnsupportedLanguage(language.to_string()));
        }
        let mut out = String::with_capacity(source.len() * 2);
        let mut in_number = false;
        for ch in source.chars() {
            let digit = ch.is_ascii_digit();
            if digit && !in_number {
                out.push_str(&format!("<span class=\"{}\">", self.number_class));
            } else if !digit && in_number {
                out.push_str("</span>");
            }
            in_number = digit;
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                _ => out.push(ch),
            }
        }
        if in_number {
            out.push_str("</span>");
        }
        Ok(out)
    }

    fn supported_languages(&self) -> Vec<String> {
        vec![TOY_LANGUAGE.to_string()]
    }

    fn is_supported_language(&self, language: &str) -> bool {
        language == TOY_LANGUAGE
    }
}

/// Observer that records every callback and can veto on demand.
#[derive(Clone, Default)]
pub(crate) struct RecordingObserver {
    pub(crate) asked: Arc<Mutex<Vec<Range<usize>>>>,
    pub(crate) reports: Arc<Mutex<Vec<(Range<usize>, bool)>>>,
    pub(crate) veto: Arc<AtomicBool>,
}

impl RecordingObserver {
    pub(crate) fn reports(&self) -> Vec<(Range<usize>, bool)> {
        self.reports.lock().expect("reports lock").clone()
    }

    pub(crate) fn asked(&self) -> Vec<Range<usize>> {
        self.asked.lock().expect("asked lock").clone()
    }

    pub(crate) fn set_veto(&self, veto: bool) {
        self.veto.store(veto, Ordering::SeqCst);
    }
}

impl HighlightObserver for RecordingObserver {
    fn should_highlight(&mut self, range: Range<usize>) -> bool {
        self.asked.lock().expect("asked lock").push(range);
        !self.veto.load(Ordering::SeqCst)
    }

    fn did_highlight(&mut self, range: Range<usize>, success: bool) {
        self.reports
            .lock()
            .expect("reports lock")
            .push((range, success));
    }
}
