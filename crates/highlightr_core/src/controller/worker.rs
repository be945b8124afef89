//! Background engine worker: debounce, staleness pre-check, engine call and
//! markup parsing, all off the buffer's mutation path.

use crate::constants::WORKER_THREAD_NAME;
use crate::engine::HighlightEngine;
use crate::error::HighlightError;
use crate::markup::{parse_markup, AttributedText};
use crate::theme::Theme;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// One scheduled highlight pass over a snapshot of the buffer.
pub(crate) struct HighlightJob {
    pub(crate) token: u64,
    pub(crate) range: Range<usize>,
    pub(crate) language: String,
    pub(crate) snapshot: String,
    pub(crate) theme: Arc<Theme>,
    pub(crate) issued: Instant,
}

pub(crate) enum HighlightOutcome {
    Parsed(AttributedText),
    Failed(HighlightError),
}

/// Worker reply, applied back on the mutation path.
pub(crate) struct HighlightResult {
    pub(crate) token: u64,
    pub(crate) range: Range<usize>,
    pub(crate) snapshot: String,
    pub(crate) outcome: HighlightOutcome,
}

/// Channel endpoints of a running worker. Dropping it disconnects the job
/// channel, which ends the worker thread after its current pass.
pub(crate) struct HighlightWorker {
    pub(crate) tx: Sender<HighlightJob>,
    pub(crate) rx: Receiver<HighlightResult>,
}

/// Spawns the worker thread.
///
/// `current` is the controller's token; jobs whose token is no longer
/// current once their debounce elapses never reach the engine.
pub(crate) fn spawn_highlight_worker(
    engine: Arc<dyn HighlightEngine>,
    current: Arc<AtomicU64>,
    debounce: Duration,
    trace_enabled: bool,
) -> Result<HighlightWorker, HighlightError> {
    let (tx, rx_cmd) = crossbeam_channel::unbounded::<HighlightJob>();
    let (tx_evt, rx_evt) = crossbeam_channel::unbounded();

    thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            for job in rx_cmd.iter() {
                let mut latest = job;
                // Only the newest backlog entry can still be current.
                while let Ok(next) = rx_cmd.try_recv() {
                    latest = next;
                }
                let Some(latest) = settle(&rx_cmd, latest, debounce) else {
                    break;
                };
                if latest.token != current.load(Ordering::Acquire) {
                    if trace_enabled {
                        info!(
                            target: "highlightr::worker",
                            event = "stale_skip",
                            token = latest.token,
                            "highlight job superseded before engine call"
                        );
                    }
                    continue;
                }
                let started = Instant::now();
                let token = latest.token;
                let snapshot_len = latest.snapshot.len();
                let result = run_job(engine.as_ref(), latest);
                let success = matches!(result.outcome, HighlightOutcome::Parsed(_));
                if tx_evt.send(result).is_err() {
                    break;
                }
                if trace_enabled {
                    let elapsed_ms = started.elapsed().as_secs_f32() * 1000.0;
                    info!(
                        target: "highlightr::worker",
                        event = "worker_done",
                        token = token,
                        text_len = snapshot_len,
                        success = success,
                        elapsed_ms = elapsed_ms,
                        "highlight worker pass"
                    );
                }
            }
        })?;

    Ok(HighlightWorker { tx, rx: rx_evt })
}

/// Holds `job` until its debounce deadline, adopting any newer job that
/// arrives meanwhile. Returns `None` once the controller is gone.
fn settle(
    rx: &Receiver<HighlightJob>,
    mut job: HighlightJob,
    debounce: Duration,
) -> Option<HighlightJob> {
    loop {
        let deadline = job.issued + debounce;
        if Instant::now() >= deadline {
            return Some(job);
        }
        match rx.recv_deadline(deadline) {
            Ok(next) => job = next,
            Err(RecvTimeoutError::Timeout) => return Some(job),
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
}

fn run_job(engine: &dyn HighlightEngine, job: HighlightJob) -> HighlightResult {
    let outcome = match engine
        .highlight_markup(Some(&job.language), &job.snapshot)
        .and_then(|markup| parse_markup(&markup, &job.theme))
    {
        Ok(parsed) => HighlightOutcome::Parsed(parsed),
        Err(err) => HighlightOutcome::Failed(err),
    };
    HighlightResult {
        token: job.token,
        range: job.range,
        snapshot: job.snapshot,
        outcome,
    }
}
