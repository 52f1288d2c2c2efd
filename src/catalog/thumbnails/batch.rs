use std::fmt;
use std::path::PathBuf;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Receiver, RecvTimeoutError, Sender},
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::ThumbnailRef;
use super::cache::ThumbnailCache;
use super::capture::FrameCapture;
use crate::catalog::item::IdentityKey;

/// Default offset into playback for captured frames.
pub const DEFAULT_CAPTURE_OFFSET: Duration = Duration::from_secs(1);
/// Default number of capture worker threads.
pub const DEFAULT_CAPTURE_WORKERS: usize = 4;

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How video frames are captured and where they are stored.
#[derive(Clone)]
pub struct CapturePlan {
    pub capture: Arc<dyn FrameCapture>,
    pub cache: ThumbnailCache,
    pub offset: Duration,
    pub workers: usize,
}

impl CapturePlan {
    pub fn new(capture: Arc<dyn FrameCapture>, cache: ThumbnailCache) -> Self {
        Self {
            capture,
            cache,
            offset: DEFAULT_CAPTURE_OFFSET,
            workers: DEFAULT_CAPTURE_WORKERS,
        }
    }

    pub fn with_offset(mut self, offset: Duration) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

impl fmt::Debug for CapturePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturePlan")
            .field("cache", &self.cache)
            .field("offset", &self.offset)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

/// Result of one capture job, applied to the item with `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub key: IdentityKey,
    /// Captured frame, or the video placeholder when the capture failed.
    pub thumbnail: ThumbnailRef,
    pub failed: bool,
}

struct CaptureJob {
    key: IdentityKey,
    full_path: String,
    source: PathBuf,
}

#[derive(Clone)]
struct WorkerContext {
    capture: Arc<dyn FrameCapture>,
    cache: ThumbnailCache,
    offset: Duration,
    abandoned: Arc<AtomicBool>,
}

/// Pool of capture workers fed while enumeration is still running.
///
/// Jobs start as soon as they are submitted; [`CaptureBatch::join`] waits for
/// all of them. Dropping an unjoined batch abandons jobs that have not started.
pub struct CaptureBatch {
    sender: Option<Sender<CaptureJob>>,
    results: Receiver<CaptureOutcome>,
    inline_results: Option<Sender<CaptureOutcome>>,
    workers: Vec<JoinHandle<()>>,
    context: WorkerContext,
    submitted: usize,
}

impl CaptureBatch {
    /// Spawn the worker threads described by `plan`.
    pub fn start(plan: CapturePlan) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<CaptureJob>();
        let (result_tx, result_rx) = mpsc::channel();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let context = WorkerContext {
            capture: plan.capture,
            cache: plan.cache,
            offset: plan.offset,
            abandoned: Arc::new(AtomicBool::new(false)),
        };

        let mut workers = Vec::with_capacity(plan.workers);
        for index in 0..plan.workers.max(1) {
            let jobs = Arc::clone(&job_rx);
            let results = result_tx.clone();
            let worker_context = context.clone();
            let spawned = thread::Builder::new()
                .name(format!("mediashelf-capture-{index}"))
                .spawn(move || worker_loop(&jobs, &results, &worker_context));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => warn!(error = %err, "Failed to spawn capture worker"),
            }
        }

        Self {
            sender: (!workers.is_empty()).then_some(job_tx),
            results: result_rx,
            inline_results: Some(result_tx),
            workers,
            context,
            submitted: 0,
        }
    }

    /// Queue a capture for the item at `full_path` from the video at `source`.
    pub fn submit(&mut self, key: IdentityKey, full_path: String, source: PathBuf) {
        self.submitted += 1;
        let job = CaptureJob {
            key,
            full_path,
            source,
        };
        let job = match self.sender.as_ref() {
            Some(sender) => match sender.send(job) {
                Ok(()) => return,
                Err(mpsc::SendError(job)) => job,
            },
            None => job,
        };
        // No live workers; capture on the calling thread instead.
        let outcome = run_job(&self.context, job);
        if let Some(results) = self.inline_results.as_ref() {
            let _ = results.send(outcome);
        }
    }

    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Skip every job that has not started yet.
    pub fn abandon(&self) {
        self.context.abandoned.store(true, Ordering::Relaxed);
    }

    /// Wait for all workers and collect the outcomes of completed jobs.
    pub fn join(self) -> Vec<CaptureOutcome> {
        self.join_or_cancel(None)
    }

    /// Like [`CaptureBatch::join`], abandoning queued jobs as soon as `cancel`
    /// is set. Jobs already running still finish.
    pub fn join_or_cancel(mut self, cancel: Option<&AtomicBool>) -> Vec<CaptureOutcome> {
        self.sender.take();
        self.inline_results.take();
        let mut outcomes = Vec::new();
        loop {
            if cancel.is_some_and(|cancel| cancel.load(Ordering::Relaxed)) {
                self.abandon();
            }
            match self.results.recv_timeout(JOIN_POLL_INTERVAL) {
                Ok(outcome) => outcomes.push(outcome),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.shutdown();
        outcomes
    }

    fn shutdown(&mut self) {
        self.sender.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("Capture worker panicked");
            }
        }
    }
}

impl Drop for CaptureBatch {
    fn drop(&mut self) {
        if self.sender.is_some() || !self.workers.is_empty() {
            self.abandon();
            self.shutdown();
        }
    }
}

impl fmt::Debug for CaptureBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureBatch")
            .field("workers", &self.workers.len())
            .field("submitted", &self.submitted)
            .finish_non_exhaustive()
    }
}

fn worker_loop(
    jobs: &Mutex<Receiver<CaptureJob>>,
    results: &Sender<CaptureOutcome>,
    context: &WorkerContext,
) {
    loop {
        let job = {
            let Ok(receiver) = jobs.lock() else {
                return;
            };
            match receiver.recv() {
                Ok(job) => job,
                Err(_) => return,
            }
        };
        if context.abandoned.load(Ordering::Relaxed) {
            debug!(item = %job.full_path, "Skipping abandoned frame capture");
            continue;
        }
        if results.send(run_job(context, job)).is_err() {
            return;
        }
    }
}

fn run_job(context: &WorkerContext, job: CaptureJob) -> CaptureOutcome {
    let stored = context
        .capture
        .capture_frame(&job.source, context.offset)
        .and_then(|frame| context.cache.store_frame(&job.full_path, frame));
    match stored {
        Ok(path) => {
            debug!(item = %job.full_path, thumbnail = %path.display(), "Captured video frame");
            CaptureOutcome {
                key: job.key,
                thumbnail: ThumbnailRef::from_path(&path),
                failed: false,
            }
        }
        Err(err) => {
            warn!(
                item = %job.full_path,
                video = %job.source.display(),
                error = %err,
                "Frame capture failed; using placeholder"
            );
            CaptureOutcome {
                key: job.key,
                thumbnail: ThumbnailRef::video_placeholder(),
                failed: true,
            }
        }
    }
}
