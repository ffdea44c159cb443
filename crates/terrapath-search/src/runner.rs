//! Running a [`SearchEngine`] on a worker thread.
//!
//! [`PathSearch`] owns one episode. `run` moves the engine onto a named
//! worker thread that checks a [`CancelToken`] once per iteration. The
//! outcome is delivered exactly once, either through a callback or a
//! one-slot [`Completion`] channel. A cancelled worker delivers nothing.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use log::{debug, warn};
use terrapath_core::{CancelToken, CostField, Point};

use crate::config::SearchConfig;
use crate::engine::SearchEngine;
use crate::error::{Result, SearchError};
use crate::outcome::PathOutcome;
use crate::snapshot::{SearchSnapshot, SnapshotSlot};
use crate::traits::SpeedMap;

const WORKER_NAME: &str = "terrapath-search";

/// Receiving end of a search started with [`PathSearch::run`].
#[derive(Debug)]
pub struct Completion {
    rx: Receiver<Result<PathOutcome>>,
}

impl Completion {
    /// Block until the worker finishes. Returns `None` if the search was
    /// cancelled (or the worker died) before producing an outcome.
    pub fn wait(self) -> Option<Result<PathOutcome>> {
        self.rx.recv().ok()
    }

    /// Non-blocking check. The outcome is handed out once; later calls
    /// return `None`.
    pub fn try_wait(&self) -> Option<Result<PathOutcome>> {
        self.rx.try_recv().ok()
    }
}

/// One start→end query executed off the calling thread.
pub struct PathSearch<M = CostField> {
    start: Point,
    end: Point,
    engine: Option<SearchEngine<M>>,
    cancel: CancelToken,
    snapshots: SnapshotSlot,
    worker: Option<JoinHandle<()>>,
    stack_size: Option<usize>,
}

impl<M: SpeedMap + Send + 'static> PathSearch<M> {
    /// Prepare a search with the default configuration.
    pub fn new(start: Point, end: Point, map: M) -> Result<Self> {
        Self::with_config(start, end, map, SearchConfig::default())
    }

    /// Prepare a search. Fails only for out-of-bounds endpoints.
    pub fn with_config(start: Point, end: Point, map: M, config: SearchConfig) -> Result<Self> {
        SearchEngine::with_config(start, end, map, config).map(Self::from_engine)
    }

    /// Wrap an engine that has not been driven yet.
    pub fn from_engine(engine: SearchEngine<M>) -> Self {
        Self {
            start: engine.start(),
            end: engine.end(),
            engine: Some(engine),
            cancel: CancelToken::new(),
            snapshots: SnapshotSlot::new(),
            worker: None,
            stack_size: None,
        }
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.end
    }

    /// Stack size for the worker thread; `None` uses the platform default.
    pub fn set_stack_size(&mut self, bytes: Option<usize>) {
        self.stack_size = bytes;
    }

    /// Start the worker and return a handle that resolves once.
    pub fn run(&mut self) -> Result<Completion> {
        let (tx, rx) = mpsc::sync_channel(1);
        self.run_with(move |result| {
            // The receiver may already be gone; nobody is waiting then.
            let _ = tx.send(result);
        })?;
        Ok(Completion { rx })
    }

    /// Start the worker; `on_complete` is invoked on the worker thread with
    /// the outcome, unless the search is cancelled first.
    ///
    /// If the thread cannot be spawned the engine stays here and `run` may
    /// be retried.
    pub fn run_with<F>(&mut self, on_complete: F) -> Result<()>
    where
        F: FnOnce(Result<PathOutcome>) + Send + 'static,
    {
        if self.engine.is_none() {
            warn!(
                "search {} -> {} was started twice; ignoring",
                self.start, self.end
            );
            return Err(SearchError::AlreadyStarted);
        }
        let cancel = self.cancel.clone();
        let snapshots = self.snapshots.clone();

        // The engine is handed over only once the thread exists.
        let (handoff, inbox) = mpsc::channel::<SearchEngine<M>>();
        let mut builder = thread::Builder::new().name(WORKER_NAME.into());
        if let Some(bytes) = self.stack_size {
            builder = builder.stack_size(bytes);
        }
        let handle = builder
            .spawn(move || {
                let Ok(engine) = inbox.recv() else {
                    return;
                };
                if let Some(result) = drive(engine, &cancel, &snapshots) {
                    on_complete(result);
                }
            })
            .inspect_err(|e| {
                warn!(
                    "search {} -> {}: could not spawn worker: {e}",
                    self.start, self.end
                )
            })?;

        if let Some(engine) = self.engine.take() {
            if let Err(mpsc::SendError(engine)) = handoff.send(engine) {
                self.engine = Some(engine);
                return Err(SearchError::Invariant(
                    "search worker exited before receiving its engine".into(),
                ));
            }
        }
        debug!("search {} -> {} started on worker", self.start, self.end);
        self.worker = Some(handle);
        Ok(())
    }

    /// Ask the worker to stop. Idempotent; does nothing once the search has
    /// finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the token the worker polls.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Whether the worker thread is still alive.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait for the worker thread to exit. A no-op if it was never started
    /// or has already been joined.
    pub fn join(&mut self) -> Result<()> {
        match self.worker.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SearchError::Invariant("search worker panicked".into())),
            None => Ok(()),
        }
    }

    /// Latest view of the frontiers. Before `run` this reflects the freshly
    /// prepared engine; afterwards it is whatever the worker last published
    /// (see [`SearchConfig::snapshot_every`]).
    pub fn snapshot(&self) -> Option<SearchSnapshot> {
        match &self.engine {
            Some(engine) => Some(engine.snapshot()),
            None => self.snapshots.latest(),
        }
    }
}

/// Worker loop. `None` means the search was cancelled.
fn drive<M: SpeedMap>(
    mut engine: SearchEngine<M>,
    cancel: &CancelToken,
    snapshots: &SnapshotSlot,
) -> Option<Result<PathOutcome>> {
    let every = u64::from(engine.config().snapshot_every);
    loop {
        if cancel.is_cancelled() {
            debug!(
                "search {} -> {} cancelled after {} iterations",
                engine.start(),
                engine.end(),
                engine.iterations()
            );
            return None;
        }
        match engine.step() {
            Ok(Some(outcome)) => {
                if every > 0 {
                    snapshots.publish(engine.snapshot());
                }
                return Some(Ok(outcome));
            }
            Ok(None) => {
                if every > 0 && engine.iterations() % every == 0 {
                    snapshots.publish(engine.snapshot());
                }
            }
            Err(e) => return Some(Err(e)),
        }
    }
}
