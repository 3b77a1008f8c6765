//! File-selection orchestrator.
//!
//! Each selection sent through a [`SelectionSender`] starts a fresh
//! read-and-summarise run in its own tokio task. The most recent selection
//! wins: starting a run aborts the one in flight, and any outcome that still
//! arrives from an older generation is dropped, so consumers only ever see
//! results for the newest file.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use vis_core::error::{Result, VisError};
use vis_core::settings::PipelineOptions;
use vis_data::pipeline::{run, Visualization};

use crate::provider::{FileProvider, FileSelection};

// ── Public types ──────────────────────────────────────────────────────────────

/// Result of one selection's run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Monotonic selection counter, starting at 1.
    pub generation: u64,
    pub selection: FileSelection,
    pub result: Result<Visualization>,
}

/// Sending half used by the UI to report file choices.
#[derive(Debug, Clone)]
pub struct SelectionSender {
    tx: mpsc::Sender<FileSelection>,
}

impl SelectionSender {
    /// Queue `path` as the newest selection.
    pub async fn select(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.tx
            .send(FileSelection::new(path))
            .await
            .map_err(|_| VisError::Stopped)
    }
}

/// Handle to the background selection loop.
pub struct SelectionHandle {
    handle: JoinHandle<()>,
}

impl SelectionHandle {
    /// Stop the loop immediately, abandoning any run in flight.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Wait for the loop to finish after every [`SelectionSender`] is dropped.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                tracing::warn!(error = %e, "selection loop panicked");
            }
        }
    }
}

// ── SelectionOrchestrator ─────────────────────────────────────────────────────

pub struct SelectionOrchestrator<P> {
    provider: Arc<P>,
    options: PipelineOptions,
}

impl<P: FileProvider> SelectionOrchestrator<P> {
    pub fn new(provider: P, options: PipelineOptions) -> Self {
        Self {
            provider: Arc::new(provider),
            options,
        }
    }

    /// Spawn the selection loop.
    ///
    /// The loop ends once every [`SelectionSender`] is dropped and the last
    /// run has reported.
    pub fn start(self) -> (SelectionSender, mpsc::Receiver<RunOutcome>, SelectionHandle) {
        let (selection_tx, selection_rx) = mpsc::channel(8);
        let (outcome_tx, outcome_rx) = mpsc::channel(8);

        let handle = tokio::spawn(async move {
            self.selection_loop(selection_rx, outcome_tx).await;
        });

        (
            SelectionSender { tx: selection_tx },
            outcome_rx,
            SelectionHandle { handle },
        )
    }

    // ── Private implementation ────────────────────────────────────────────

    async fn selection_loop(
        self,
        mut selections: mpsc::Receiver<FileSelection>,
        outcomes: mpsc::Sender<RunOutcome>,
    ) {
        let (done_tx, mut done_rx) = mpsc::channel::<RunOutcome>(8);
        let mut generation = 0u64;
        let mut in_flight: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                selection = selections.recv() => {
                    let Some(selection) = selection else { break };
                    generation += 1;

                    if let Some(previous) = in_flight.take() {
                        if !previous.is_finished() {
                            tracing::info!(
                                generation,
                                "newer selection received; discarding run in flight"
                            );
                        }
                        previous.abort();
                    }

                    tracing::debug!(generation, path = %selection.path.display(), "starting run");
                    in_flight = Some(self.spawn_run(generation, selection, done_tx.clone()));
                }
                Some(outcome) = done_rx.recv() => {
                    Self::forward(outcome, generation, &outcomes).await;
                }
            }
        }

        // No more selections: deliver the newest run, if it is still going.
        drop(done_tx);
        if in_flight.is_some() {
            while let Some(outcome) = done_rx.recv().await {
                if outcome.generation == generation {
                    Self::forward(outcome, generation, &outcomes).await;
                    break;
                }
            }
        }
        tracing::debug!("selection channel closed; exiting loop");
    }

    fn spawn_run(
        &self,
        generation: u64,
        selection: FileSelection,
        done: mpsc::Sender<RunOutcome>,
    ) -> JoinHandle<()> {
        let provider = Arc::clone(&self.provider);
        let options = self.options;

        tokio::spawn(async move {
            let result = match provider.read_text(&selection).await {
                Ok(text) => run(&text, &options),
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                tracing::error!(generation, error = %e, "run failed");
            }
            let _ = done
                .send(RunOutcome {
                    generation,
                    selection,
                    result,
                })
                .await;
        })
    }

    async fn forward(outcome: RunOutcome, current: u64, outcomes: &mpsc::Sender<RunOutcome>) {
        if outcome.generation != current {
            tracing::debug!(
                stale = outcome.generation,
                current,
                "dropping outcome of superseded selection"
            );
            return;
        }
        if let Err(e) = outcomes.send(outcome).await {
            tracing::warn!(error = %e, "failed to deliver run outcome; receiver dropped");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
