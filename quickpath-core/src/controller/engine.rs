//! Completion engine control loop.
//!
//! Host → [`EngineHandle`] → command channel → control task. The control
//! task is the only place that touches the coordinator; debounce output and
//! worker batches are marshalled onto it through channels.

use std::path::PathBuf;

use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, info, trace};

use crate::{
    cache::prefix_cache::PrefixCache,
    config::CompletionConfig,
    controller::coordinator::{CompletionEvent, QueryCoordinator},
    error::{AppError, AppResult},
    fs::{enumerator::EnumerationBatch, roots::default_preload_paths},
    util::debounce::{Debounced, Debouncer},
};

/// Input events accepted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    TextChanged(String),
    NavigateSelection(isize),
    Accept,
    AcceptEntry(String),
    Dismiss,
    InvalidatePrefix(String),
    ClearAll,
    PreloadPaths(Vec<PathBuf>),
    Shutdown,
}

/// Cloneable host-side handle.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: UnboundedSender<EngineCommand>,
    cache: PrefixCache,
}

impl EngineHandle {
    pub fn send(&self, command: EngineCommand) -> AppResult<()> {
        self.tx.send(command).map_err(|_| AppError::EngineStopped)
    }

    pub fn text_changed(&self, text: impl Into<String>) -> AppResult<()> {
        self.send(EngineCommand::TextChanged(text.into()))
    }

    /// Move the selection; ±1 for arrows, ±10 for paging.
    pub fn navigate(&self, delta: isize) -> AppResult<()> {
        self.send(EngineCommand::NavigateSelection(delta))
    }

    pub fn accept(&self) -> AppResult<()> {
        self.send(EngineCommand::Accept)
    }

    pub fn accept_entry(&self, entry: impl Into<String>) -> AppResult<()> {
        self.send(EngineCommand::AcceptEntry(entry.into()))
    }

    pub fn dismiss(&self) -> AppResult<()> {
        self.send(EngineCommand::Dismiss)
    }

    pub fn invalidate_prefix(&self, path: impl Into<String>) -> AppResult<()> {
        self.send(EngineCommand::InvalidatePrefix(path.into()))
    }

    pub fn clear_all(&self) -> AppResult<()> {
        self.send(EngineCommand::ClearAll)
    }

    pub fn preload_paths(&self, paths: Vec<PathBuf>) -> AppResult<()> {
        self.send(EngineCommand::PreloadPaths(paths))
    }

    pub fn shutdown(&self) -> AppResult<()> {
        self.send(EngineCommand::Shutdown)
    }

    /// Shared cache, for diagnostics.
    #[must_use]
    pub const fn cache(&self) -> &PrefixCache {
        &self.cache
    }
}

pub struct CompletionEngine {
    coordinator: QueryCoordinator,
    debouncer: Debouncer<String>,
    command_rx: UnboundedReceiver<EngineCommand>,
    debounce_rx: UnboundedReceiver<Debounced<String>>,
    batch_rx: UnboundedReceiver<EnumerationBatch>,
}

impl CompletionEngine {
    /// Start the control task with a fresh cache.
    pub fn spawn(
        config: CompletionConfig,
    ) -> (EngineHandle, UnboundedReceiver<CompletionEvent>, JoinHandle<()>) {
        Self::spawn_with_cache(config, PrefixCache::new())
    }

    /// Start the control task over an existing cache. When
    /// `config.preload` is set the default locations are warmed first.
    pub fn spawn_with_cache(
        config: CompletionConfig,
        cache: PrefixCache,
    ) -> (EngineHandle, UnboundedReceiver<CompletionEvent>, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        let (debouncer, debounce_rx) = Debouncer::new(config.debounce);

        let mut preload: Vec<PathBuf> = Vec::new();
        if config.preload {
            preload.extend(default_preload_paths());
            preload.extend(config.extra_preload_paths.iter().cloned());
        }

        let coordinator = QueryCoordinator::new(config, cache.clone(), batch_tx, event_tx);
        if !preload.is_empty() {
            coordinator.preload(&preload);
        }

        let engine = Self {
            coordinator,
            debouncer,
            command_rx,
            debounce_rx,
            batch_rx,
        };

        let task = tokio::spawn(engine.run());

        let handle = EngineHandle {
            tx: command_tx,
            cache,
        };

        (handle, event_rx, task)
    }

    async fn run(mut self) {
        info!("Completion engine started");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    match command {
                        Some(EngineCommand::Shutdown) | None => break,
                        Some(command) => self.handle_command(command),
                    }
                }

                Some(delivered) = self.debounce_rx.recv() => {
                    if let Some(text) = self.debouncer.accept(delivered) {
                        debug!(text = %text, "Query requested");
                        self.coordinator.issue_query(&text);
                    }
                }

                Some(batch) = self.batch_rx.recv() => {
                    trace!(generation = batch.generation, size = batch.entries.len(), "Batch received");
                    self.coordinator.on_batch(batch);
                }
            }
        }

        self.debouncer.cancel();
        self.coordinator.shutdown();
        let stats = self.coordinator.cache().stats();
        info!(
            cache = ?stats,
            hit_rate = stats.hit_rate(),
            "Completion engine stopped"
        );
    }

    fn handle_command(&mut self, command: EngineCommand) {
        trace!(?command, "Engine command");

        match command {
            EngineCommand::TextChanged(text) => {
                if text.is_empty() {
                    self.drop_pending_text();
                    self.coordinator.dismiss();
                } else {
                    self.debouncer.submit(text);
                }
            }

            EngineCommand::NavigateSelection(delta) => self.coordinator.navigate(delta),

            EngineCommand::Accept => {
                self.drop_pending_text();
                self.coordinator.accept();
            }

            EngineCommand::AcceptEntry(entry) => {
                self.drop_pending_text();
                self.coordinator.accept_entry(&entry);
            }

            EngineCommand::Dismiss => {
                self.drop_pending_text();
                self.coordinator.dismiss();
            }

            EngineCommand::InvalidatePrefix(path) => {
                self.coordinator.invalidate_prefix(&path);
            }

            EngineCommand::ClearAll => self.coordinator.clear_all(),

            EngineCommand::PreloadPaths(paths) => self.coordinator.preload(&paths),

            // Handled by the loop.
            EngineCommand::Shutdown => {}
        }
    }

    /// Text typed inside the quiet interval loses to an explicit action.
    fn drop_pending_text(&mut self) {
        if self.debouncer.is_pending() {
            debug!("Discarding pending debounced text");
        }
        self.debouncer.cancel();
    }
}
