//! Query Coordinator.
//!
//! Owns the "current query": parses input, serves cache hits synchronously,
//! dispatches enumeration on a miss, and filters every batch that arrives
//! for the current generation. Lives on the control context only; workers
//! see nothing but the shared generation counter and the cache.

use std::{
    path::{MAIN_SEPARATOR, Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace};

use crate::{
    cache::prefix_cache::{CacheKey, PrefixCache},
    completion::{
        query::{Query, is_separator, split_command},
        ranker,
        selection::SelectionCursor,
    },
    config::CompletionConfig,
    fs::enumerator::{
        BatchSink, EnumerationBatch, EnumerationOptions, EnumerationRequest, spawn_enumeration,
    },
    model::entry::{Entry, ResultSet},
};

/// Events delivered to the completion surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionEvent {
    ResultsAvailable { results: ResultSet, generation: u64 },
    ResultsCleared,
    SelectionChanged { index: Option<usize> },
    /// The input text was replaced by an accepted entry
    TextReplaced(String),
}

pub struct QueryCoordinator {
    config: CompletionConfig,
    cache: PrefixCache,
    generation: Arc<AtomicU64>,
    current: Option<Query>,
    in_flight: Option<CancellationToken>,
    shutdown: CancellationToken,
    results: ResultSet,
    selection: SelectionCursor,
    batch_tx: UnboundedSender<EnumerationBatch>,
    event_tx: UnboundedSender<CompletionEvent>,
}

impl QueryCoordinator {
    #[must_use]
    pub fn new(
        config: CompletionConfig,
        cache: PrefixCache,
        batch_tx: UnboundedSender<EnumerationBatch>,
        event_tx: UnboundedSender<CompletionEvent>,
    ) -> Self {
        Self {
            config,
            cache,
            generation: Arc::new(AtomicU64::new(0)),
            current: None,
            in_flight: None,
            shutdown: CancellationToken::new(),
            results: ResultSet::default(),
            selection: SelectionCursor::default(),
            batch_tx,
            event_tx,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    #[must_use]
    pub const fn current_query(&self) -> Option<&Query> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn results(&self) -> &ResultSet {
        &self.results
    }

    #[must_use]
    pub const fn selection(&self) -> Option<usize> {
        self.selection.index()
    }

    #[must_use]
    pub const fn is_enumerating(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub const fn cache(&self) -> &PrefixCache {
        &self.cache
    }

    /// Issue a new query for `text`, superseding whatever came before.
    #[instrument(level = "debug", skip(self), fields(generation = tracing::field::Empty))]
    pub fn issue_query(&mut self, text: &str) {
        let generation = self.supersede();
        tracing::Span::current().record("generation", generation);

        let Some(query) = Query::parse(text, generation, self.config.command_prefixes) else {
            trace!("Input is not path-like; clearing");
            self.current = None;
            self.clear_results();
            return;
        };

        let key = CacheKey::from_prefix(&query.prefix, self.config.case_sensitive_keys);

        if let Some(entries) = self.cache.get(&key) {
            self.current = Some(query);
            self.present(&entries);
            return;
        }

        debug!(
            marker = "ENUMERATION",
            operation_type = "enumeration_dispatch",
            cache_key = %key,
            generation,
            "Dispatching background enumeration"
        );

        let request = EnumerationRequest {
            key,
            dir: query.prefix.clone(),
            include_roots: query.is_root_like(),
        };
        let sink = BatchSink {
            generation,
            current: Arc::clone(&self.generation),
            tx: self.batch_tx.clone(),
        };
        let cancel = self.shutdown.child_token();

        spawn_enumeration(
            request,
            self.options(),
            self.cache.clone(),
            cancel.clone(),
            Some(sink),
        );

        self.in_flight = Some(cancel);
        self.current = Some(query);
    }

    /// Handle a batch marshalled from a worker.
    pub fn on_batch(&mut self, batch: EnumerationBatch) {
        let current = self.generation();
        let is_current = batch.generation == current
            && self
                .current
                .as_ref()
                .is_some_and(|q| q.generation == batch.generation);

        if !is_current {
            trace!(
                batch_generation = batch.generation,
                current_generation = current,
                "Discarding stale batch"
            );
            return;
        }

        if batch.complete {
            self.in_flight = None;
        }

        self.present(&batch.entries);
    }

    pub fn navigate(&mut self, delta: isize) {
        if self.results.is_empty() {
            return;
        }

        let index = self.selection.move_by(delta, self.results.len());
        self.emit(CompletionEvent::SelectionChanged { index });
    }

    /// Accept the selected entry, or the first one when nothing is selected.
    pub fn accept(&mut self) {
        let index = self.selection.index().unwrap_or(0);
        let Some(entry) = self.results.get(index).map(str::to_string) else {
            return;
        };

        self.accept_entry(&entry);
    }

    /// Replace the text with `entry`; drill into it when it is a directory.
    #[instrument(level = "debug", skip(self))]
    pub fn accept_entry(&mut self, entry: &str) {
        let path = if self.config.command_prefixes {
            split_command(entry).1
        } else {
            entry
        };

        if Path::new(path).is_dir() {
            let mut text = entry.to_string();
            if !text.ends_with(is_separator) {
                text.push(MAIN_SEPARATOR);
            }

            info!(entry, "Drilling into accepted directory");
            self.emit(CompletionEvent::TextReplaced(text.clone()));
            self.issue_query(&text);
        } else {
            self.emit(CompletionEvent::TextReplaced(entry.to_string()));
            self.dismiss();
        }
    }

    pub fn dismiss(&mut self) {
        self.supersede();
        self.current = None;
        self.clear_results();
    }

    /// Drop the cached listing for the directory `path`.
    pub fn invalidate_prefix(&self, path: &str) -> bool {
        let key = CacheKey::from_prefix(path, self.config.case_sensitive_keys);
        self.cache.invalidate(&key)
    }

    pub fn clear_all(&self) {
        self.cache.clear();
    }

    /// Warm the cache for `paths` in the background. Already-cached or
    /// unreadable paths are skipped silently.
    pub fn preload(&self, paths: &[PathBuf]) {
        for path in paths {
            let mut dir = path.to_string_lossy().into_owned();
            if !dir.ends_with(is_separator) {
                dir.push(MAIN_SEPARATOR);
            }

            let key = CacheKey::from_prefix(&dir, self.config.case_sensitive_keys);
            if self.cache.contains(&key) {
                continue;
            }

            debug!(cache_key = %key, "Preloading directory");

            let request = EnumerationRequest {
                key,
                include_roots: crate::completion::query::is_root_like(&dir),
                dir,
            };

            spawn_enumeration(
                request,
                self.options(),
                self.cache.clone(),
                self.shutdown.child_token(),
                None,
            );
        }
    }

    /// Cancel every enumeration this coordinator started.
    pub fn shutdown(&mut self) {
        self.supersede();
        self.shutdown.cancel();
    }

    /// Advance the generation and cancel the in-flight enumeration.
    fn supersede(&mut self) -> u64 {
        if let Some(cancel) = self.in_flight.take() {
            cancel.cancel();
        }
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn present(&mut self, entries: &[Entry]) {
        let Some(query) = &self.current else {
            return;
        };

        let results = ranker::filter_for_query(entries, query, self.config.max_results);
        if results.is_empty() {
            self.clear_results();
            return;
        }

        let generation = query.generation;
        let previous = self.selection.index();
        self.selection.follow(&self.results, &results);
        self.results = results.clone();
        self.emit(CompletionEvent::ResultsAvailable {
            results,
            generation,
        });

        // The surface keeps its highlight unless told otherwise.
        let index = self.selection.index();
        if index != previous {
            self.emit(CompletionEvent::SelectionChanged { index });
        }
    }

    fn clear_results(&mut self) {
        self.results = ResultSet::default();
        self.selection.reset();
        self.emit(CompletionEvent::ResultsCleared);
    }

    fn emit(&self, event: CompletionEvent) {
        if self.event_tx.send(event).is_err() {
            trace!("Completion surface receiver dropped");
        }
    }

    const fn options(&self) -> EnumerationOptions {
        EnumerationOptions {
            batch_size: self.config.batch_size,
            show_hidden: self.config.show_hidden,
        }
    }
}

impl Drop for QueryCoordinator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
