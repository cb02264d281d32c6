//! ``src/fs/enumerator.rs``
//!
//! # `Background Enumerator`: Cancellable Directory Listing
//!
//! Lists the children of one directory prefix on the blocking pool,
//! streaming cumulative batches back to the control loop. Directories are
//! ordered before files. Access errors are swallowed: whatever was
//! collected is still delivered and cached.

use std::{
    fs::{self, DirEntry, ReadDir},
    path::{MAIN_SEPARATOR, Path},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::{
    cache::prefix_cache::{CacheKey, PrefixCache},
    completion::query::{fold_for_match, is_separator, native_separators},
    error::{AppError, AppResult},
    fs::roots::filesystem_roots,
    model::entry::Entry,
};

/// One delivery from a worker to the control loop. `entries` is the full
/// known set for the prefix at the time of sending.
#[derive(Debug, Clone)]
pub struct EnumerationBatch {
    pub generation: u64,
    pub key: CacheKey,
    pub entries: Arc<[Entry]>,
    pub complete: bool,
}

/// Listing options shared by every enumeration.
#[derive(Debug, Clone, Copy)]
pub struct EnumerationOptions {
    pub batch_size: usize,
    pub show_hidden: bool,
}

/// What to enumerate.
#[derive(Debug, Clone)]
pub struct EnumerationRequest {
    pub key: CacheKey,
    /// Directory prefix as typed; entries are built as `dir + name` with
    /// the separators made native
    pub dir: String,
    pub include_roots: bool,
}

/// Where partial results go. Preloads run without one.
#[derive(Debug, Clone)]
pub struct BatchSink {
    pub generation: u64,
    pub current: Arc<AtomicU64>,
    pub tx: UnboundedSender<EnumerationBatch>,
}

impl BatchSink {
    /// Returns false once the receiver is gone.
    fn deliver(&self, key: &CacheKey, entries: Arc<[Entry]>, complete: bool) -> bool {
        // Early out only; the control loop re-checks on receipt.
        if self.current.load(Ordering::SeqCst) != self.generation {
            trace!(generation = self.generation, "Skipping send for superseded query");
            return true;
        }

        self.tx
            .send(EnumerationBatch {
                generation: self.generation,
                key: key.clone(),
                entries,
                complete,
            })
            .is_ok()
    }
}

/// Run one enumeration on the blocking pool. On full completion the entries
/// are written to `cache`; a cancelled run leaves the cache untouched.
pub fn spawn_enumeration(
    request: EnumerationRequest,
    options: EnumerationOptions,
    cache: PrefixCache,
    cancel: CancellationToken,
    sink: Option<BatchSink>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let start_time: Instant = Instant::now();
        let key: CacheKey = request.key.clone();

        let enumerator = DirectoryEnumerator::new(request, options, cancel, sink);

        match enumerator.run() {
            Ok(entries) => {
                let count = entries.len();
                cache.insert(key.clone(), entries);

                info!(
                    marker = "ENUMERATION",
                    operation_type = "enumeration_complete",
                    cache_key = %key,
                    entry_count = count,
                    duration_us = start_time.elapsed().as_micros(),
                    "Directory enumeration completed"
                );
            }

            Err(e) if e.is_cancelled() => {
                debug!(
                    marker = "ENUMERATION",
                    operation_type = "enumeration_cancelled",
                    cache_key = %key,
                    duration_us = start_time.elapsed().as_micros(),
                    "Directory enumeration cancelled"
                );
            }

            Err(e) => {
                debug!(
                    marker = "ENUMERATION",
                    operation_type = "enumeration_stopped",
                    cache_key = %key,
                    reason = %e,
                    "Directory enumeration stopped before completion"
                );
            }
        }
    })
}

struct DirectoryEnumerator {
    request: EnumerationRequest,
    options: EnumerationOptions,
    cancel: CancellationToken,
    sink: Option<BatchSink>,
}

impl DirectoryEnumerator {
    const fn new(
        request: EnumerationRequest,
        options: EnumerationOptions,
        cancel: CancellationToken,
        sink: Option<BatchSink>,
    ) -> Self {
        Self {
            request,
            options,
            cancel,
            sink,
        }
    }

    /// Ok carries the complete entry list (directories first); Err is either
    /// cancellation or a dropped receiver.
    fn run(&self) -> AppResult<Arc<[Entry]>> {
        let mut dirs: Vec<Entry> = Vec::new();
        let mut files: Vec<Entry> = Vec::new();

        let base: String = self.base_prefix();

        if self.request.include_roots {
            // The root being listed is not a completion of itself.
            let listed = fold_for_match(&base);
            dirs.extend(
                filesystem_roots()
                    .into_iter()
                    .filter(|root| fold_for_match(root) != listed),
            );
        }

        if !base.is_empty() {
            match self.open_directory(&base) {
                Ok(read_dir) => self.scan(read_dir, &base, &mut dirs, &mut files)?,

                // The whole directory being unreadable still yields the roots.
                Err(e) => debug!("Failed to open {}: {}", base, e),
            }
        }

        self.check_cancelled()?;

        let entries: Arc<[Entry]> = dirs.into_iter().chain(files).collect();
        self.send(entries.clone(), true)?;

        Ok(entries)
    }

    fn base_prefix(&self) -> String {
        let mut base = native_separators(&self.request.dir);
        if !base.is_empty() && !base.ends_with(is_separator) {
            base.push(MAIN_SEPARATOR);
        }
        base
    }

    fn open_directory(&self, base: &str) -> AppResult<ReadDir> {
        fs::read_dir(Path::new(base)).map_err(|e| AppError::from_io(base, e))
    }

    fn scan(
        &self,
        read_dir: ReadDir,
        base: &str,
        dirs: &mut Vec<Entry>,
        files: &mut Vec<Entry>,
    ) -> AppResult<()> {
        let batch_size = self.options.batch_size.max(1);
        let mut discovered: usize = 0;

        for entry_result in read_dir {
            self.check_cancelled()?;

            let entry: DirEntry = match entry_result {
                Ok(e) => e,

                Err(e) => {
                    trace!("Skipping unreadable entry under {}: {}", base, e);
                    continue;
                }
            };

            let name = entry.file_name();
            let name = name.to_string_lossy();

            if !self.options.show_hidden && name.starts_with('.') {
                continue;
            }

            let full: Entry = Entry::from(format!("{base}{name}"));

            if Self::is_directory(&entry) {
                dirs.push(full);
            } else {
                files.push(full);
            }

            discovered += 1;

            if discovered.is_multiple_of(batch_size) {
                let snapshot: Arc<[Entry]> = dirs.iter().chain(files.iter()).cloned().collect();
                self.send(snapshot, false)?;
            }
        }

        Ok(())
    }

    /// Follows symlinks; anything unreadable counts as a file.
    fn is_directory(entry: &DirEntry) -> bool {
        match entry.file_type() {
            Ok(ft) if ft.is_symlink() => entry.path().is_dir(),
            Ok(ft) => ft.is_dir(),
            Err(_) => false,
        }
    }

    fn check_cancelled(&self) -> AppResult<()> {
        if self.cancel.is_cancelled() {
            Err(AppError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn send(&self, entries: Arc<[Entry]>, complete: bool) -> AppResult<()> {
        match &self.sink {
            Some(sink) if !sink.deliver(&self.request.key, entries, complete) => {
                // Receiver dropped, the engine is gone
                Err(AppError::EngineStopped)
            }
            _ => Ok(()),
        }
    }
}
