//! The Incremental Driver: retains the cache across runs and, optionally,
//! watches for file changes — subscribing to the project tree, filtering by
//! source-file extension, debouncing into 300ms batches, invalidating the
//! cache for each affected path, and emitting a *files-changed* notification.
//! Re-analysis on change is the caller's decision; this driver does not
//! restart traversal by itself.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

use cg_config::CANONICAL_EXTENSIONS;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::cache::CacheManager;

/// The debounce window events are batched over before a notification fires.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// A batch of source-file paths that changed together within one debounce
/// window.
#[derive(Debug, Clone)]
pub struct FilesChanged {
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum IncrementalError {
    #[error("failed to watch project tree: {0}")]
    Watch(#[from] notify::Error),
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CANONICAL_EXTENSIONS.contains(&ext))
}

/// Watches `root` for changes to source files, invalidating `cache` for each
/// affected path and forwarding debounced batches on the returned receiver.
/// The returned watcher must be kept alive for the duration of watching.
pub fn watch(root: &Path, cache: CacheManager) -> Result<(RecommendedWatcher, Receiver<FilesChanged>), IncrementalError> {
    let (raw_tx, raw_rx) = channel::<PathBuf>();
    let (batch_tx, batch_rx): (Sender<FilesChanged>, Receiver<FilesChanged>) = channel();

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
        let Ok(event) = event else { return };
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)) {
            return;
        }
        for path in event.paths {
            if is_source_file(&path) {
                let _ = raw_tx.send(path);
            }
        }
    })?;
    watcher.watch(root, RecursiveMode::Recursive)?;

    std::thread::spawn(move || {
        debounce_loop(raw_rx, batch_tx, cache);
    });

    Ok((watcher, batch_rx))
}

fn debounce_loop(raw_rx: Receiver<PathBuf>, batch_tx: Sender<FilesChanged>, cache: CacheManager) {
    let mut pending: Vec<PathBuf> = Vec::new();
    let mut window_start: Option<Instant> = None;

    loop {
        let timeout = match window_start {
            Some(start) => DEBOUNCE_WINDOW.saturating_sub(start.elapsed()),
            None => Duration::from_secs(3600),
        };
        match raw_rx.recv_timeout(timeout) {
            Ok(path) => {
                if window_start.is_none() {
                    window_start = Some(Instant::now());
                }
                if !pending.contains(&path) {
                    pending.push(path);
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                if !pending.is_empty() {
                    for path in &pending {
                        cache.invalidate(path);
                    }
                    let batch = FilesChanged { paths: std::mem::take(&mut pending) };
                    window_start = None;
                    if batch_tx.send(batch).is_err() {
                        return;
                    }
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => return,
        }
    }
}
