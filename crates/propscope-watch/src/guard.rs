//! Per-document scheduling state: debounce timers and in-flight markers.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Serializes and coalesces sync work per document path.
///
/// Two tables, both keyed by path and owned exclusively by this guard:
/// at most one pending debounce timer (a newer trigger cancels and
/// replaces the older one), and an in-flight marker held for the
/// duration of a read-modify-write. A trigger for an in-flight path is
/// dropped, never queued; a later natural trigger re-requests the
/// work.
///
/// The debounce delay is a responsiveness/coalescing trade-off;
/// [`ScheduleGuard::run_exclusive`] is what actually guarantees that
/// no two operations race on one document. Cloning the guard clones a
/// handle to the same tables.
#[derive(Debug, Clone, Default)]
pub struct ScheduleGuard {
    timers: Arc<Mutex<TimerTable>>,
    in_flight: Arc<Mutex<HashSet<PathBuf>>>,
}

#[derive(Debug, Default)]
struct TimerTable {
    next_generation: u64,
    pending: HashMap<PathBuf, PendingTimer>,
}

#[derive(Debug)]
struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Clears the in-flight marker when dropped, on every exit path.
struct InFlightGuard {
    path: PathBuf,
    set: Arc<Mutex<HashSet<PathBuf>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.lock().remove(&self.path);
    }
}

impl ScheduleGuard {
    /// Create an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run after `delay`, cancelling any pending
    /// timer for the same path. Triggers arriving within the window
    /// collapse into exactly one eventual run of the latest task.
    pub fn schedule<F, Fut>(&self, path: PathBuf, delay: Duration, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        // The table lock is held across the spawn so the new timer
        // cannot fire before its entry exists.
        let mut table = self.timers.lock();
        let generation = table.next_generation;
        table.next_generation += 1;

        let timers = Arc::clone(&self.timers);
        let key = path.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            finish_timer(&timers, &key, generation);
            task().await;
        });

        if let Some(previous) = table.pending.insert(path, PendingTimer { generation, handle }) {
            trace!("superseding pending timer (generation {})", previous.generation);
            previous.handle.abort();
        }
    }

    /// Run `operation` while holding the in-flight marker for `path`.
    ///
    /// Returns `None` without running anything when the path is
    /// already in flight. The marker is released on every exit path of
    /// the operation.
    pub async fn run_exclusive<T, F>(&self, path: &Path, operation: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let _guard = self.try_acquire(path)?;
        Some(operation.await)
    }

    /// Whether `path` currently has an operation in flight.
    pub fn is_in_flight(&self, path: &Path) -> bool {
        self.in_flight.lock().contains(path)
    }

    /// Number of pending debounce timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.lock().pending.len()
    }

    /// Cancel all pending timers and clear the in-flight set without
    /// waiting for outstanding operations. A write already dispatched
    /// to the metadata store completes independently.
    pub fn shutdown(&self) {
        let mut table = self.timers.lock();
        let cancelled = table.pending.len();
        for (_, timer) in table.pending.drain() {
            timer.handle.abort();
        }
        drop(table);
        self.in_flight.lock().clear();
        if cancelled > 0 {
            debug!("cancelled {} pending sync timer(s)", cancelled);
        }
    }

    fn try_acquire(&self, path: &Path) -> Option<InFlightGuard> {
        let mut set = self.in_flight.lock();
        if !set.insert(path.to_path_buf()) {
            trace!("{} already in flight, dropping trigger", path.display());
            return None;
        }
        Some(InFlightGuard {
            path: path.to_path_buf(),
            set: Arc::clone(&self.in_flight),
        })
    }
}

/// A fired timer removes its own entry; the generation check keeps a
/// stale timer from evicting its successor's entry.
fn finish_timer(timers: &Mutex<TimerTable>, path: &Path, generation: u64) {
    let mut table = timers.lock();
    if table
        .pending
        .get(path)
        .is_some_and(|timer| timer.generation == generation)
    {
        table.pending.remove(path);
    }
}
