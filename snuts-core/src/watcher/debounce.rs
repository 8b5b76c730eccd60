use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Per-path trailing-edge debounce.
///
/// Each [`schedule`](Debouncer::schedule) call for a path cancels that
/// path's pending timer and starts a new one; the job only runs once a
/// full `delay` passes without another call for the same path.  Paths are
/// independent.  Must be used from within a tokio runtime.
pub struct Debouncer {
    delay: Duration,
    pending: HashMap<PathBuf, JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    pub fn schedule<F, Fut>(&mut self, path: PathBuf, job: F)
    where
        F: FnOnce(PathBuf) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.pending.retain(|_, timer| !timer.is_finished());
        if let Some(previous) = self.pending.remove(&path) {
            previous.abort();
            debug!(file = %path.display(), "debounce timer reset");
        }

        let delay = self.delay;
        let key = path.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached: a later reset aborts the timer, never a started run.
            tokio::spawn(job(path));
        });
        self.pending.insert(key, timer);
    }

    /// Number of timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.pending.values().filter(|t| !t.is_finished()).count()
    }

    pub fn is_pending(&self, path: &Path) -> bool {
        self.pending.get(path).is_some_and(|t| !t.is_finished())
    }

    /// Abort every pending timer.  Runs that already started are not
    /// affected.
    pub fn cancel_all(&mut self) {
        for (_, timer) in self.pending.drain() {
            timer.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
