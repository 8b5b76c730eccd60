//! Long-lived watch session: initial scan, then debounced re-analysis of
//! test files as they are added or changed.
//!
//! The debounce table and the concurrency gate are the only shared mutable
//! state and both belong to the session.  Every analysis, whether from the
//! initial scan or from a live event, waits on the same gate.

pub mod debounce;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::config::WatchSettings;
use crate::discovery::Discovery;
use crate::runner::DetectorRunner;
use crate::smell::Smell;
use debounce::Debouncer;

/// Receives each file's findings as soon as its analysis completes.
pub trait Reporter: Send + Sync {
    fn report(&self, file: &Path, smells: &[Smell]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub debounce: Duration,
    /// Maximum number of files analyzed at once.
    pub concurrency_limit: usize,
}

impl Default for WatchOptions {
    fn default() -> Self {
        WatchSettings::default().into()
    }
}

impl From<WatchSettings> for WatchOptions {
    fn from(s: WatchSettings) -> Self {
        Self {
            debounce: Duration::from_millis(s.debounce_ms),
            concurrency_limit: s.concurrency.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub files: usize,
    pub smells: usize,
}

struct Session {
    runner: DetectorRunner,
    gate: Semaphore,
    reporter: Arc<dyn Reporter>,
}

impl Session {
    async fn analyze(&self, path: PathBuf) -> usize {
        let Ok(_permit) = self.gate.acquire().await else {
            return 0;
        };
        debug!(file = %path.display(), "analyzing");
        let smells = self.runner.run(&path).await;
        self.reporter.report(&path, &smells);
        smells.len()
    }
}

pub struct Watcher {
    options: WatchOptions,
    discovery: Arc<Discovery>,
    session: Arc<Session>,
}

impl Watcher {
    pub fn new(
        options: WatchOptions,
        discovery: Discovery,
        runner: DetectorRunner,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let gate = Semaphore::new(options.concurrency_limit.max(1));
        Self {
            options,
            discovery: Arc::new(discovery),
            session: Arc::new(Session {
                runner,
                gate,
                reporter,
            }),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        self.discovery.roots()
    }

    /// Analyze every discovered test file once, at most
    /// `concurrency_limit` at a time.  Findings are reported per file in
    /// completion order.
    pub async fn initial_scan(&self) -> ScanSummary {
        let discovery = Arc::clone(&self.discovery);
        let files = match tokio::task::spawn_blocking(move || discovery.files()).await {
            Ok(files) => files,
            Err(err) => {
                error!(error = %err, "test file discovery failed");
                vec![]
            }
        };
        info!(files = files.len(), "scanning test files");

        let mut set = JoinSet::new();
        for path in files.iter().cloned() {
            let session = Arc::clone(&self.session);
            set.spawn(async move { session.analyze(path).await });
        }

        let mut smells = 0;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(n) => smells += n,
                Err(err) => error!(error = %err, "analysis task failed"),
            }
        }
        ScanSummary {
            files: files.len(),
            smells,
        }
    }

    /// Run the initial scan, then subscribe to file-system events under
    /// every root.  The session runs until the returned handle is stopped
    /// or dropped.
    pub async fn watch(&self) -> anyhow::Result<WatchHandle> {
        let summary = self.initial_scan().await;
        info!(files = summary.files, smells = summary.smells, "initial scan complete");

        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscription = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_relevant(&event.kind) => {
                for path in event.paths.into_iter().filter(|p| p.is_file()) {
                    if tx.send(path).is_err() {
                        break;
                    }
                }
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "watch error"),
        })?;
        for root in self.discovery.roots() {
            subscription.watch(root, RecursiveMode::Recursive)?;
        }
        info!("Watching for file changes...");

        let mut handle = self.listen(rx);
        handle.subscription = Some(subscription);
        Ok(handle)
    }

    /// Consume a stream of changed paths: filter through discovery,
    /// debounce per path, analyze.  [`watch`](Watcher::watch) feeds this
    /// from the OS; tests feed it directly.
    pub fn listen(&self, mut events: mpsc::UnboundedReceiver<PathBuf>) -> WatchHandle {
        let (shutdown, mut stop) = oneshot::channel::<()>();
        let session = Arc::clone(&self.session);
        let discovery = Arc::clone(&self.discovery);
        let mut debouncer = Debouncer::new(self.options.debounce);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop => break,
                    event = events.recv() => {
                        let Some(path) = event else { break };
                        if !discovery.accepts(&path) {
                            debug!(file = %path.display(), "ignoring event");
                            continue;
                        }
                        let session = Arc::clone(&session);
                        debouncer.schedule(path, move |path| async move {
                            session.analyze(path).await;
                        });
                    }
                }
            }
            debouncer.cancel_all();
            debug!("watch session ended");
        });

        WatchHandle {
            shutdown: Some(shutdown),
            task,
            subscription: None,
        }
    }
}

/// Added files, content changes and renames-into-place trigger analysis.
fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
    )
}

/// Cancellation handle for a running session.  Dropping it also ends the
/// session.
pub struct WatchHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    subscription: Option<RecommendedWatcher>,
}

impl WatchHandle {
    /// Unsubscribe from file-system events, clear pending debounce timers
    /// and wait for the session loop to exit.  Analyses already running
    /// are left to finish.
    pub async fn stop(self) {
        let WatchHandle {
            shutdown,
            task,
            subscription,
        } = self;
        drop(subscription);
        if let Some(tx) = shutdown {
            let _ = tx.send(());
        }
        if let Err(err) = task.await {
            error!(error = %err, "watch session task failed");
        }
    }
}
