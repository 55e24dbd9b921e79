// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::time::Instant;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::errors::Result;
use crate::types::ChangeKind;
use crate::watch::filter::{ChangeEvent, ChangeFilter, RawChange, Verdict};
use crate::watch::patterns::IgnoreSet;
use crate::watch::walker::collect_watch_dirs;
use crate::watch::WatchSession;

/// Backend errors, surfaced separately from change events.
pub type ErrorStream = mpsc::UnboundedReceiver<notify::Error>;

/// Keeps the notify backend alive and records which directories were
/// registered. Dropping this handle stops file watching.
pub struct WatcherHandle {
    inner: RecommendedWatcher,
    dirs: Vec<PathBuf>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("dirs", &self.dirs.len())
            .finish()
    }
}

impl WatcherHandle {
    /// Directories registered at startup, root first.
    pub fn registered_dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Remove the registration for `dir`. Fails if `dir` was never
    /// registered (or was already removed).
    pub fn unwatch(&mut self, dir: &Path) -> Result<()> {
        self.inner.unwatch(dir)?;
        self.dirs.retain(|d| d != dir);
        Ok(())
    }
}

/// Sequential stream of accepted change events.
///
/// Raw notifications queue up in an unbounded channel fed by the notify
/// callback, each stamped with its arrival time. The filter runs when an
/// event is pulled but compares arrival times, so duplicates that piled up
/// while the consumer was busy building still fall inside the window of
/// the change that triggered the build.
#[derive(Debug)]
pub struct ChangeStream {
    raw_rx: mpsc::UnboundedReceiver<RawChange>,
    filter: ChangeFilter,
}

impl ChangeStream {
    pub fn new(raw_rx: mpsc::UnboundedReceiver<RawChange>, filter: ChangeFilter) -> Self {
        Self { raw_rx, filter }
    }

    /// Wait for the next accepted change. Returns `None` once the backend
    /// has gone away. Cancel-safe: no accepted event is lost if the future
    /// is dropped.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            let raw = self.raw_rx.recv().await?;
            match self.filter.evaluate(&raw) {
                Verdict::Accepted => {
                    debug!(path = ?raw.path, "change accepted");
                    return Some(ChangeEvent {
                        path: raw.path,
                        accepted_at: raw.at,
                    });
                }
                verdict => trace!(path = ?raw.path, ?verdict, "change dropped"),
            }
        }
    }

    pub fn filter(&self) -> &ChangeFilter {
        &self.filter
    }
}

/// A started watch: the backend handle plus its two output streams.
#[derive(Debug)]
pub struct Watch {
    pub handle: WatcherHandle,
    pub changes: ChangeStream,
    pub errors: ErrorStream,
}

/// Push one backend callback into the change or error channel, stamping
/// changes with their arrival time.
///
/// Returns `false` once the receiving side is gone.
fn forward(
    res: notify::Result<Event>,
    raw_tx: &mpsc::UnboundedSender<RawChange>,
    err_tx: &mpsc::UnboundedSender<notify::Error>,
) -> bool {
    match res {
        Ok(event) => {
            let kind = ChangeKind::from(&event.kind);
            let at = Instant::now();
            for path in event.paths {
                if raw_tx.send(RawChange { path, kind, at }).is_err() {
                    return false;
                }
            }
            true
        }
        Err(err) => match err_tx.send(err) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err.0, "file watch error after the runtime stopped");
                false
            }
        },
    }
}

/// Walk the session root, register every directory non-recursively and
/// start forwarding notifications.
///
/// Directories created after this call are not registered.
pub fn start_watch(session: &WatchSession) -> Result<Watch> {
    let root = session
        .root
        .canonicalize()
        .unwrap_or_else(|_| session.root.clone());
    let ignore = IgnoreSet::new(&root, &session.ignore)?;
    let dirs = collect_watch_dirs(&root, &ignore)?;

    let (raw_tx, raw_rx) = mpsc::unbounded_channel::<RawChange>();
    let (err_tx, err_rx) = mpsc::unbounded_channel::<notify::Error>();

    // Called synchronously on notify's own thread.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            forward(res, &raw_tx, &err_tx);
        },
        Config::default(),
    )?;

    for dir in &dirs {
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
    }

    info!(root = ?root, dirs = dirs.len(), "file watcher started");

    let filter = ChangeFilter::new(session.extensions.clone(), session.debounce)
        .with_ignore(ignore);

    Ok(Watch {
        handle: WatcherHandle {
            inner: watcher,
            dirs,
        },
        changes: ChangeStream::new(raw_rx, filter),
        errors: err_rx,
    })
}
