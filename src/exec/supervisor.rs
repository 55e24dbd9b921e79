// src/exec/supervisor.rs

//! The process supervisor: owner of the single "current" managed process.
//!
//! Every started instance gets a background waiter task that owns the
//! child. The supervisor never touches the child directly; it asks the
//! waiter to kill it over a oneshot channel and waits for the answer. The
//! waiter is also the only place the exit outcome is observed, and it is
//! only logged: a process killed for a restart and one that crashed look
//! the same from here.

use std::io;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{ReloadrError, Result};
use crate::exec::backend::{ChildControl, ProcessBackend};
use crate::exec::output::{buffer_all, diagnostic_lines, status, stdout_sink, stream_lines, LineSink};

type KillReply = oneshot::Sender<io::Result<()>>;

/// Identity of a started instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessHandle {
    pub pid: Option<u32>,
    /// 1 for the first instance started by this supervisor, then 2, ...
    pub instance: u64,
}

struct ActiveProcess {
    handle: ProcessHandle,
    /// `None` once a kill request has been sent.
    kill_tx: Option<oneshot::Sender<KillReply>>,
    waiter: JoinHandle<()>,
}

impl ActiveProcess {
    fn has_exited(&self) -> bool {
        self.waiter.is_finished()
    }
}

pub struct Supervisor<P: ProcessBackend> {
    backend: P,
    name: String,
    args: Vec<String>,
    sink: LineSink,
    current: Option<ActiveProcess>,
    started: u64,
}

impl<P: ProcessBackend> std::fmt::Debug for Supervisor<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("name", &self.name)
            .field("current", &self.current.as_ref().map(|p| p.handle))
            .field("started", &self.started)
            .finish()
    }
}

impl<P: ProcessBackend> Supervisor<P> {
    pub fn new(backend: P, name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            backend,
            name: name.into(),
            args,
            sink: stdout_sink(),
            current: None,
            started: 0,
        }
    }

    pub fn with_sink(mut self, sink: LineSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a started instance is still alive (as far as we know).
    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(|p| !p.has_exited())
    }

    pub fn current(&self) -> Option<ProcessHandle> {
        self.current
            .as_ref()
            .filter(|p| !p.has_exited())
            .map(|p| p.handle)
    }

    /// Number of instances started so far.
    pub fn started_count(&self) -> u64 {
        self.started
    }

    /// Kill the current instance, if there is a live one.
    ///
    /// Returns once the process is gone. An error means the kill failed on
    /// a process believed to be alive; the caller cannot assume there is
    /// only one instance after that and must shut down.
    pub async fn kill_current(&mut self) -> Result<()> {
        let Some(mut active) = self.current.take() else {
            return Ok(());
        };
        if active.has_exited() {
            debug!(name = %self.name, instance = active.handle.instance, "previous instance already exited");
            return Ok(());
        }

        let Some(kill_tx) = active.kill_tx.take() else {
            // An earlier kill failed; dropping the waiter drops the child.
            warn!(name = %self.name, instance = active.handle.instance, "aborting waiter of unkillable instance");
            active.waiter.abort();
            return Ok(());
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        if kill_tx.send(reply_tx).is_err() {
            debug!(name = %self.name, "instance exited while requesting kill");
            return Ok(());
        }

        match reply_rx.await {
            Ok(Ok(())) => {
                let _ = (&mut active.waiter).await;
                info!(
                    name = %self.name,
                    instance = active.handle.instance,
                    pid = ?active.handle.pid,
                    "previous instance killed"
                );
                Ok(())
            }
            Ok(Err(source)) => {
                let err = ReloadrError::Kill {
                    name: self.name.clone(),
                    source,
                };
                // Still believed alive.
                self.current = Some(active);
                Err(err)
            }
            Err(_) => {
                debug!(name = %self.name, "waiter finished before answering kill request");
                Ok(())
            }
        }
    }

    /// Spawn a new instance and return without waiting for it.
    ///
    /// Stdout is streamed line by line as it arrives; stderr is buffered and
    /// dumped once the pipe closes. Refuses to start while a previous
    /// instance is still alive.
    pub fn start_new(&mut self) -> Result<ProcessHandle> {
        if self.is_running() {
            return Err(ReloadrError::InstanceStillRunning(self.name.clone()));
        }
        self.current = None;

        let spawned = match self.backend.spawn(&self.name, &self.args) {
            Ok(s) => s,
            Err(source) => {
                (self.sink)(status(format!(
                    "ERROR - Unable to start application: ( {} )",
                    self.name
                )));
                return Err(ReloadrError::Spawn {
                    name: self.name.clone(),
                    source,
                });
            }
        };

        self.started += 1;
        let handle = ProcessHandle {
            pid: spawned.pid,
            instance: self.started,
        };

        if let Some(stdout) = spawned.stdout {
            let name = self.name.clone();
            let sink = self.sink.clone();
            tokio::spawn(async move {
                if let Err(e) = stream_lines(stdout, &name, &sink).await {
                    debug!(name = %name, error = %e, "stdout pump ended with error");
                }
            });
        }

        if let Some(stderr) = spawned.stderr {
            let name = self.name.clone();
            let sink = self.sink.clone();
            tokio::spawn(async move {
                match buffer_all(stderr).await {
                    Ok(text) => {
                        let lines = diagnostic_lines(&name, &text);
                        if !lines.is_empty() {
                            sink(status(format!("( {name} ) wrote to stderr:")));
                            for line in lines {
                                sink(line);
                            }
                        }
                    }
                    Err(e) => debug!(name = %name, error = %e, "stderr pump ended with error"),
                }
            });
        }

        let (kill_tx, kill_rx) = oneshot::channel();
        let waiter = tokio::spawn(supervise(spawned.child, kill_rx, self.name.clone(), handle));

        info!(name = %self.name, instance = handle.instance, pid = ?handle.pid, "managed process started");
        (self.sink)(status(format!("( {} ) - Started and running...", self.name)));

        self.current = Some(ActiveProcess {
            handle,
            kill_tx: Some(kill_tx),
            waiter,
        });

        Ok(handle)
    }
}

/// Owns one child until it exits or is killed.
async fn supervise(
    mut child: Box<dyn ChildControl>,
    mut kill_rx: oneshot::Receiver<KillReply>,
    name: String,
    handle: ProcessHandle,
) {
    tokio::select! {
        biased;

        outcome = child.wait() => {
            // Only logged.
            match outcome {
                Ok(outcome) => debug!(name = %name, instance = handle.instance, %outcome, "managed process exited"),
                Err(e) => debug!(name = %name, instance = handle.instance, error = %e, "waiting on managed process failed"),
            }
            return;
        }

        request = &mut kill_rx => {
            match request {
                Ok(reply) => {
                    let result = child.kill().await;
                    let failed = result.is_err();
                    let _ = reply.send(result);
                    if !failed {
                        return;
                    }
                }
                Err(_) => {
                    // Supervisor dropped: take the child down with it.
                    if let Err(e) = child.kill().await {
                        warn!(name = %name, instance = handle.instance, error = %e, "failed to kill orphaned managed process");
                    }
                    return;
                }
            }
        }
    }

    // Kill failed; keep reaping so the process is not left as a zombie.
    let _ = child.wait().await;
}
