// src/exec/backend.rs

//! Pluggable process backends.
//!
//! The builder and the supervisor talk to these traits instead of
//! `tokio::process` directly. Production code uses [`CommandBuildBackend`]
//! and [`TokioProcessBackend`]; tests can swap in scripted fakes that never
//! spawn an OS process (and, unlike real processes, can be told to fail a
//! kill).

use std::fmt;
use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tracing::debug;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A readable output pipe of a spawned process.
pub type OutputReader = Box<dyn AsyncRead + Send + Unpin>;

/// Raw result of one build command invocation that did start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stderr: Vec<u8>,
}

/// Runs the external build command.
pub trait BuildBackend: Send + Sync {
    /// Run the build in `working_dir` and wait for it to exit.
    ///
    /// `Err` means the command could not be started at all.
    fn invoke<'a>(&'a self, working_dir: &'a Path) -> BoxFuture<'a, io::Result<BuildOutput>>;

    /// Human-readable command line, for messages.
    fn describe(&self) -> String;
}

/// Build backend that runs a real command.
#[derive(Debug, Clone)]
pub struct CommandBuildBackend {
    program: String,
    args: Vec<String>,
}

impl CommandBuildBackend {
    /// `command` is the program followed by its arguments.
    pub fn new(command: &[String]) -> Self {
        let (program, args) = match command.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        Self { program, args }
    }
}

impl BuildBackend for CommandBuildBackend {
    fn invoke<'a>(&'a self, working_dir: &'a Path) -> BoxFuture<'a, io::Result<BuildOutput>> {
        Box::pin(async move {
            debug!(program = %self.program, args = ?self.args, dir = ?working_dir, "invoking build command");

            let output = Command::new(&self.program)
                .args(&self.args)
                .current_dir(working_dir)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output()
                .await?;

            Ok(BuildOutput {
                success: output.status.success(),
                exit_code: output.status.code(),
                stderr: output.stderr,
            })
        })
    }

    fn describe(&self) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }
}

/// How a managed process ended. Logged, never acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Exited(i32),
    Signalled,
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => ExitOutcome::Exited(code),
            None => ExitOutcome::Signalled,
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(code) => write!(f, "exit code {code}"),
            ExitOutcome::Signalled => f.write_str("terminated by signal"),
        }
    }
}

/// Control over a single spawned process.
pub trait ChildControl: Send {
    /// Resolve once the process has exited.
    fn wait(&mut self) -> BoxFuture<'_, io::Result<ExitOutcome>>;

    /// Forcibly terminate the process and reap it.
    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>>;
}

/// A freshly spawned managed process.
pub struct SpawnedProcess {
    pub pid: Option<u32>,
    pub stdout: Option<OutputReader>,
    pub stderr: Option<OutputReader>,
    pub child: Box<dyn ChildControl>,
}

impl fmt::Debug for SpawnedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnedProcess")
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}

/// Spawns the managed program.
pub trait ProcessBackend: Send + Sync {
    fn spawn(&self, name: &str, args: &[String]) -> io::Result<SpawnedProcess>;
}

/// Process backend on top of `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessBackend;

struct TokioChild(Child);

impl ChildControl for TokioChild {
    fn wait(&mut self) -> BoxFuture<'_, io::Result<ExitOutcome>> {
        Box::pin(async move { self.0.wait().await.map(ExitOutcome::from) })
    }

    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(async move { self.0.kill().await })
    }
}

impl ProcessBackend for TokioProcessBackend {
    fn spawn(&self, name: &str, args: &[String]) -> io::Result<SpawnedProcess> {
        let mut child = Command::new(name)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let pid = child.id();
        let stdout = child.stdout.take().map(|s| Box::new(s) as OutputReader);
        let stderr = child.stderr.take().map(|s| Box::new(s) as OutputReader);

        Ok(SpawnedProcess {
            pid,
            stdout,
            stderr,
            child: Box::new(TokioChild(child)),
        })
    }
}
