// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the build command and
//! the managed program, using `tokio::process::Command`.
//!
//! - [`backend`] provides the `BuildBackend` / `ProcessBackend` traits and
//!   their production implementations; tests replace them with fakes.
//! - [`builder`] runs one build and classifies the result.
//! - [`supervisor`] owns the single current managed process: kill, start,
//!   and the background waiter per instance.
//! - [`output`] holds the stdout/stderr pumps and operator-facing lines.

pub mod backend;
pub mod builder;
pub mod output;
pub mod supervisor;

pub use backend::{
    BoxFuture, BuildBackend, BuildOutput, ChildControl, CommandBuildBackend, ExitOutcome,
    OutputReader, ProcessBackend, SpawnedProcess, TokioProcessBackend,
};
pub use builder::{BuildResult, Builder};
pub use output::{null_sink, stdout_sink, LineSink};
pub use supervisor::{ProcessHandle, Supervisor};
