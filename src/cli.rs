// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Overrides;

/// Command-line arguments for `reloadr`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "reloadr",
    version,
    about = "Rebuild and restart a program whenever its sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML).
    ///
    /// Default: `Reloadr.toml` in the current directory, if it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Name (or path) of the program to run after each successful build.
    ///
    /// Default: the build directory's name.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Build command, split on whitespace (e.g. "go install").
    #[arg(long, value_name = "CMD")]
    pub build_cmd: Option<String>,

    /// Working directory for the build command.
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Root of the source tree to watch.
    #[arg(long, value_name = "DIR")]
    pub watch_root: Option<PathBuf>,

    /// Watched file suffix; repeat for several (e.g. -e .go -e .tmpl).
    #[arg(short = 'e', long = "ext", value_name = "SUFFIX")]
    pub extensions: Vec<String>,

    /// Minimum time between two accepted changes, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Glob (relative to the watch root) of paths never to watch; repeatable.
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RELOADR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve settings and list watched directories, but build nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Arguments passed to the managed program.
    #[arg(last = true, value_name = "ARGS")]
    pub program_args: Vec<String>,
}

impl CliArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            program_name: self.name.clone(),
            program_args: self.program_args.clone(),
            build_command: self
                .build_cmd
                .as_ref()
                .map(|cmd| cmd.split_whitespace().map(str::to_string).collect()),
            build_dir: self.build_dir.clone(),
            watch_root: self.watch_root.clone(),
            extensions: self.extensions.clone(),
            debounce_ms: self.debounce_ms,
            ignore: self.ignore.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
