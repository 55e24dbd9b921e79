// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;
pub mod watch;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{load_optional, Settings};
use crate::engine::{Reloader, Runtime, ShutdownCause, ShutdownSignal};
use crate::errors::FatalError;
use crate::types::Stage;
use crate::watch::{collect_watch_dirs, start_watch, IgnoreSet, WatchSession};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the directory watcher
/// - the reloader (builder + process supervisor)
/// - the orchestrator loop
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let file = load_optional(args.config.as_deref())?;
    let settings = Settings::resolve(file, args.overrides())?;
    debug!(?settings, "resolved settings");

    if args.dry_run {
        print_dry_run(&settings)?;
        return Ok(());
    }

    let session = WatchSession::from_settings(&settings);
    let watch = start_watch(&session)?;

    let shutdown = ShutdownSignal::new();

    // Ctrl-C -> graceful shutdown.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("interrupt received; shutting down");
                    shutdown.fire(ShutdownCause::Interrupted);
                }
                Err(e) => {
                    shutdown.fire_fatal(FatalError::new(
                        Stage::Signal,
                        format!("failed to listen for Ctrl+C: {e}"),
                    ));
                }
            }
        });
    }

    print_banner(&settings);
    info!(
        name = %settings.program_name,
        build = %settings.build_command_line(),
        "starting supervisor"
    );

    let reloader = Reloader::from_settings(&settings);
    let runtime = Runtime::from_watch(reloader, watch, shutdown);
    runtime.run().await?;
    Ok(())
}

fn print_banner(settings: &Settings) {
    println!();
    println!("-- RELOADR v{} --", env!("CARGO_PKG_VERSION"));
    println!("--------------------------------------------------");
    println!("Reloadr: Running and watching for changes...");
    println!("         On: {:?} files.", settings.extensions);
    println!("         In: {}", settings.watch_root.display());
    println!("--------------------------------------------------");
}

/// Print resolved settings and the directories that would be registered.
fn print_dry_run(settings: &Settings) -> Result<()> {
    println!("reloadr dry-run");
    println!("  program: {}", settings.program_name);
    if !settings.program_args.is_empty() {
        println!("  program args: {:?}", settings.program_args);
    }
    println!("  build: {}", settings.build_command_line());
    println!("  build dir: {}", settings.build_dir.display());
    println!("  extensions: {:?}", settings.extensions);
    println!("  debounce: {}ms", settings.debounce.as_millis());
    if !settings.ignore.is_empty() {
        println!("  ignore: {:?}", settings.ignore);
    }

    let root = settings
        .watch_root
        .canonicalize()
        .unwrap_or_else(|_| settings.watch_root.clone());
    let ignore = IgnoreSet::new(&root, &settings.ignore)?;
    let dirs = collect_watch_dirs(&root, &ignore)?;

    println!();
    println!("directories ({}):", dirs.len());
    for dir in dirs {
        println!("  - {}", dir.display());
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
