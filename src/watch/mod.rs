// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Discovering every directory under the watch root at startup.
//! - Registering those directories with a cross-platform watcher (`notify`).
//! - Turning raw notifications into accepted change events (write kind,
//!   watched suffix, not ignored, outside the debounce window).
//!
//! It knows nothing about building or running; it only produces events.

pub mod filter;
pub mod path_utils;
pub mod patterns;
pub mod walker;
pub mod watcher;

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Settings;

pub use filter::{ChangeEvent, ChangeFilter, RawChange, Verdict};
pub use patterns::IgnoreSet;
pub use walker::collect_watch_dirs;
pub use watcher::{start_watch, ChangeStream, ErrorStream, Watch, WatcherHandle};

/// What to watch and how to filter it. Created once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSession {
    pub root: PathBuf,
    pub extensions: Vec<String>,
    pub debounce: Duration,
    pub ignore: Vec<String>,
}

impl WatchSession {
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>, debounce: Duration) -> Self {
        Self {
            root: root.into(),
            extensions,
            debounce,
            ignore: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            root: settings.watch_root.clone(),
            extensions: settings.extensions.clone(),
            debounce: settings.debounce,
            ignore: settings.ignore.clone(),
        }
    }
}
