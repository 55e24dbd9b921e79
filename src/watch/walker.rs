// src/watch/walker.rs

//! Startup directory discovery.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{ReloadrError, Result};
use crate::watch::patterns::IgnoreSet;

/// Walk `root` once and return every directory beneath it, root included.
///
/// Files and symlinks are skipped (symlinked directories are not followed).
/// Ignored directories are pruned together with their whole subtree.
/// Unreadable entries are logged and skipped; a missing root is an error.
pub fn collect_watch_dirs(root: &Path, ignore: &IgnoreSet) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(ReloadrError::ConfigError(format!(
            "watch root {:?} is not a directory",
            root
        )));
    }

    let mut dirs = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !ignore.is_ignored(entry.path()));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry while walking watch root");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            debug!(dir = ?entry.path(), "discovered directory");
            dirs.push(entry.into_path());
        }
    }

    Ok(dirs)
}
