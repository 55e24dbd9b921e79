// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::Result;
use crate::watch::path_utils::relative_str;

/// Compiled `ignore` globs, evaluated against paths relative to the watch
/// root.
///
/// A path is ignored when it, or any of its ancestors below the root,
/// matches one of the patterns. So `node_modules` hides the whole subtree.
#[derive(Clone)]
pub struct IgnoreSet {
    root: PathBuf,
    set: Option<GlobSet>,
}

impl fmt::Debug for IgnoreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreSet")
            .field("root", &self.root)
            .field("patterns", &self.set.as_ref().map_or(0, |s| s.len()))
            .finish()
    }
}

impl IgnoreSet {
    pub fn new(root: impl Into<PathBuf>, patterns: &[String]) -> Result<Self> {
        let set = if patterns.is_empty() {
            None
        } else {
            Some(build_globset(patterns)?)
        };
        Ok(Self {
            root: root.into(),
            set,
        })
    }

    /// An ignore set that never matches.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            set: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_none()
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(set) = &self.set else {
            return false;
        };
        let Some(rel) = relative_str(&self.root, path) else {
            return false;
        };
        Path::new(&rel)
            .ancestors()
            .filter(|p| !p.as_os_str().is_empty())
            .any(|p| set.is_match(p))
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> IgnoreSet {
        let patterns: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        IgnoreSet::new("/project", &patterns).unwrap()
    }

    #[test]
    fn directory_pattern_hides_descendants() {
        let ignore = set(&["node_modules"]);
        assert!(ignore.is_ignored(Path::new("/project/node_modules")));
        assert!(ignore.is_ignored(Path::new("/project/node_modules/pkg/index.html")));
        assert!(!ignore.is_ignored(Path::new("/project/src/main.go")));
    }

    #[test]
    fn wildcard_patterns_match_nested_dirs() {
        let ignore = set(&["**/.git"]);
        assert!(ignore.is_ignored(Path::new("/project/.git/HEAD")));
        assert!(ignore.is_ignored(Path::new("/project/vendor/lib/.git")));
    }

    #[test]
    fn empty_set_never_matches() {
        let ignore = IgnoreSet::empty("/project");
        assert!(ignore.is_empty());
        assert!(!ignore.is_ignored(Path::new("/project/anything")));
    }

    #[test]
    fn root_itself_is_never_ignored() {
        let ignore = set(&["*"]);
        assert!(!ignore.is_ignored(Path::new("/project")));
        assert!(ignore.is_ignored(Path::new("/project/src")));
    }
}
