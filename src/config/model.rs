// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [program]
/// name = "myserver"
/// args = ["--port", "8080"]
///
/// [build]
/// command = ["go", "install"]
/// dir = "."
///
/// [watch]
/// root = "."
/// extensions = [".go", ".html", ".tpl", ".tmpl"]
/// debounce_ms = 250
/// ignore = [".git", "node_modules"]
/// ```
///
/// All sections are optional and have reasonable defaults. This type is
/// only the deserialization target; use [`ConfigFile`] (obtained through
/// `TryFrom`) everywhere else.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub program: ProgramSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// A validated configuration file.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub program: ProgramSection,
    pub build: BuildSection,
    pub watch: WatchSection,
}

impl ConfigFile {
    /// Construct without validation. Callers must have validated the parts.
    pub(crate) fn new_unchecked(
        program: ProgramSection,
        build: BuildSection,
        watch: WatchSection,
    ) -> Self {
        Self {
            program,
            build,
            watch,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            ProgramSection::default(),
            BuildSection::default(),
            WatchSection::default(),
        )
    }
}

/// `[program]` section: the managed program.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramSection {
    /// Executable name (or path) spawned after each successful build.
    ///
    /// If `None`, the name is derived from the build directory.
    #[serde(default)]
    pub name: Option<String>,

    /// Extra arguments passed to the managed program.
    #[serde(default)]
    pub args: Vec<String>,
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Program followed by its arguments, e.g. `["go", "install"]`.
    #[serde(default = "default_build_command")]
    pub command: Vec<String>,

    /// Working directory for the build command.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            command: default_build_command(),
            dir: default_dir(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    #[serde(default = "default_dir")]
    pub root: PathBuf,

    /// File suffixes that count as relevant writes (exact, case-sensitive).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Glob patterns (relative to `root`) that are never watched.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            root: default_dir(),
            extensions: default_extensions(),
            debounce_ms: default_debounce_ms(),
            ignore: Vec::new(),
        }
    }
}

pub(crate) fn default_build_command() -> Vec<String> {
    vec!["go".to_string(), "install".to_string()]
}

pub(crate) fn default_extensions() -> Vec<String> {
    [".go", ".html", ".tpl", ".tmpl"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_debounce_ms() -> u64 {
    250
}
