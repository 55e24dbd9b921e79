// src/config/settings.rs

//! Final, merged settings.
//!
//! Precedence for every value: CLI override, then config file, then the
//! built-in default. The result is validated once and never mutated.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::model::ConfigFile;
use crate::config::validate::{
    validate_build_command, validate_extensions, validate_ignore_patterns,
    validate_program_name,
};
use crate::errors::{ReloadrError, Result};

/// Debounce window used when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Values supplied on the command line. Empty / `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub program_name: Option<String>,
    pub program_args: Vec<String>,
    pub build_command: Option<Vec<String>>,
    pub build_dir: Option<PathBuf>,
    pub watch_root: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub debounce_ms: Option<u64>,
    /// Appended to the config file's ignore list.
    pub ignore: Vec<String>,
}

/// Everything the engine needs, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub program_name: String,
    pub program_args: Vec<String>,
    pub build_command: Vec<String>,
    pub build_dir: PathBuf,
    pub watch_root: PathBuf,
    pub extensions: Vec<String>,
    pub debounce: Duration,
    pub ignore: Vec<String>,
}

impl Settings {
    pub fn resolve(file: ConfigFile, overrides: Overrides) -> Result<Self> {
        let build_dir = overrides.build_dir.unwrap_or(file.build.dir);
        let build_command = overrides.build_command.unwrap_or(file.build.command);

        let program_name = match overrides.program_name.or(file.program.name) {
            Some(name) => name,
            None => derive_program_name(&build_dir).ok_or_else(|| {
                ReloadrError::ConfigError(format!(
                    "cannot derive a program name from build directory {:?}; pass --name",
                    build_dir
                ))
            })?,
        };

        let program_args = if overrides.program_args.is_empty() {
            file.program.args
        } else {
            overrides.program_args
        };

        let extensions = if overrides.extensions.is_empty() {
            file.watch.extensions
        } else {
            overrides.extensions
        };

        let debounce = Duration::from_millis(
            overrides.debounce_ms.unwrap_or(file.watch.debounce_ms),
        );

        let mut ignore = file.watch.ignore;
        ignore.extend(overrides.ignore);

        validate_program_name(&program_name)?;
        validate_build_command(&build_command)?;
        validate_extensions(&extensions)?;
        validate_ignore_patterns(&ignore)?;

        Ok(Self {
            program_name,
            program_args,
            build_command,
            build_dir,
            watch_root: overrides.watch_root.unwrap_or(file.watch.root),
            extensions,
            debounce,
            ignore,
        })
    }

    /// Build command rendered for messages, e.g. `go install`.
    pub fn build_command_line(&self) -> String {
        self.build_command.join(" ")
    }
}

/// Name of the directory the build runs in. Compiled Go programs (the
/// default toolchain) are named after it.
fn derive_program_name(build_dir: &Path) -> Option<String> {
    let named = match build_dir.file_name() {
        Some(name) => Some(name.to_os_string()),
        None => build_dir
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_os_string())),
    };
    named.map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_values_take_precedence_over_file() -> Result<()> {
        let mut file = ConfigFile::default();
        file.program.name = Some("from-file".into());
        file.watch.debounce_ms = 400;

        let settings = Settings::resolve(
            file,
            Overrides {
                program_name: Some("from-cli".into()),
                extensions: vec![".rs".into()],
                ..Overrides::default()
            },
        )?;

        assert_eq!(settings.program_name, "from-cli");
        assert_eq!(settings.extensions, vec![".rs".to_string()]);
        assert_eq!(settings.debounce, Duration::from_millis(400));
        Ok(())
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() -> Result<()> {
        let mut file = ConfigFile::default();
        file.build.dir = PathBuf::from("projects/webapp");

        let settings = Settings::resolve(file, Overrides::default())?;

        assert_eq!(settings.program_name, "webapp");
        assert_eq!(settings.debounce, DEFAULT_DEBOUNCE);
        assert_eq!(settings.build_command_line(), "go install");
        assert_eq!(settings.watch_root, PathBuf::from("."));
        assert_eq!(settings.extensions.len(), 4);
        Ok(())
    }

    #[test]
    fn ignore_lists_are_merged() -> Result<()> {
        let mut file = ConfigFile::default();
        file.program.name = Some("app".into());
        file.watch.ignore = vec![".git".into()];

        let settings = Settings::resolve(
            file,
            Overrides {
                ignore: vec!["vendor/**".into()],
                ..Overrides::default()
            },
        )?;

        assert_eq!(settings.ignore, vec![".git".to_string(), "vendor/**".to_string()]);
        Ok(())
    }

    #[test]
    fn empty_cli_build_command_is_rejected() {
        let mut file = ConfigFile::default();
        file.program.name = Some("app".into());

        let result = Settings::resolve(
            file,
            Overrides {
                build_command: Some(Vec::new()),
                ..Overrides::default()
            },
        );
        assert!(matches!(result, Err(ReloadrError::ConfigError(_))));
    }
}
