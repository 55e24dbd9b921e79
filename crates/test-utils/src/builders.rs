#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use reloadr::config::Settings;

/// Builder for `Settings` to simplify test setup.
///
/// Defaults: program `app`, build command `true`, everything rooted at
/// `.`, watching `.txt` with a 250ms debounce.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings {
                program_name: "app".to_string(),
                program_args: vec![],
                build_command: vec!["true".to_string()],
                build_dir: PathBuf::from("."),
                watch_root: PathBuf::from("."),
                extensions: vec![".txt".to_string()],
                debounce: Duration::from_millis(250),
                ignore: vec![],
            },
        }
    }

    pub fn program(mut self, name: &str) -> Self {
        self.settings.program_name = name.to_string();
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.settings.program_args.push(arg.to_string());
        self
    }

    pub fn build_command(mut self, cmd: &str) -> Self {
        self.settings.build_command = cmd.split_whitespace().map(str::to_string).collect();
        self
    }

    pub fn build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.build_dir = dir.into();
        self
    }

    pub fn watch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.watch_root = dir.into();
        self
    }

    pub fn extensions(mut self, exts: &[&str]) -> Self {
        self.settings.extensions = exts.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.settings.debounce = Duration::from_millis(ms);
        self
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.settings.ignore.push(pattern.to_string());
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
