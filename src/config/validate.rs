// src/config/validate.rs

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ReloadrError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ReloadrError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.program, raw.build, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    if let Some(name) = &cfg.program.name {
        validate_program_name(name)?;
    }
    validate_build_command(&cfg.build.command)?;
    validate_extensions(&cfg.watch.extensions)?;
    validate_ignore_patterns(&cfg.watch.ignore)?;
    Ok(())
}

pub(crate) fn validate_program_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ReloadrError::ConfigError(
            "[program].name must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_build_command(command: &[String]) -> Result<()> {
    match command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(ReloadrError::ConfigError(
            "[build].command must name a program to run".to_string(),
        )),
    }
}

pub(crate) fn validate_extensions(extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        return Err(ReloadrError::ConfigError(
            "[watch].extensions must contain at least one suffix".to_string(),
        ));
    }
    if extensions.iter().any(|e| e.is_empty()) {
        return Err(ReloadrError::ConfigError(
            "[watch].extensions must not contain an empty suffix".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_ignore_patterns(patterns: &[String]) -> Result<()> {
    for pattern in patterns {
        Glob::new(pattern)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ConfigFile::try_from(RawConfigFile::default()).is_ok());
    }

    #[test]
    fn empty_extension_set_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.watch.extensions.clear();
        match ConfigFile::try_from(raw) {
            Err(ReloadrError::ConfigError(msg)) => assert!(msg.contains("extensions")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn empty_suffix_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.watch.extensions.push(String::new());
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(ReloadrError::ConfigError(_))
        ));
    }

    #[test]
    fn blank_build_command_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.build.command = vec!["  ".to_string()];
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(ReloadrError::ConfigError(_))
        ));
    }

    #[test]
    fn bad_ignore_glob_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.watch.ignore.push("a/[".to_string());
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(ReloadrError::GlobError(_))
        ));
    }
}
