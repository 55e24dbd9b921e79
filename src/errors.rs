// src/errors.rs

//! Crate-wide error types.
//!
//! [`ReloadrError`] covers everything a public operation can fail with.
//! [`FatalError`] is the payload carried by the shutdown signal: it always
//! names the stage that failed so the last line the operator sees says
//! where things went wrong.

use std::fmt;

use thiserror::Error;

use crate::types::Stage;

#[derive(Error, Debug)]
pub enum ReloadrError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error("Invalid ignore pattern: {0}")]
    GlobError(#[from] globset::Error),

    #[error("unable to execute build command `{command}`: {source}")]
    BuildLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to kill the previous instance of `{name}`: {source}")]
    Kill {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to start `{name}`: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to start `{0}` while a previous instance is still running")]
    InstanceStillRunning(String),

    #[error(transparent)]
    Fatal(#[from] FatalError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ReloadrError>;

/// A condition that terminates the supervisor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct FatalError {
    pub stage: Stage,
    pub message: String,
}

impl FatalError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.message)
    }
}
