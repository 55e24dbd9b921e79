// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw model.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] to
/// get a [`ConfigFile`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(path)?;
    ConfigFile::try_from(raw)
}

/// Load `path` if given, otherwise the default config file if it exists.
///
/// An explicitly requested file must exist; a missing default file just
/// means "use built-in defaults".
pub fn load_optional(path: Option<&Path>) -> Result<ConfigFile> {
    match path {
        Some(p) => load_and_validate(p),
        None => {
            let default = default_config_path();
            if default.is_file() {
                load_and_validate(default)
            } else {
                Ok(ConfigFile::default())
            }
        }
    }
}

/// `Reloadr.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Reloadr.toml")
}
