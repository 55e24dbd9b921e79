// src/config/mod.rs

//! Configuration loading and validation for reloadr.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load an optional config file from disk (`loader.rs`).
//! - Validate basic invariants like a non-empty extension set (`validate.rs`).
//! - Merge file values with CLI overrides into the final, immutable
//!   [`Settings`] the engine is constructed from (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_optional};
pub use model::{BuildSection, ConfigFile, ProgramSection, RawConfigFile, WatchSection};
pub use settings::{Overrides, Settings, DEFAULT_DEBOUNCE};
