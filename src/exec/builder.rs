// src/exec/builder.rs

//! The builder: one synchronous (awaited) run of the build command.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::{ReloadrError, Result};
use crate::exec::backend::BuildBackend;
use crate::exec::output::{diagnostic_lines, status, stdout_sink, LineSink};

/// Outcome of a build that did start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    /// Everything the build command wrote to stderr.
    pub diagnostics: String,
}

pub struct Builder<B: BuildBackend> {
    backend: B,
    working_dir: PathBuf,
    name: String,
    sink: LineSink,
}

impl<B: BuildBackend> std::fmt::Debug for Builder<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("command", &self.backend.describe())
            .field("working_dir", &self.working_dir)
            .field("name", &self.name)
            .finish()
    }
}

impl<B: BuildBackend> Builder<B> {
    pub fn new(backend: B, working_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            backend,
            working_dir: working_dir.into(),
            name: name.into(),
            sink: stdout_sink(),
        }
    }

    pub fn with_sink(mut self, sink: LineSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Run the build command to completion.
    ///
    /// - `Ok(result)` with `result.success == false` is a build failure:
    ///   recoverable, the diagnostics have already been reported.
    /// - `Err(ReloadrError::BuildLaunch)` means the command could not be
    ///   started at all and the caller must treat it as fatal.
    pub async fn build(&self) -> Result<BuildResult> {
        (self.sink)(status(format!("Building {}...", self.name)));

        let output = self
            .backend
            .invoke(&self.working_dir)
            .await
            .map_err(|source| ReloadrError::BuildLaunch {
                command: self.backend.describe(),
                source,
            })?;

        let result = BuildResult {
            success: output.success,
            exit_code: output.exit_code,
            diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if result.success {
            info!(name = %self.name, "build succeeded");
            (self.sink)(status("Done..."));
        } else {
            warn!(name = %self.name, exit_code = ?result.exit_code, "build failed");
            (self.sink)(status(format!(
                "ERROR - Unable to build/install application: ( {} )",
                self.name
            )));
            for line in diagnostic_lines(&self.name, &result.diagnostics) {
                (self.sink)(line);
            }
        }

        Ok(result)
    }
}
