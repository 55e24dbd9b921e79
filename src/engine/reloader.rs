// src/engine/reloader.rs

//! Production change handler: build, kill the previous instance, start a
//! new one.

use tracing::{error, info};

use crate::config::Settings;
use crate::errors::FatalError;
use crate::exec::output::status;
use crate::exec::{
    BoxFuture, BuildBackend, Builder, CommandBuildBackend, LineSink, ProcessBackend, Supervisor,
    TokioProcessBackend, stdout_sink,
};
use crate::types::Stage;

use super::core::{CycleCommand, CycleInput, CycleMachine, CycleOutcome};
use super::{ChangeHandler, ShutdownSignal, Trigger};

pub struct Reloader<B: BuildBackend, P: ProcessBackend> {
    machine: CycleMachine,
    builder: Builder<B>,
    supervisor: Supervisor<P>,
    sink: LineSink,
    last_outcome: Option<CycleOutcome>,
}

impl<B: BuildBackend, P: ProcessBackend> std::fmt::Debug for Reloader<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reloader")
            .field("machine", &self.machine)
            .field("builder", &self.builder)
            .field("supervisor", &self.supervisor)
            .finish()
    }
}

impl Reloader<CommandBuildBackend, TokioProcessBackend> {
    /// Real build command and real processes, as configured.
    pub fn from_settings(settings: &Settings) -> Self {
        let builder = Builder::new(
            CommandBuildBackend::new(&settings.build_command),
            settings.build_dir.clone(),
            settings.program_name.clone(),
        );
        let supervisor = Supervisor::new(
            TokioProcessBackend,
            settings.program_name.clone(),
            settings.program_args.clone(),
        );
        Self::new(builder, supervisor)
    }
}

impl<B: BuildBackend, P: ProcessBackend> Reloader<B, P> {
    pub fn new(builder: Builder<B>, supervisor: Supervisor<P>) -> Self {
        Self {
            machine: CycleMachine::new(),
            builder,
            supervisor,
            sink: stdout_sink(),
            last_outcome: None,
        }
    }

    /// Route status lines (and the builder's and supervisor's output) to
    /// `sink`.
    pub fn with_sink(self, sink: LineSink) -> Self {
        Self {
            machine: self.machine,
            builder: self.builder.with_sink(sink.clone()),
            supervisor: self.supervisor.with_sink(sink.clone()),
            sink,
            last_outcome: self.last_outcome,
        }
    }

    pub fn supervisor(&self) -> &Supervisor<P> {
        &self.supervisor
    }

    pub fn machine(&self) -> &CycleMachine {
        &self.machine
    }

    pub fn last_outcome(&self) -> Option<CycleOutcome> {
        self.last_outcome
    }

    /// Run one full orchestration cycle.
    ///
    /// Returns `Ok(None)` if no cycle could begin (already terminated or
    /// shutdown has fired) and `Err` for fatal failures, after which this
    /// reloader refuses further cycles.
    pub async fn run_cycle(
        &mut self,
        shutdown: &ShutdownSignal,
    ) -> Result<Option<CycleOutcome>, FatalError> {
        if shutdown.is_fired() {
            self.machine.terminate();
        }

        let mut command = self.machine.step(CycleInput::Triggered);
        loop {
            command = match command {
                CycleCommand::Build => match self.builder.build().await {
                    Ok(result) if result.success => self.machine.step(CycleInput::BuildSucceeded),
                    Ok(_) => self.machine.step(CycleInput::BuildFailed),
                    Err(e) => self.machine.step(CycleInput::BuildLaunchFailed(FatalError::new(
                        Stage::Build,
                        e.to_string(),
                    ))),
                },

                CycleCommand::KillPrevious => match self.supervisor.kill_current().await {
                    Ok(()) => self.machine.step(CycleInput::Killed),
                    Err(e) => self.machine.step(CycleInput::KillFailed(FatalError::new(
                        Stage::Kill,
                        format!(
                            "{e}. Please manually kill the application instance and try again"
                        ),
                    ))),
                },

                CycleCommand::StartNew => {
                    if shutdown.is_fired() {
                        // Shutdown fired mid-build; do not leave a new instance behind.
                        self.machine.terminate();
                        return Ok(None);
                    }
                    match self.supervisor.start_new() {
                        Ok(_) => self.machine.step(CycleInput::Started),
                        Err(e) => {
                            error!(error = %e, "failed to start managed process");
                            self.machine.step(CycleInput::StartFailed)
                        }
                    }
                }

                CycleCommand::Complete(outcome) => {
                    info!(?outcome, "orchestration cycle complete");
                    self.last_outcome = Some(outcome);
                    return Ok(Some(outcome));
                }

                CycleCommand::Terminate(fatal) => {
                    error!(stage = %fatal.stage, error = %fatal.message, "fatal failure; terminating");
                    return Err(fatal);
                }

                CycleCommand::Halt => return Ok(None),
            };
        }
    }

    fn announce(&self, trigger: &Trigger) {
        if let Trigger::Change(event) = trigger {
            (self.sink)("--------------------------------------------------".to_string());
            (self.sink)(status(format!("Change detected --> {}", event.path.display())));
        }
    }
}

impl<B: BuildBackend, P: ProcessBackend> ChangeHandler for Reloader<B, P> {
    fn on_change<'a>(
        &'a mut self,
        trigger: Trigger,
        shutdown: &'a ShutdownSignal,
    ) -> BoxFuture<'a, Result<(), FatalError>> {
        Box::pin(async move {
            self.announce(&trigger);
            self.run_cycle(shutdown).await?;
            if !self.machine.is_terminated() && !shutdown.is_fired() {
                (self.sink)(status("Watching for changes..."));
            }
            Ok(())
        })
    }

    fn on_error(&mut self, error: &FatalError) {
        self.machine.terminate();
        (self.sink)(status(format!(
            "ERROR - Detecting file changes: {}. Reloadr has now terminated.",
            error.message
        )));
    }

    fn shutdown(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.machine.terminate();
            if let Err(e) = self.supervisor.kill_current().await {
                error!(error = %e, "failed to stop managed process during shutdown");
            }
        })
    }
}
