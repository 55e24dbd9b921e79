// src/engine/core.rs

//! Pure orchestration state machine.
//!
//! [`CycleMachine`] consumes [`CycleInput`]s and returns the next
//! [`CycleCommand`] for the IO shell ([`crate::engine::Reloader`]) to carry
//! out. It has no channels, no Tokio types and performs no IO, so the
//! sequencing rules can be unit tested directly:
//!
//! ```text
//! Idle -> Building -> KillingPrevious -> Starting -> Idle
//!                                    \-> (skip)   -> Idle
//! any  -> Terminated   (launch failure of the build, kill failure)
//! ```
//!
//! The kill step runs whether or not the build succeeded, so a failed build
//! always leaves zero running instances.

use tracing::{debug, warn};

use crate::errors::FatalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Building,
    KillingPrevious { start_after: bool },
    Starting,
    Terminated,
}

/// Facts reported back by the IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleInput {
    /// An accepted change (or startup) asks for a new cycle.
    Triggered,
    BuildSucceeded,
    /// The build ran and exited non-zero.
    BuildFailed,
    /// The build command could not be started.
    BuildLaunchFailed(FatalError),
    Killed,
    KillFailed(FatalError),
    /// The new instance was spawned (it keeps running in the background).
    Started,
    /// The new instance could not be spawned. Not fatal.
    StartFailed,
}

/// What the IO shell must do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleCommand {
    Build,
    KillPrevious,
    StartNew,
    /// The cycle is over; the machine is back in `Idle`.
    Complete(CycleOutcome),
    /// Fire the shutdown signal with this error. The machine is terminated.
    Terminate(FatalError),
    /// Nothing to do (terminated, or an input that does not fit the state).
    Halt,
}

/// How a completed cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Build succeeded, previous instance (if any) killed, new one started.
    Restarted,
    /// Build failed; previous instance killed, nothing started.
    BuildFailed,
    /// Build succeeded but the new instance could not be spawned.
    StartFailed,
}

#[derive(Debug)]
pub struct CycleMachine {
    state: CycleState,
    completed: u64,
}

impl Default for CycleMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleMachine {
    pub fn new() -> Self {
        Self {
            state: CycleState::Idle,
            completed: 0,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == CycleState::Terminated
    }

    /// Number of cycles that reached `Complete`.
    pub fn completed_cycles(&self) -> u64 {
        self.completed
    }

    /// Force the terminal state (e.g. the shutdown signal fired elsewhere).
    pub fn terminate(&mut self) {
        self.state = CycleState::Terminated;
    }

    pub fn step(&mut self, input: CycleInput) -> CycleCommand {
        use CycleInput as I;
        use CycleState as S;

        let (next, command) = match (self.state, input) {
            (S::Terminated, input) => {
                debug!(?input, "cycle machine terminated; ignoring input");
                (S::Terminated, CycleCommand::Halt)
            }

            (S::Idle, I::Triggered) => (S::Building, CycleCommand::Build),

            (S::Building, I::BuildSucceeded) => (
                S::KillingPrevious { start_after: true },
                CycleCommand::KillPrevious,
            ),
            (S::Building, I::BuildFailed) => (
                S::KillingPrevious { start_after: false },
                CycleCommand::KillPrevious,
            ),
            (S::Building, I::BuildLaunchFailed(err)) => {
                (S::Terminated, CycleCommand::Terminate(err))
            }

            (S::KillingPrevious { start_after: true }, I::Killed) => {
                (S::Starting, CycleCommand::StartNew)
            }
            (S::KillingPrevious { start_after: false }, I::Killed) => {
                self.completed += 1;
                (S::Idle, CycleCommand::Complete(CycleOutcome::BuildFailed))
            }
            (S::KillingPrevious { .. }, I::KillFailed(err)) => {
                (S::Terminated, CycleCommand::Terminate(err))
            }

            (S::Starting, I::Started) => {
                self.completed += 1;
                (S::Idle, CycleCommand::Complete(CycleOutcome::Restarted))
            }
            (S::Starting, I::StartFailed) => {
                self.completed += 1;
                (S::Idle, CycleCommand::Complete(CycleOutcome::StartFailed))
            }

            (state, input) => {
                warn!(?state, ?input, "input does not apply to current cycle state");
                (state, CycleCommand::Halt)
            }
        };

        debug!(from = ?self.state, to = ?next, ?command, "cycle transition");
        self.state = next;
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stage;

    #[test]
    fn successful_cycle_builds_kills_then_starts() {
        let mut m = CycleMachine::new();
        assert_eq!(m.step(CycleInput::Triggered), CycleCommand::Build);
        assert_eq!(m.step(CycleInput::BuildSucceeded), CycleCommand::KillPrevious);
        assert_eq!(m.step(CycleInput::Killed), CycleCommand::StartNew);
        assert_eq!(
            m.step(CycleInput::Started),
            CycleCommand::Complete(CycleOutcome::Restarted)
        );
        assert_eq!(m.state(), CycleState::Idle);
        assert_eq!(m.completed_cycles(), 1);
    }

    #[test]
    fn failed_build_still_kills_but_skips_start() {
        let mut m = CycleMachine::new();
        m.step(CycleInput::Triggered);
        assert_eq!(m.step(CycleInput::BuildFailed), CycleCommand::KillPrevious);
        assert_eq!(
            m.step(CycleInput::Killed),
            CycleCommand::Complete(CycleOutcome::BuildFailed)
        );
        assert_eq!(m.state(), CycleState::Idle);
    }

    #[test]
    fn build_launch_failure_terminates() {
        let mut m = CycleMachine::new();
        m.step(CycleInput::Triggered);
        let err = FatalError::new(Stage::Build, "go: not found");
        assert_eq!(
            m.step(CycleInput::BuildLaunchFailed(err.clone())),
            CycleCommand::Terminate(err)
        );
        assert!(m.is_terminated());
    }

    #[test]
    fn kill_failure_terminates_without_starting() {
        let mut m = CycleMachine::new();
        m.step(CycleInput::Triggered);
        m.step(CycleInput::BuildSucceeded);
        let err = FatalError::new(Stage::Kill, "EPERM");
        assert_eq!(
            m.step(CycleInput::KillFailed(err.clone())),
            CycleCommand::Terminate(err)
        );
        assert_eq!(m.step(CycleInput::Killed), CycleCommand::Halt);
    }

    #[test]
    fn start_failure_returns_to_idle() {
        let mut m = CycleMachine::new();
        m.step(CycleInput::Triggered);
        m.step(CycleInput::BuildSucceeded);
        m.step(CycleInput::Killed);
        assert_eq!(
            m.step(CycleInput::StartFailed),
            CycleCommand::Complete(CycleOutcome::StartFailed)
        );
        assert_eq!(m.step(CycleInput::Triggered), CycleCommand::Build);
    }

    #[test]
    fn no_cycle_begins_after_termination() {
        let mut m = CycleMachine::new();
        m.terminate();
        assert_eq!(m.step(CycleInput::Triggered), CycleCommand::Halt);
        assert_eq!(m.completed_cycles(), 0);
    }

    #[test]
    fn out_of_order_input_is_ignored() {
        let mut m = CycleMachine::new();
        assert_eq!(m.step(CycleInput::Killed), CycleCommand::Halt);
        assert_eq!(m.state(), CycleState::Idle);
    }
}
