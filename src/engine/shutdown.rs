// src/engine/shutdown.rs

//! The shutdown signal: single-fire, idempotent, observable by every loop.

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::FatalError;

/// Why the supervisor is stopping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownCause {
    /// Operator asked us to stop (Ctrl-C).
    Interrupted,
    Fatal(FatalError),
}

/// Cloneable handle to the process-wide shutdown signal.
///
/// The first [`fire`](Self::fire) wins: its cause is the one reported, and
/// later calls are no-ops. The signal never resets.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
    cause: Arc<OnceLock<ShutdownCause>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal. Returns `true` only for the call that actually
    /// fired it.
    pub fn fire(&self, cause: ShutdownCause) -> bool {
        let first = self.cause.set(cause.clone()).is_ok();
        if first {
            info!(?cause, "shutdown signal fired");
        } else {
            debug!(?cause, "shutdown signal already fired; ignoring");
        }
        self.token.cancel();
        first
    }

    pub fn fire_fatal(&self, error: FatalError) -> bool {
        self.fire(ShutdownCause::Fatal(error))
    }

    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The winning cause, once fired.
    pub fn cause(&self) -> Option<&ShutdownCause> {
        self.cause.get()
    }

    /// Resolves once the signal has fired (immediately if it already has).
    pub async fn fired(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Stage;

    #[test]
    fn first_cause_wins() {
        let signal = ShutdownSignal::new();
        let build = FatalError::new(Stage::Build, "go: not found");
        let watch = FatalError::new(Stage::Watch, "queue overflow");

        assert!(signal.fire_fatal(build.clone()));
        assert!(!signal.fire_fatal(watch));

        assert!(signal.is_fired());
        assert_eq!(signal.cause(), Some(&ShutdownCause::Fatal(build)));
    }

    #[test]
    fn clones_share_state() {
        let signal = ShutdownSignal::new();
        let other = signal.clone();
        other.fire(ShutdownCause::Interrupted);
        assert!(signal.is_fired());
        assert_eq!(signal.cause(), Some(&ShutdownCause::Interrupted));
    }

    #[tokio::test]
    async fn racing_fires_resolve_to_one_cause() {
        let signal = ShutdownSignal::new();
        let mut tasks = Vec::new();
        for i in 0..8 {
            let s = signal.clone();
            tasks.push(tokio::spawn(async move {
                s.fire_fatal(FatalError::new(Stage::Kill, format!("racer {i}")))
            }));
        }

        let mut winners = 0;
        for t in tasks {
            if t.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        signal.fired().await;
    }
}
