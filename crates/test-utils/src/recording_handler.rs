use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reloadr::engine::{ChangeHandler, ShutdownSignal, Trigger};
use reloadr::errors::FatalError;
use reloadr::exec::BoxFuture;

/// A change handler that:
/// - records every trigger it was given
/// - records watch errors
/// - counts shutdown calls
/// - optionally fails with a fatal error on the n-th trigger
/// - optionally takes a while per trigger, like a slow build.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    pub triggers: Arc<Mutex<Vec<Trigger>>>,
    pub errors: Arc<Mutex<Vec<FatalError>>>,
    pub shutdowns: Arc<AtomicUsize>,
    fail_on: Option<(usize, FatalError)>,
    delay: Option<Duration>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `fatal` from the `n`-th call (1-based) to `on_change`.
    pub fn failing_on(mut self, n: usize, fatal: FatalError) -> Self {
        self.fail_on = Some((n, fatal));
        self
    }

    /// Block the runtime loop for `delay` on every trigger.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.lock().unwrap().len()
    }

    /// Number of `Trigger::Change` seen (the startup trigger excluded).
    pub fn change_count(&self) -> usize {
        self.triggers
            .lock()
            .unwrap()
            .iter()
            .filter(|t| matches!(t, Trigger::Change(_)))
            .count()
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl ChangeHandler for RecordingHandler {
    fn on_change<'a>(
        &'a mut self,
        trigger: Trigger,
        _shutdown: &'a ShutdownSignal,
    ) -> BoxFuture<'a, Result<(), FatalError>> {
        Box::pin(async move {
            let n = {
                let mut guard = self.triggers.lock().unwrap();
                guard.push(trigger);
                guard.len()
            };
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.fail_on {
                Some((at, fatal)) if *at == n => Err(fatal.clone()),
                _ => Ok(()),
            }
        })
    }

    fn on_error(&mut self, error: &FatalError) {
        self.errors.lock().unwrap().push(error.clone());
    }

    fn shutdown(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        })
    }
}
