#![allow(dead_code)]

pub use reloadr_test_utils::builders::SettingsBuilder;
pub use reloadr_test_utils::fake_backends::{
    event_log, BuildStep, EventLog, FakeProcessBackend, ScriptedBuildBackend,
};
pub use reloadr_test_utils::recording_handler::RecordingHandler;
pub use reloadr_test_utils::{capture_sink, eventually, init_tracing, with_timeout};

use std::time::Duration;

use reloadr::engine::Reloader;
use reloadr::exec::{Builder, LineSink, Supervisor};
use reloadr::watch::{ChangeFilter, ChangeStream, RawChange};
use tokio::sync::mpsc;

/// A reloader over fake backends, printing into `sink`.
pub fn fake_reloader(
    steps: Vec<BuildStep>,
    procs: FakeProcessBackend,
    log: EventLog,
    sink: LineSink,
) -> Reloader<ScriptedBuildBackend, FakeProcessBackend> {
    let builder = Builder::new(ScriptedBuildBackend::new(steps, log), ".", "app");
    let supervisor = Supervisor::new(procs, "app", vec![]);
    Reloader::new(builder, supervisor).with_sink(sink)
}

/// Hand-fed change and error streams, for driving the runtime without a
/// real watcher.
pub struct FakeWatch {
    pub raw_tx: mpsc::UnboundedSender<RawChange>,
    pub err_tx: mpsc::UnboundedSender<notify::Error>,
    pub changes: ChangeStream,
    pub errors: mpsc::UnboundedReceiver<notify::Error>,
}

pub fn fake_watch(exts: &[&str], debounce: Duration) -> FakeWatch {
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (err_tx, errors) = mpsc::unbounded_channel();
    let filter = ChangeFilter::new(exts.iter().map(|e| e.to_string()).collect(), debounce);
    FakeWatch {
        raw_tx,
        err_tx,
        changes: ChangeStream::new(raw_rx, filter),
        errors,
    }
}
