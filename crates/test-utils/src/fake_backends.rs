use std::collections::VecDeque;
use std::io::{self, Cursor};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use reloadr::exec::{
    BoxFuture, BuildBackend, BuildOutput, ChildControl, ExitOutcome, OutputReader,
    ProcessBackend, SpawnedProcess,
};

/// Shared, ordered record of what the fakes were asked to do:
/// `"build"`, `"spawn#n"`, `"kill#n"`.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// One scripted build result.
#[derive(Debug, Clone)]
pub enum BuildStep {
    Succeed,
    /// Build ran and failed, writing this to stderr.
    Fail(String),
    /// The build command could not be started.
    LaunchError,
}

/// A build backend that replays a script and then keeps succeeding.
pub struct ScriptedBuildBackend {
    steps: Mutex<VecDeque<BuildStep>>,
    log: EventLog,
}

impl ScriptedBuildBackend {
    pub fn new(steps: Vec<BuildStep>, log: EventLog) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            log,
        }
    }

    pub fn always_succeeding(log: EventLog) -> Self {
        Self::new(vec![], log)
    }
}

impl BuildBackend for ScriptedBuildBackend {
    fn invoke<'a>(&'a self, _working_dir: &'a Path) -> BoxFuture<'a, io::Result<BuildOutput>> {
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(BuildStep::Succeed);
        self.log.lock().unwrap().push("build".to_string());

        Box::pin(async move {
            match step {
                BuildStep::Succeed => Ok(BuildOutput {
                    success: true,
                    exit_code: Some(0),
                    stderr: vec![],
                }),
                BuildStep::Fail(stderr) => Ok(BuildOutput {
                    success: false,
                    exit_code: Some(1),
                    stderr: stderr.into_bytes(),
                }),
                BuildStep::LaunchError => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "build tool not found",
                )),
            }
        })
    }

    fn describe(&self) -> String {
        "scripted build".to_string()
    }
}

/// A process backend that never touches the OS.
///
/// Each spawned instance prints one stdout line and then runs until it is
/// killed or told to exit via [`FakeProcessBackend::exit_instance`].
#[derive(Clone)]
pub struct FakeProcessBackend {
    log: EventLog,
    spawned: Arc<AtomicU32>,
    kill_fails: Arc<AtomicBool>,
    spawn_fails: Arc<AtomicBool>,
    exits: Arc<Mutex<Vec<Option<oneshot::Sender<i32>>>>>,
}

impl FakeProcessBackend {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            spawned: Arc::new(AtomicU32::new(0)),
            kill_fails: Arc::new(AtomicBool::new(false)),
            spawn_fails: Arc::new(AtomicBool::new(false)),
            exits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every subsequent kill fail (or succeed again).
    pub fn set_kill_fails(&self, fails: bool) {
        self.kill_fails.store(fails, Ordering::SeqCst);
    }

    /// Make every subsequent spawn fail (or succeed again).
    pub fn set_spawn_fails(&self, fails: bool) {
        self.spawn_fails.store(fails, Ordering::SeqCst);
    }

    /// Let instance `n` (1-based) exit on its own with `code`.
    pub fn exit_instance(&self, n: u32, code: i32) {
        let mut exits = self.exits.lock().unwrap();
        if let Some(slot) = exits.get_mut((n - 1) as usize) {
            if let Some(tx) = slot.take() {
                let _ = tx.send(code);
            }
        }
    }

    pub fn spawned_count(&self) -> u32 {
        self.spawned.load(Ordering::SeqCst)
    }
}

impl ProcessBackend for FakeProcessBackend {
    fn spawn(&self, name: &str, _args: &[String]) -> io::Result<SpawnedProcess> {
        if self.spawn_fails.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{name}: no such program"),
            ));
        }

        let n = self.spawned.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.lock().unwrap().push(format!("spawn#{n}"));

        let (exit_tx, exit_rx) = oneshot::channel();
        self.exits.lock().unwrap().push(Some(exit_tx));

        let stdout: OutputReader = Box::new(Cursor::new(format!("instance {n} up\n").into_bytes()));

        Ok(SpawnedProcess {
            pid: Some(10_000 + n),
            stdout: Some(stdout),
            stderr: None,
            child: Box::new(FakeChild {
                n,
                log: Arc::clone(&self.log),
                kill_fails: Arc::clone(&self.kill_fails),
                exit_rx: Some(exit_rx),
            }),
        })
    }
}

struct FakeChild {
    n: u32,
    log: EventLog,
    kill_fails: Arc<AtomicBool>,
    exit_rx: Option<oneshot::Receiver<i32>>,
}

impl ChildControl for FakeChild {
    fn wait(&mut self) -> BoxFuture<'_, io::Result<ExitOutcome>> {
        Box::pin(async move {
            if let Some(rx) = self.exit_rx.as_mut() {
                if let Ok(code) = rx.await {
                    self.exit_rx = None;
                    return Ok(ExitOutcome::Exited(code));
                }
                self.exit_rx = None;
            }
            std::future::pending().await
        })
    }

    fn kill(&mut self) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(async move {
            if self.kill_fails.load(Ordering::SeqCst) {
                self.log.lock().unwrap().push(format!("kill-failed#{}", self.n));
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "operation not permitted",
                ));
            }
            self.log.lock().unwrap().push(format!("kill#{}", self.n));
            Ok(())
        })
    }
}
