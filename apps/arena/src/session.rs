//! One game session: its published state, its background run and its status.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::{Alignment, GameState};
use crate::engine::{RoundEngine, RoundLog, RoundObserver, RunOutcome};
use crate::sink::SharedSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Completed,
    Stopped,
}

/// Point-in-time summary served by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub session_id: String,
    pub status: SessionStatus,
    /// Completed rounds.
    pub current_round: usize,
    pub winner: Option<Alignment>,
    pub error_message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    pub log_directory: PathBuf,
}

struct SessionRun {
    cancel: CancellationToken,
    // kept so the task is not detached silently; finished runs are dropped
    _task: JoinHandle<()>,
}

/// A game plus everything needed to run it in the background.
///
/// The run task is the only writer of the published `GameState`; readers
/// get clones and never wait on a running round.
pub struct Session {
    session_id: String,
    log_dir: PathBuf,
    started_at: OffsetDateTime,
    engine: RoundEngine,
    sink: SharedSink,
    snapshot: watch::Sender<GameState>,
    logs: Mutex<Vec<RoundLog>>,
    running: watch::Sender<bool>,
    run: Mutex<Option<SessionRun>>,
    outcome: Mutex<Option<RunOutcome>>,
}

impl Session {
    pub(crate) fn new(
        log_dir: PathBuf,
        engine: RoundEngine,
        sink: SharedSink,
        state: GameState,
    ) -> Self {
        let (snapshot, _) = watch::channel(state);
        let (running, _) = watch::channel(false);
        let session_id = snapshot.borrow().session_id.clone();
        Self {
            session_id,
            log_dir,
            started_at: OffsetDateTime::now_utc(),
            engine,
            sink,
            snapshot,
            logs: Mutex::new(Vec::new()),
            running,
            run: Mutex::new(None),
            outcome: Mutex::new(None),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }

    /// Latest published snapshot.
    pub fn state(&self) -> GameState {
        self.snapshot.borrow().clone()
    }

    /// Receive every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.snapshot.subscribe()
    }

    pub fn logs(&self) -> Vec<RoundLog> {
        self.logs.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    /// How the most recent run ended, if one has.
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome.lock().clone()
    }

    pub fn status(&self) -> StatusRecord {
        // read running first: finish() publishes state before clearing it
        let running = self.is_running();
        let state = self.snapshot.borrow();
        let status = if running {
            SessionStatus::Running
        } else if state.winner.is_some() {
            SessionStatus::Completed
        } else {
            SessionStatus::Stopped
        };
        StatusRecord {
            session_id: self.session_id.clone(),
            status,
            current_round: state.completed_rounds(),
            winner: state.winner,
            error_message: state.error_message.clone(),
            started_at: self.started_at,
            log_directory: self.log_dir.clone(),
        }
    }

    /// Resolve once no run is in progress.
    pub async fn wait_idle(&self) {
        let mut rx = self.running.subscribe();
        let _ = rx.wait_for(|running| !*running).await;
    }

    /// Claim the running flag and spawn the run task.
    ///
    /// False if already running or if called outside a tokio runtime.
    pub(crate) fn launch(self: &Arc<Self>) -> bool {
        let Ok(runtime) = Handle::try_current() else {
            warn!(session_id = %self.session_id, "start called outside a tokio runtime");
            return false;
        };
        let mut run = self.run.lock();
        let claimed = self.running.send_if_modified(|running| {
            if *running {
                false
            } else {
                *running = true;
                true
            }
        });
        if !claimed {
            return false;
        }

        self.outcome.lock().take();
        let cancel = CancellationToken::new();
        let session = Arc::clone(self);
        let token = cancel.clone();
        let task = runtime.spawn(async move { session.drive(token).await });
        *run = Some(SessionRun {
            cancel,
            _task: task,
        });
        true
    }

    /// Ask the run to end at the next between-rounds checkpoint.
    pub(crate) fn request_stop(&self) -> bool {
        let run = self.run.lock();
        if !self.is_running() {
            return false;
        }
        match run.as_ref() {
            Some(r) => {
                r.cancel.cancel();
                info!(session_id = %self.session_id, "stop requested");
                true
            }
            None => false,
        }
    }

    async fn drive(self: Arc<Self>, cancel: CancellationToken) {
        let state = self.state();
        let logs = self.logs();
        info!(
            session_id = %self.session_id,
            round = state.completed_rounds(),
            "session started"
        );

        // inner task so a panic in the engine lands here instead of unwinding past finish()
        let worker = {
            let session = Arc::clone(&self);
            tokio::spawn(async move {
                session
                    .engine
                    .run(state, logs, &cancel, session.as_ref())
                    .await
            })
        };

        let outcome = match worker.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(session_id = %self.session_id, error = %e, "session task panicked");
                RunOutcome::Failed(format!("session task failed: {e}"))
            }
        };
        self.finish(outcome);
    }

    /// Record how the run ended, then release the running flag.
    fn finish(&self, outcome: RunOutcome) {
        match &outcome {
            RunOutcome::Completed(winner) => {
                info!(session_id = %self.session_id, winner = ?winner, "session completed");
            }
            RunOutcome::Stopped => info!(session_id = %self.session_id, "session stopped"),
            RunOutcome::Failed(message) => {
                error!(session_id = %self.session_id, error = %message, "session failed");
                self.snapshot.send_modify(|state| state.fail(message.clone()));
            }
        }

        let mut run = self.run.lock();
        *self.outcome.lock() = Some(outcome);
        run.take();
        self.running.send_replace(false);
    }
}

#[async_trait]
impl RoundObserver for Session {
    async fn round_completed(&self, state: &GameState, logs: &[RoundLog]) {
        self.snapshot.send_replace(state.clone());
        *self.logs.lock() = logs.to_vec();

        if let Err(e) = self.sink.persist(&self.log_dir, state, logs).await {
            warn!(
                session_id = %self.session_id,
                round = state.completed_rounds(),
                error = %e,
                "failed to persist progress"
            );
        }
    }
}
