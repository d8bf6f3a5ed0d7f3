use std::path::{Path, PathBuf};

use arena::domain::{Alignment, GameState};
use arena::{ProgressSink, RoundLog, SinkError};
use async_trait::async_trait;
use parking_lot::Mutex;

/// One `persist` call as the sink saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persisted {
    pub session_id: String,
    pub log_dir: PathBuf,
    pub rounds: usize,
    pub logs: usize,
    pub winner: Option<Alignment>,
}

/// Remembers every call; optionally fails all of them.
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<Persisted>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Persisted> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, session_id: &str) -> Vec<Persisted> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.session_id == session_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn persist(
        &self,
        log_dir: &Path,
        state: &GameState,
        logs: &[RoundLog],
    ) -> Result<(), SinkError> {
        self.calls.lock().push(Persisted {
            session_id: state.session_id.clone(),
            log_dir: log_dir.to_path_buf(),
            rounds: state.rounds.len(),
            logs: logs.len(),
            winner: state.winner,
        });
        if self.fail {
            return Err(SinkError::Serialize("recording sink told to fail".into()));
        }
        Ok(())
    }
}
