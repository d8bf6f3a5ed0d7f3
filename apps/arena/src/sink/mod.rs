//! Progress persistence: where snapshots go after each round.

mod json_file;
mod log_dir;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::GameState;
use crate::engine::RoundLog;

pub use json_file::{JsonFileSink, LOGS_FILE, STATE_FILE};
pub use log_dir::LogDirectories;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("could not serialize progress: {0}")]
    Serialize(String),
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Receives the game snapshot and round logs after every completed round.
///
/// `log_dir` is the directory allocated for the session at creation. Failures are reported to the caller, which logs them; they never stop a
/// running game.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn persist(
        &self,
        log_dir: &Path,
        state: &GameState,
        logs: &[RoundLog],
    ) -> Result<(), SinkError>;
}

pub type SharedSink = Arc<dyn ProgressSink>;
