use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{ProgressSink, SinkError};
use crate::domain::GameState;
use crate::engine::RoundLog;

pub const STATE_FILE: &str = "game_state.json";
pub const LOGS_FILE: &str = "game_logs.json";

/// Writes `game_state.json` and `game_logs.json` into the session's log
/// directory.
///
/// Each file is written to a sibling temp file and renamed into place, so a
/// reader never sees a half-written snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileSink;

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SinkError> {
    let bytes =
        serde_json::to_vec_pretty(value).map_err(|e| SinkError::Serialize(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|source| SinkError::Io {
            path: tmp.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| SinkError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl ProgressSink for JsonFileSink {
    async fn persist(
        &self,
        log_dir: &Path,
        state: &GameState,
        logs: &[RoundLog],
    ) -> Result<(), SinkError> {
        tokio::fs::create_dir_all(log_dir)
            .await
            .map_err(|source| SinkError::Io {
                path: log_dir.to_path_buf(),
                source,
            })?;

        write_json(&log_dir.join(STATE_FILE), state).await?;
        write_json(&log_dir.join(LOGS_FILE), logs).await?;

        debug!(
            session_id = %state.session_id,
            rounds = state.rounds.len(),
            "progress persisted"
        );
        Ok(())
    }
}
