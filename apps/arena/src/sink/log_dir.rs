use std::path::{Path, PathBuf};

use ulid::Ulid;

use crate::error::ArenaError;

/// Allocates one fresh directory per session under a log root.
///
/// Directory names are `session_<ULID>`; the name doubles as the session id.
#[derive(Debug, Clone)]
pub struct LogDirectories {
    root: PathBuf,
}

impl LogDirectories {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a new, empty session directory and return `(session_id, path)`.
    pub async fn allocate(&self) -> Result<(String, PathBuf), ArenaError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ArenaError::io(format!("create log root {}", self.root.display()), e))?;

        let session_id = format!("session_{}", Ulid::new());
        let path = self.root.join(&session_id);
        // create_dir (not _all) so a collision surfaces instead of sharing a directory
        tokio::fs::create_dir(&path)
            .await
            .map_err(|e| ArenaError::io(format!("create session dir {}", path.display()), e))?;
        Ok((session_id, path))
    }
}
