//! Process-wide table of sessions and the create/start/stop/status API.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::domain::{deal, GameState, RosterSpec};
use crate::engine::{EngineSettings, RoundEngine};
use crate::error::ArenaError;
use crate::gateway::SharedGateway;
use crate::session::{Session, StatusRecord};
use crate::sink::{LogDirectories, SharedSink};

/// Registry-wide settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Worker pool size for every session's engine.
    pub default_threads: usize,
    pub werewolf_count: usize,
    pub log_root: PathBuf,
    /// Seeds roster dealing; `None` draws from the OS.
    pub seed: Option<u64>,
}

/// Parameters for one new game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGame {
    pub villager_model: String,
    pub werewolf_model: String,
    pub player_count: usize,
    pub max_debate_turns: u32,
}

pub struct SessionRegistry {
    settings: RegistrySettings,
    gateway: SharedGateway,
    sink: SharedSink,
    dirs: LogDirectories,
    rng: Mutex<StdRng>,
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new(
        settings: RegistrySettings,
        gateway: SharedGateway,
        sink: SharedSink,
    ) -> Result<Self, ArenaError> {
        if settings.default_threads == 0 {
            return Err(ArenaError::config("worker pool size must be positive"));
        }
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            dirs: LogDirectories::new(settings.log_root.clone()),
            settings,
            gateway,
            sink,
            rng: Mutex::new(rng),
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Deal a new game, persist its initial state and register it.
    ///
    /// The session is not started.
    pub async fn create(&self, request: CreateGame) -> Result<Arc<Session>, ArenaError> {
        if request.max_debate_turns == 0 {
            return Err(ArenaError::config("max debate turns must be at least 1"));
        }
        let spec = RosterSpec {
            player_count: request.player_count,
            werewolf_count: self.settings.werewolf_count,
            villager_model: request.villager_model,
            werewolf_model: request.werewolf_model,
        };
        let roster = {
            let mut rng = self.rng.lock();
            deal(&spec, &mut *rng)?
        };

        let (session_id, log_dir) = self.dirs.allocate().await?;
        let state = GameState::new(session_id.clone(), roster);
        let engine = RoundEngine::new(
            session_id.clone(),
            Arc::clone(&self.gateway),
            EngineSettings {
                threads: self.settings.default_threads,
                max_debate_turns: request.max_debate_turns,
            },
        );

        if let Err(e) = self.sink.persist(&log_dir, &state, &[]).await {
            warn!(session_id = %session_id, error = %e, "failed to persist initial state");
        }

        let session = Arc::new(Session::new(
            log_dir,
            engine,
            Arc::clone(&self.sink),
            state,
        ));
        self.sessions
            .lock()
            .insert(session_id.clone(), Arc::clone(&session));

        info!(
            session_id = %session_id,
            players = spec.player_count,
            werewolves = spec.werewolf_count,
            villager_model = %spec.villager_model,
            werewolf_model = %spec.werewolf_model,
            "session created"
        );
        Ok(session)
    }

    /// Launch the session's run loop. False if unknown or already running.
    pub fn start(&self, session_id: &str) -> bool {
        let sessions = self.sessions.lock();
        sessions.get(session_id).is_some_and(Session::launch)
    }

    /// Request a cooperative stop. False if unknown or not running.
    pub fn stop(&self, session_id: &str) -> bool {
        let sessions = self.sessions.lock();
        sessions.get(session_id).is_some_and(|s| s.request_stop())
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().get(session_id).cloned()
    }

    /// Snapshot copy of the table.
    pub fn list(&self) -> HashMap<String, Arc<Session>> {
        self.sessions.lock().clone()
    }

    pub fn status(&self, session_id: &str) -> Option<StatusRecord> {
        self.get(session_id).map(|s| s.status())
    }

    /// Like [`status`](Self::status), but unknown ids are an error.
    pub fn require_status(&self, session_id: &str) -> Result<StatusRecord, ArenaError> {
        self.status(session_id)
            .ok_or_else(|| ArenaError::not_found(format!("session {session_id}")))
    }
}
