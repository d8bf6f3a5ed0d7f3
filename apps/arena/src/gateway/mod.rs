//! Generation gateway - where agent decisions and statements come from.
//!
//! This module provides:
//! - `GenerationGateway` trait the round engine queries
//! - `RandomAgent`: offline agent picking uniformly among allowed choices
//! - `ChatClient`: OpenAI-compatible chat completions client for remote models
//! - `ModelRouter`: picks a backend from the player's model identifier
//! - `RetryingGateway`: bounded retry/timeout policy around any gateway

mod openai;
mod random;
mod retry;
mod router;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ActionKind, Player};

pub use openai::{ChatClient, Endpoint, Provider};
pub use random::RandomAgent;
pub use retry::{RetryPolicy, RetryingGateway};
pub use router::ModelRouter;

/// Who is asking: the session and a snapshot of the player (role, model,
/// private view and knowledge) at the moment the request was built.
#[derive(Debug, Clone)]
pub struct RoleContext {
    pub session_id: String,
    pub player: Player,
}

/// What a reply is allowed to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraints {
    pub action: ActionKind,
    /// Allowed target names, in roster order. Empty for debate statements.
    pub choices: Vec<String>,
    /// The player may decline to pick anybody.
    pub allow_abstain: bool,
    /// Ask the backend for a JSON object reply.
    pub json_mode: bool,
}

impl Constraints {
    pub fn choose(action: ActionKind, choices: Vec<String>) -> Self {
        Self {
            action,
            choices,
            allow_abstain: true,
            json_mode: true,
        }
    }

    pub fn statement() -> Self {
        Self {
            action: ActionKind::Debate,
            choices: Vec::new(),
            allow_abstain: true,
            json_mode: true,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("generation timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl GenerationError {
    /// Worth another attempt under the retry policy.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GenerationError::Timeout
                | GenerationError::Transport(_)
                | GenerationError::InvalidResponse(_)
        )
    }
}

/// External text-generation service.
///
/// Implementations may be slow and may fail; the engine treats a terminal
/// failure as "no action" for that participant.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate(
        &self,
        context: &RoleContext,
        prompt: &str,
        constraints: &Constraints,
    ) -> Result<String, GenerationError>;
}

/// Shared handle the engine and registry hold.
pub type SharedGateway = Arc<dyn GenerationGateway>;
