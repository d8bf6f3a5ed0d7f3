#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod session;
pub mod sink;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use config::ArenaConfig;
pub use domain::{Alignment, GameState, Role};
pub use engine::{EngineSettings, RoundEngine, RoundLog, RunOutcome};
pub use error::ArenaError;
pub use gateway::{
    Constraints, GenerationError, GenerationGateway, ModelRouter, RandomAgent, RetryPolicy,
    RetryingGateway, RoleContext, SharedGateway,
};
pub use registry::{CreateGame, RegistrySettings, SessionRegistry};
pub use session::{Session, SessionStatus, StatusRecord};
pub use sink::{JsonFileSink, ProgressSink, SharedSink, SinkError};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
