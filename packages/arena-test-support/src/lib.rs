//! Shared helpers for the arena integration tests.

pub mod gateway;
pub mod logging;
pub mod sink;

pub use gateway::ScriptedGateway;
pub use sink::RecordingSink;
