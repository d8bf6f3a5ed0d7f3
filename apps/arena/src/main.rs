use std::sync::Arc;
use std::time::Duration;

use arena::{
    ArenaConfig, JsonFileSink, ModelRouter, RetryingGateway, SessionRegistry, SessionStatus,
    SharedGateway,
};
use tracing::{info, warn};

mod telemetry;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    // Configuration comes from ARENA_* variables; provider keys are read per request.
    let config = match ArenaConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
    };

    let router = match ModelRouter::new(config.seed, config.gateway_timeout) {
        Ok(router) => router,
        Err(e) => {
            eprintln!("❌ Failed to build generation client: {e}");
            std::process::exit(1);
        }
    };
    let gateway: SharedGateway =
        Arc::new(RetryingGateway::new(Arc::new(router), config.retry_policy()));
    let sink = Arc::new(JsonFileSink);

    let registry = match SessionRegistry::new(config.registry_settings(), gateway, sink) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
    };

    let session = match registry.create(config.create_game()).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("❌ Failed to create game: {e}");
            std::process::exit(1);
        }
    };
    let session_id = session.session_id().to_string();
    println!("🐺 Game {session_id} logging to {}", session.log_dir().display());

    registry.start(&session_id);

    let mut stop_sent = false;
    loop {
        tokio::select! {
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
            signal = tokio::signal::ctrl_c(), if !stop_sent => {
                if let Err(e) = signal {
                    warn!(error = %e, "could not listen for Ctrl-C");
                }
                info!(session_id = %session_id, "Ctrl-C received, stopping after this round");
                if !registry.stop(&session_id) {
                    warn!(session_id = %session_id, "session was not running");
                }
                stop_sent = true;
            }
        }

        match registry.status(&session_id) {
            Some(status) if status.status != SessionStatus::Running => {
                match serde_json::to_string_pretty(&status) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("❌ Failed to render status: {e}"),
                }
                if status.error_message.is_some() {
                    std::process::exit(1);
                }
                return;
            }
            Some(_) => {}
            None => {
                eprintln!("❌ Session {session_id} disappeared from the registry");
                std::process::exit(1);
            }
        }
    }
}
