use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use arena::domain::ActionKind;
use arena::{Constraints, GenerationError, GenerationGateway, RoleContext};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

/// Deterministic gateway for integration tests.
///
/// Decisions pick the first name from the preference list that is allowed,
/// falling back to the first allowed choice. Statements always say something.
#[derive(Default)]
pub struct ScriptedGateway {
    preferences: Mutex<Vec<String>>,
    abstain_actions: HashSet<ActionKind>,
    failing_models: HashSet<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply `{"target": null}` for every request of this kind.
    pub fn abstain_on(mut self, action: ActionKind) -> Self {
        self.abstain_actions.insert(action);
        self
    }

    /// Players using this model identifier always get a provider error.
    pub fn fail_model(mut self, model: impl Into<String>) -> Self {
        self.failing_models.insert(model.into());
        self
    }

    /// Sleep before answering, to keep a run busy.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Replace the preference order. Usable after the gateway is shared.
    pub fn prefer<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.preferences.lock() = names.into_iter().map(Into::into).collect();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn decide(&self, constraints: &Constraints) -> Option<String> {
        if self.abstain_actions.contains(&constraints.action) {
            return None;
        }
        let preferences = self.preferences.lock();
        preferences
            .iter()
            .find(|p| constraints.choices.contains(*p))
            .or_else(|| constraints.choices.first())
            .cloned()
    }
}

#[async_trait]
impl GenerationGateway for ScriptedGateway {
    async fn generate(
        &self,
        context: &RoleContext,
        _prompt: &str,
        constraints: &Constraints,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_models.contains(&context.player.model) {
            return Err(GenerationError::Provider(format!(
                "model {} is unavailable",
                context.player.model
            )));
        }

        let reply = match constraints.action {
            ActionKind::Debate => json!({ "say": format!("{} has nothing to hide", context.player.name) }),
            _ => json!({ "target": self.decide(constraints) }),
        };
        Ok(reply.to_string())
    }
}
