use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::openai::{ChatClient, Endpoint, Provider};
use super::random::RandomAgent;
use super::{Constraints, GenerationError, GenerationGateway, RoleContext};

/// Dispatches each request to the backend named by the player's model.
///
/// Remote endpoints are resolved per call, so a missing API key only fails
/// the players that actually use that provider.
pub struct ModelRouter {
    random: RandomAgent,
    chat: ChatClient,
}

impl ModelRouter {
    pub fn new(seed: Option<u64>, request_timeout: Duration) -> Result<Self, GenerationError> {
        Ok(Self {
            random: RandomAgent::new(seed),
            chat: ChatClient::new(request_timeout)?,
        })
    }
}

#[async_trait]
impl GenerationGateway for ModelRouter {
    async fn generate(
        &self,
        context: &RoleContext,
        prompt: &str,
        constraints: &Constraints,
    ) -> Result<String, GenerationError> {
        let (provider, model) = Provider::route(&context.player.model)?;
        debug!(player = %context.player.name, ?provider, model, "routing generation");

        match provider {
            Provider::Random => self.random.generate(context, prompt, constraints).await,
            remote => {
                let endpoint = Endpoint::from_env(remote)?;
                self.chat
                    .complete(&endpoint, model, prompt, constraints.json_mode)
                    .await
            }
        }
    }
}
