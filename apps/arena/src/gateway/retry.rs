use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Constraints, GenerationError, GenerationGateway, RoleContext};

/// Bounded retry with a per-attempt timeout and linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(60),
            backoff: Duration::from_millis(500),
        }
    }
}

/// Wraps another gateway with [`RetryPolicy`].
///
/// Only transient errors are retried. The engine sees at most one error per
/// request: the last one.
pub struct RetryingGateway {
    inner: Arc<dyn GenerationGateway>,
    policy: RetryPolicy,
}

impl RetryingGateway {
    pub fn new(inner: Arc<dyn GenerationGateway>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl GenerationGateway for RetryingGateway {
    async fn generate(
        &self,
        context: &RoleContext,
        prompt: &str,
        constraints: &Constraints,
    ) -> Result<String, GenerationError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = GenerationError::Internal("no attempt made".into());

        for attempt in 1..=attempts {
            let result = tokio::time::timeout(
                self.policy.attempt_timeout,
                self.inner.generate(context, prompt, constraints),
            )
            .await
            .unwrap_or(Err(GenerationError::Timeout));

            match result {
                Ok(text) => {
                    if attempt > 1 {
                        debug!(player = %context.player.name, attempt, "generation recovered");
                    }
                    return Ok(text);
                }
                Err(err) if err.is_transient() && attempt < attempts => {
                    warn!(
                        session_id = %context.session_id,
                        player = %context.player.name,
                        action = %constraints.action,
                        attempt,
                        error = %err,
                        "generation failed, retrying"
                    );
                    last_error = err;
                    tokio::time::sleep(self.policy.backoff * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error)
    }
}
