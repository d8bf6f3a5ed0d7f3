use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::gateway::{Constraints, GenerationError, RoleContext, SharedGateway};

/// One request for the gateway, fully owned so it can move into a task.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub context: RoleContext,
    pub prompt: String,
    pub constraints: Constraints,
}

/// Bounded fan-out over the generation gateway.
///
/// At most `threads` requests are in flight per pool. Each request runs in
/// its own task so a panicking gateway only fails that request.
pub struct WorkerPool {
    gateway: SharedGateway,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(gateway: SharedGateway, threads: usize) -> Self {
        Self {
            gateway,
            permits: Arc::new(Semaphore::new(threads.max(1))),
        }
    }

    /// Run every request and wait for all of them.
    ///
    /// Results come back in request order, one per request.
    pub async fn dispatch(
        &self,
        requests: Vec<GenerationRequest>,
    ) -> Vec<Result<String, GenerationError>> {
        let handles: Vec<_> = requests
            .into_iter()
            .map(|request| {
                let gateway = Arc::clone(&self.gateway);
                let permits = Arc::clone(&self.permits);
                tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|_| GenerationError::Internal("worker pool closed".into()))?;
                    debug!(
                        player = %request.context.player.name,
                        action = %request.constraints.action,
                        "dispatching generation"
                    );
                    gateway
                        .generate(&request.context, &request.prompt, &request.constraints)
                        .await
                })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| {
                    error!(error = %e, "generation task panicked");
                    Err(GenerationError::Internal(format!("generation task failed: {e}")))
                })
            })
            .collect()
    }

    /// Run a single request through the pool.
    pub async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.dispatch(vec![request])
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| Err(GenerationError::Internal("no result for request".into())))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{ActionKind, Player, Role};
    use crate::gateway::GenerationGateway;

    /// Echoes the prompt back after a short sleep and tracks peak concurrency.
    #[derive(Default)]
    struct Echo {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl GenerationGateway for Echo {
        async fn generate(
            &self,
            _context: &RoleContext,
            prompt: &str,
            _constraints: &Constraints,
        ) -> Result<String, GenerationError> {
            if prompt == "panic" {
                panic!("gateway blew up");
            }
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            // later prompts finish first
            let delay = 40u64.saturating_sub(prompt.len() as u64 * 5);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(prompt.to_string())
        }
    }

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            context: RoleContext {
                session_id: "session_pool".into(),
                player: Player::new("Derek", Role::Villager, "random"),
            },
            prompt: prompt.to_string(),
            constraints: Constraints::choose(ActionKind::Vote, vec!["Scott".into()]),
        }
    }

    #[tokio::test]
    async fn results_keep_request_order() {
        let pool = WorkerPool::new(Arc::new(Echo::default()), 4);
        let prompts = ["a", "bb", "ccc", "dddd", "eeeee"];
        let results = pool
            .dispatch(prompts.iter().map(|p| request(p)).collect())
            .await;
        let texts: Vec<String> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(texts, prompts);
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let echo = Arc::new(Echo::default());
        let pool = WorkerPool::new(echo.clone(), 2);
        let requests = (0..6).map(|_| request("x")).collect();
        pool.dispatch(requests).await;
        assert!(echo.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn panics_fail_only_their_request() {
        let pool = WorkerPool::new(Arc::new(Echo::default()), 2);
        let results = pool
            .dispatch(vec![request("ok"), request("panic"), request("fine")])
            .await;
        assert_eq!(results[0].as_deref(), Ok("ok"));
        assert!(matches!(results[1], Err(GenerationError::Internal(_))));
        assert_eq!(results[2].as_deref(), Ok("fine"));
    }

    #[tokio::test]
    async fn zero_threads_still_makes_progress() {
        let pool = WorkerPool::new(Arc::new(Echo::default()), 0);
        let results = pool.dispatch(vec![request("a"), request("b")]).await;
        assert_eq!(results[0].as_deref(), Ok("a"));
        assert_eq!(results[1].as_deref(), Ok("b"));
    }
}
