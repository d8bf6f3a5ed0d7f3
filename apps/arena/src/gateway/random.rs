//! Offline agent that plays uniformly at random.
//!
//! Replies use the same JSON shapes a remote model is asked for, so the
//! engine cannot tell the difference. Useful for demos and soak runs without
//! credentials.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::prelude::*;
use serde_json::json;

use super::{Constraints, GenerationError, GenerationGateway, RoleContext};
use crate::domain::ActionKind;

const LINES: &[&str] = &[
    "I slept badly and heard footsteps near the well.",
    "Whoever stays quiet today has something to hide.",
    "I trust the people who spoke up first yesterday.",
    "Let's not rush this vote, the wolves want chaos.",
    "My gut says we should watch the loudest voice.",
];

/// Agent that picks uniformly among allowed choices.
///
/// Seedable for reproducible games; never abstains.
pub struct RandomAgent {
    rng: Mutex<StdRng>,
}

impl RandomAgent {
    pub const NAME: &'static str = "random";

    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn reply(&self, context: &RoleContext, constraints: &Constraints) -> Result<String, GenerationError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|e| GenerationError::Internal(format!("RNG lock poisoned: {e}")))?;

        let reply = match constraints.action {
            ActionKind::Debate => {
                let line = LINES
                    .choose(&mut *rng)
                    .ok_or_else(|| GenerationError::Internal("no canned lines".into()))?;
                json!({ "say": format!("{line} ({})", context.player.name) })
            }
            _ => {
                let target = constraints
                    .choices
                    .choose(&mut *rng)
                    .ok_or_else(|| GenerationError::Internal("no choices offered".into()))?;
                json!({ "target": target, "reasoning": "random pick" })
            }
        };
        Ok(reply.to_string())
    }
}

#[async_trait]
impl GenerationGateway for RandomAgent {
    async fn generate(
        &self,
        context: &RoleContext,
        _prompt: &str,
        constraints: &Constraints,
    ) -> Result<String, GenerationError> {
        self.reply(context, constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Player, Role};

    fn context() -> RoleContext {
        RoleContext {
            session_id: "session_x".into(),
            player: Player::new("Jacob", Role::Werewolf, RandomAgent::NAME),
        }
    }

    #[tokio::test]
    async fn picks_only_offered_choices() {
        let agent = RandomAgent::new(Some(42));
        let choices = vec!["Hayley".to_string(), "Derek".to_string()];
        let constraints = Constraints::choose(ActionKind::Eliminate, choices.clone());
        for _ in 0..20 {
            let reply = agent.generate(&context(), "", &constraints).await.unwrap();
            let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
            let target = value["target"].as_str().unwrap().to_string();
            assert!(choices.contains(&target));
        }
    }

    #[tokio::test]
    async fn seeded_agents_agree() {
        let a = RandomAgent::new(Some(7));
        let b = RandomAgent::new(Some(7));
        let constraints = Constraints::choose(
            ActionKind::Vote,
            (0..10).map(|i| format!("p{i}")).collect(),
        );
        for _ in 0..5 {
            assert_eq!(
                a.generate(&context(), "", &constraints).await.unwrap(),
                b.generate(&context(), "", &constraints).await.unwrap()
            );
        }
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let agent = RandomAgent::new(Some(1));
        let constraints = Constraints::choose(ActionKind::Protect, Vec::new());
        assert!(agent.generate(&context(), "", &constraints).await.is_err());
    }

    #[tokio::test]
    async fn statements_mention_speaker() {
        let agent = RandomAgent::new(Some(3));
        let reply = agent
            .generate(&context(), "", &Constraints::statement())
            .await
            .unwrap();
        assert!(reply.contains("Jacob"));
    }
}
