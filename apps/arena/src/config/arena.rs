use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::roster::MIN_PLAYERS;
use crate::error::ArenaError;
use crate::gateway::RetryPolicy;
use crate::registry::{CreateGame, RegistrySettings};

/// Everything the `arena` binary reads from its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    pub threads: usize,
    pub players: usize,
    pub debate_turns: u32,
    pub werewolves: usize,
    pub villager_model: String,
    pub werewolf_model: String,
    pub log_root: PathBuf,
    pub seed: Option<u64>,
    pub gateway_timeout: Duration,
    pub gateway_retries: u32,
}

impl ArenaConfig {
    pub fn from_env() -> Result<Self, ArenaError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Missing variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ArenaError> {
        let config = Self {
            threads: parse_or(&lookup, "ARENA_THREADS", 4)?,
            players: parse_or(&lookup, "ARENA_PLAYERS", 6)?,
            debate_turns: parse_or(&lookup, "ARENA_DEBATE_TURNS", 2)?,
            werewolves: parse_or(&lookup, "ARENA_WEREWOLVES", 1)?,
            villager_model: lookup("ARENA_VILLAGER_MODEL").unwrap_or_else(|| "random".to_string()),
            werewolf_model: lookup("ARENA_WEREWOLF_MODEL").unwrap_or_else(|| "random".to_string()),
            log_root: lookup("ARENA_LOG_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
            seed: lookup("ARENA_SEED").map(|v| parse("ARENA_SEED", &v)).transpose()?,
            gateway_timeout: Duration::from_secs(parse_or(&lookup, "ARENA_GATEWAY_TIMEOUT_SECS", 60)?),
            gateway_retries: parse_or(&lookup, "ARENA_GATEWAY_RETRIES", 3)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ArenaError> {
        if self.threads == 0 {
            return Err(ArenaError::config("ARENA_THREADS must be greater than 0"));
        }
        if self.players < MIN_PLAYERS {
            return Err(ArenaError::config(format!(
                "ARENA_PLAYERS must be at least {MIN_PLAYERS}, got {}",
                self.players
            )));
        }
        if self.debate_turns == 0 {
            return Err(ArenaError::config("ARENA_DEBATE_TURNS must be at least 1"));
        }
        if self.werewolves == 0 || self.werewolves.saturating_add(2) >= self.players {
            return Err(ArenaError::config(format!(
                "ARENA_WEREWOLVES={} does not fit a {}-player game",
                self.werewolves, self.players
            )));
        }
        if self.gateway_timeout.is_zero() {
            return Err(ArenaError::config("ARENA_GATEWAY_TIMEOUT_SECS must be greater than 0"));
        }
        Ok(())
    }

    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            default_threads: self.threads,
            werewolf_count: self.werewolves,
            log_root: self.log_root.clone(),
            seed: self.seed,
        }
    }

    pub fn create_game(&self) -> CreateGame {
        CreateGame {
            villager_model: self.villager_model.clone(),
            werewolf_model: self.werewolf_model.clone(),
            player_count: self.players,
            max_debate_turns: self.debate_turns,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.gateway_retries.max(1),
            attempt_timeout: self.gateway_timeout,
            ..RetryPolicy::default()
        }
    }
}

fn parse<T: FromStr>(name: &str, raw: &str) -> Result<T, ArenaError> {
    raw.trim()
        .parse()
        .map_err(|_| ArenaError::config(format!("Environment variable '{name}' has invalid value '{raw}'")))
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ArenaError> {
    match lookup(name) {
        Some(raw) => parse(name, &raw),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<ArenaConfig, ArenaError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ArenaConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.threads, 4);
        assert_eq!(c.players, 6);
        assert_eq!(c.debate_turns, 2);
        assert_eq!(c.werewolves, 1);
        assert_eq!(c.villager_model, "random");
        assert_eq!(c.log_root, PathBuf::from("logs"));
        assert_eq!(c.seed, None);
        assert_eq!(c.retry_policy().max_attempts, 3);
        assert_eq!(c.retry_policy().attempt_timeout, Duration::from_secs(60));
    }

    #[test]
    fn overrides() {
        let c = config(&[
            ("ARENA_THREADS", "8"),
            ("ARENA_PLAYERS", "10"),
            ("ARENA_WEREWOLVES", "2"),
            ("ARENA_WEREWOLF_MODEL", "openrouter/openai/gpt-4o"),
            ("ARENA_SEED", "1234"),
        ])
        .unwrap();
        assert_eq!(c.registry_settings().default_threads, 8);
        assert_eq!(c.create_game().player_count, 10);
        assert_eq!(c.registry_settings().werewolf_count, 2);
        assert_eq!(c.create_game().werewolf_model, "openrouter/openai/gpt-4o");
        assert_eq!(c.seed, Some(1234));
    }

    #[test]
    fn rejects_bad_values() {
        for vars in [
            vec![("ARENA_THREADS", "0")],
            vec![("ARENA_THREADS", "many")],
            vec![("ARENA_PLAYERS", "3")],
            vec![("ARENA_DEBATE_TURNS", "0")],
            vec![("ARENA_WEREWOLVES", "4")],
            vec![("ARENA_SEED", "-1")],
            vec![("ARENA_WEREWOLVES", "18446744073709551615")],
        ] {
            let err = config(&vars).unwrap_err();
            assert_eq!(err.code(), "CONFIG_ERROR", "{vars:?}");
        }
    }
}
