//! Dealing a new game: sampling names and handing out roles.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::domain::player::Player;
use crate::domain::roles::Role;
use crate::error::ArenaError;

/// Fixed pool player names are drawn from. Names are unique per game.
pub const NAME_POOL: &[&str] = &[
    "Derek", "Scott", "Jacob", "Isaac", "Hayley", "David", "Tyler", "Ginger", "Jackson", "Mason",
    "Dan", "Bert", "Will", "Sam", "Paul", "Leah", "Harold", "Nina", "Oscar", "Ruth",
];

pub const MIN_PLAYERS: usize = 4;

/// Parameters for dealing one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSpec {
    pub player_count: usize,
    pub werewolf_count: usize,
    pub villager_model: String,
    pub werewolf_model: String,
}

impl RosterSpec {
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.player_count < MIN_PLAYERS {
            return Err(ArenaError::config(format!(
                "player count must be at least {MIN_PLAYERS}, got {}",
                self.player_count
            )));
        }
        if self.player_count > NAME_POOL.len() {
            return Err(ArenaError::config(format!(
                "player count {} exceeds the name pool size {}",
                self.player_count,
                NAME_POOL.len()
            )));
        }
        if self.werewolf_count == 0 {
            return Err(ArenaError::config("at least one werewolf is required"));
        }
        // seer + doctor + wolves must leave at least one plain villager
        if self.werewolf_count.saturating_add(2) >= self.player_count {
            return Err(ArenaError::config(format!(
                "{} werewolves leave no villagers in a {}-player game",
                self.werewolf_count, self.player_count
            )));
        }
        Ok(())
    }
}

/// Players grouped by role, in dealing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub seer: Player,
    pub doctor: Player,
    pub werewolves: Vec<Player>,
    pub villagers: Vec<Player>,
}

/// Sample `player_count` distinct names and deal one seer, one doctor,
/// `werewolf_count` werewolves and villagers for the rest.
pub fn deal<R: Rng + ?Sized>(spec: &RosterSpec, rng: &mut R) -> Result<Roster, ArenaError> {
    spec.validate()?;

    let mut names = NAME_POOL
        .choose_multiple(rng, spec.player_count)
        .map(|n| n.to_string());

    let mut next_name = || {
        names
            .next()
            .ok_or_else(|| ArenaError::internal("name pool exhausted while dealing"))
    };

    let seer = Player::new(next_name()?, Role::Seer, spec.villager_model.clone());
    let doctor = Player::new(next_name()?, Role::Doctor, spec.villager_model.clone());
    let werewolves = (0..spec.werewolf_count)
        .map(|_| next_name().map(|n| Player::new(n, Role::Werewolf, spec.werewolf_model.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    let villagers = (0..spec.player_count - spec.werewolf_count - 2)
        .map(|_| next_name().map(|n| Player::new(n, Role::Villager, spec.villager_model.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Roster {
        seer,
        doctor,
        werewolves,
        villagers,
    })
}
