use serde::{Deserialize, Serialize};

use crate::domain::player::Player;
use crate::domain::roles::Alignment;
use crate::domain::roster::Roster;
use crate::domain::round::Round;
use crate::error::ArenaError;

/// The single mutable aggregate for one game.
///
/// Only the owning session's run task mutates a `GameState`; everybody else
/// reads published clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Terminal segment of the session log directory. Never changes.
    pub session_id: String,
    pub seer: Player,
    pub doctor: Player,
    pub werewolves: Vec<Player>,
    pub villagers: Vec<Player>,
    /// Names of living players, in roster order.
    pub alive: Vec<String>,
    /// Completed rounds, append-only, numbered 1..=n without gaps.
    pub rounds: Vec<Round>,
    pub winner: Option<Alignment>,
    pub error_message: Option<String>,
}

impl GameState {
    /// Build the initial state: nobody dead, round 0 views for everyone.
    pub fn new(session_id: impl Into<String>, roster: Roster) -> Self {
        let Roster {
            seer,
            doctor,
            werewolves,
            villagers,
        } = roster;
        let mut state = Self {
            session_id: session_id.into(),
            seer,
            doctor,
            werewolves,
            villagers,
            alive: Vec::new(),
            rounds: Vec::new(),
            winner: None,
            error_message: None,
        };
        state.alive = state.players().map(|p| p.name.clone()).collect();
        state.rebuild_views(0);
        state
    }

    /// Every player ever dealt in, in roster order: seer, doctor, werewolves, villagers.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        std::iter::once(&self.seer)
            .chain(std::iter::once(&self.doctor))
            .chain(self.werewolves.iter())
            .chain(self.villagers.iter())
    }

    fn players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        std::iter::once(&mut self.seer)
            .chain(std::iter::once(&mut self.doctor))
            .chain(self.werewolves.iter_mut())
            .chain(self.villagers.iter_mut())
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players().find(|p| p.name == name)
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        self.players_mut().find(|p| p.name == name)
    }

    pub fn is_alive(&self, name: &str) -> bool {
        self.alive.iter().any(|n| n == name)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players().filter(|p| self.is_alive(&p.name))
    }

    pub fn completed_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Either terminal marker is set.
    pub fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.error_message.is_some()
    }

    /// Drop a player from the alive roster. Returns false if they were not alive.
    pub fn eliminate(&mut self, name: &str) -> bool {
        let before = self.alive.len();
        self.alive.retain(|n| n != name);
        self.alive.len() != before
    }

    /// Rebuild every survivor's view for `round`.
    pub fn rebuild_views(&mut self, round: u32) {
        let alive = self.alive.clone();
        let pack_hunts = self.werewolves.len() > 1;
        let living_wolves: Vec<String> = self
            .werewolves
            .iter()
            .filter(|w| alive.contains(&w.name))
            .map(|w| w.name.clone())
            .collect();

        for player in self.players_mut() {
            if !alive.contains(&player.name) {
                continue;
            }
            let allies = if pack_hunts && player.is_werewolf() {
                living_wolves
                    .iter()
                    .filter(|n| **n != player.name)
                    .cloned()
                    .collect()
            } else {
                Vec::new()
            };
            player.rebuild_view(&alive, round, allies);
        }
    }

    /// Append a completed round, enforcing ordering and terminal markers.
    pub fn push_round(&mut self, round: Round) -> Result<(), ArenaError> {
        if self.is_terminal() {
            return Err(ArenaError::internal(format!(
                "cannot append round {} to a finished game",
                round.number
            )));
        }
        let expected = self.rounds.len() as u32 + 1;
        if round.number != expected {
            return Err(ArenaError::internal(format!(
                "round {} appended out of order (expected {expected})",
                round.number
            )));
        }
        self.rounds.push(round);
        Ok(())
    }

    /// Record a fatal error. Ignored once a winner is known.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.winner.is_none() {
            self.error_message = Some(message.into());
        }
    }
}
