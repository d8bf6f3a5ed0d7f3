// Fixed rosters for rules tests. Roster order matters: seer, doctor, wolves, villagers.

use crate::domain::roster::Roster;
use crate::domain::{GameState, Player, Role};

fn game(wolves: &[&str], villagers: &[&str]) -> GameState {
    let roster = Roster {
        seer: Player::new("Ginger", Role::Seer, "villager-model"),
        doctor: Player::new("Paul", Role::Doctor, "villager-model"),
        werewolves: wolves
            .iter()
            .map(|n| Player::new(*n, Role::Werewolf, "wolf-model"))
            .collect(),
        villagers: villagers
            .iter()
            .map(|n| Player::new(*n, Role::Villager, "villager-model"))
            .collect(),
    };
    GameState::new("session_test", roster)
}

/// Ginger (seer), Paul (doctor), Jacob (wolf), Hayley, Derek, Scott.
pub fn six_player_game() -> GameState {
    game(&["Jacob"], &["Hayley", "Derek", "Scott"])
}

/// Ginger (seer), Paul (doctor), Jacob + Mason (wolves), Hayley, Derek, Scott.
pub fn two_wolf_game() -> GameState {
    game(&["Jacob", "Mason"], &["Hayley", "Derek", "Scott"])
}
