use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed roles a participant can be dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Villager,
    Werewolf,
    Seer,
    Doctor,
}

/// Which side a role plays for. Doubles as the winner marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Alignment {
    Villagers,
    Werewolves,
}

/// Everything a participant can be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Werewolf night kill.
    Eliminate,
    /// Doctor night save.
    Protect,
    /// Seer night reveal.
    Investigate,
    /// One day statement.
    Debate,
    /// Day elimination vote.
    Vote,
}

impl Role {
    pub fn alignment(self) -> Alignment {
        match self {
            Role::Werewolf => Alignment::Werewolves,
            Role::Villager | Role::Seer | Role::Doctor => Alignment::Villagers,
        }
    }

    /// The night action this role performs, if any.
    pub fn night_action(self) -> Option<ActionKind> {
        match self {
            Role::Werewolf => Some(ActionKind::Eliminate),
            Role::Doctor => Some(ActionKind::Protect),
            Role::Seer => Some(ActionKind::Investigate),
            Role::Villager => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Villager => "Villager",
            Role::Werewolf => "Werewolf",
            Role::Seer => "Seer",
            Role::Doctor => "Doctor",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alignment::Villagers => f.write_str("Villagers"),
            Alignment::Werewolves => f.write_str("Werewolves"),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Eliminate => "eliminate",
            ActionKind::Protect => "protect",
            ActionKind::Investigate => "investigate",
            ActionKind::Debate => "debate",
            ActionKind::Vote => "vote",
        };
        f.write_str(s)
    }
}
