//! Participants and the private knowledge each of them holds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::roles::{ActionKind, Alignment, Role};

/// A player's private snapshot of public knowledge, rebuilt every round.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameView {
    /// Names of everyone still alive, in roster order.
    pub alive: Vec<String>,
    /// Round this view was built for (0 before the first night).
    pub round: u32,
    /// Fellow werewolves still in play. Only populated for werewolves, and
    /// only when the game was dealt more than one.
    pub werewolf_allies: Vec<String>,
}

/// Role tag plus whatever private memory that role accumulates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum RoleState {
    Villager,
    Werewolf,
    Seer {
        /// Everyone this seer has looked at, and what they turned out to be.
        investigations: BTreeMap<String, Alignment>,
    },
    Doctor {
        /// Choice from the immediately preceding night (cannot be repeated).
        last_protected: Option<String>,
    },
}

impl RoleState {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Villager => RoleState::Villager,
            Role::Werewolf => RoleState::Werewolf,
            Role::Seer => RoleState::Seer {
                investigations: BTreeMap::new(),
            },
            Role::Doctor => RoleState::Doctor {
                last_protected: None,
            },
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleState::Villager => Role::Villager,
            RoleState::Werewolf => Role::Werewolf,
            RoleState::Seer { .. } => Role::Seer,
            RoleState::Doctor { .. } => Role::Doctor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Generation backend identifier, passed through to the gateway untouched.
    pub model: String,
    #[serde(flatten)]
    pub state: RoleState,
    pub view: GameView,
}

impl Player {
    pub fn new(name: impl Into<String>, role: Role, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            state: RoleState::for_role(role),
            view: GameView::default(),
        }
    }

    pub fn role(&self) -> Role {
        self.state.role()
    }

    pub fn alignment(&self) -> Alignment {
        self.role().alignment()
    }

    pub fn night_action(&self) -> Option<ActionKind> {
        self.role().night_action()
    }

    pub fn is_werewolf(&self) -> bool {
        matches!(self.state, RoleState::Werewolf)
    }

    /// Replace the view wholesale. Ally names are ignored for non-werewolves.
    pub fn rebuild_view(&mut self, alive: &[String], round: u32, werewolf_allies: Vec<String>) {
        self.view = GameView {
            alive: alive.to_vec(),
            round,
            werewolf_allies: if self.is_werewolf() {
                werewolf_allies
            } else {
                Vec::new()
            },
        };
    }

    /// Seer findings so far; empty for every other role.
    pub fn investigations(&self) -> Option<&BTreeMap<String, Alignment>> {
        match &self.state {
            RoleState::Seer { investigations } => Some(investigations),
            _ => None,
        }
    }

    pub fn last_protected(&self) -> Option<&str> {
        match &self.state {
            RoleState::Doctor { last_protected } => last_protected.as_deref(),
            _ => None,
        }
    }

    /// Store a reveal in the seer's private memory. No-op for other roles.
    pub fn record_investigation(&mut self, target: &str, alignment: Alignment) {
        if let RoleState::Seer { investigations } = &mut self.state {
            investigations.insert(target.to_string(), alignment);
        }
    }

    /// Remember tonight's save so it cannot be repeated tomorrow.
    pub fn record_protection(&mut self, target: Option<String>) {
        if let RoleState::Doctor { last_protected } = &mut self.state {
            *last_protected = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn villagers_never_see_wolf_allies() {
        let mut villager = Player::new("Hayley", Role::Villager, "random");
        villager.rebuild_view(&["Hayley".into(), "Jacob".into()], 2, vec!["Jacob".into()]);
        assert!(villager.view.werewolf_allies.is_empty());
        assert_eq!(villager.view.round, 2);
    }

    #[test]
    fn werewolf_keeps_ally_reference() {
        let mut wolf = Player::new("Jacob", Role::Werewolf, "random");
        wolf.rebuild_view(&["Jacob".into(), "Mason".into()], 1, vec!["Mason".into()]);
        assert_eq!(wolf.view.werewolf_allies, vec!["Mason".to_string()]);
    }

    #[test]
    fn knowledge_is_role_specific() {
        let mut seer = Player::new("Ginger", Role::Seer, "random");
        seer.record_investigation("Jacob", Alignment::Werewolves);
        seer.record_protection(Some("Jacob".into()));
        assert_eq!(
            seer.investigations().and_then(|m| m.get("Jacob")).copied(),
            Some(Alignment::Werewolves)
        );
        assert_eq!(seer.last_protected(), None);

        let mut doctor = Player::new("Paul", Role::Doctor, "random");
        doctor.record_investigation("Jacob", Alignment::Werewolves);
        doctor.record_protection(Some("Ginger".into()));
        assert!(doctor.investigations().is_none());
        assert_eq!(doctor.last_protected(), Some("Ginger"));
    }

    #[test]
    fn role_tag_is_flattened_into_player_json() {
        let doctor = Player::new("Paul", Role::Doctor, "glm/glm-4");
        let json = serde_json::to_value(&doctor).unwrap();
        assert_eq!(json["role"], "Doctor");
        assert_eq!(json["model"], "glm/glm-4");
        assert!(json["last_protected"].is_null());
    }
}
