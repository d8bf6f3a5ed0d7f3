//! Immutable records of completed night+day cycles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::roles::{ActionKind, Alignment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    pub seer: String,
    pub target: String,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NightOutcome {
    /// Who the werewolves went after.
    pub eliminate: Option<String>,
    /// Who the doctor guarded.
    pub protect: Option<String>,
    pub investigation: Option<Investigation>,
    /// The attack landed on the protected player.
    pub saved: bool,
    /// Who actually died overnight.
    pub casualty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub speaker: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DayOutcome {
    pub speaking_order: Vec<String>,
    /// Insertion order is speaking order.
    pub debate: Vec<Statement>,
    /// voter -> candidate. Abstentions and failed ballots are absent.
    pub votes: BTreeMap<String, String>,
    pub tally: BTreeMap<String, u32>,
    /// `None` when nobody reached a strict plurality.
    pub eliminated: Option<String>,
}

/// A participant whose request failed terminally and was treated as no action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFailure {
    pub player: String,
    pub action: ActionKind,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based.
    pub number: u32,
    pub night: NightOutcome,
    /// Absent when the game was decided overnight.
    pub day: Option<DayOutcome>,
    #[serde(default)]
    pub failures: Vec<ActionFailure>,
}

impl Round {
    /// Every player name mentioned anywhere in the record.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        names.extend(self.night.eliminate.as_deref());
        names.extend(self.night.protect.as_deref());
        names.extend(self.night.casualty.as_deref());
        if let Some(inv) = &self.night.investigation {
            names.push(&inv.seer);
            names.push(&inv.target);
        }
        if let Some(day) = &self.day {
            names.extend(day.speaking_order.iter().map(String::as_str));
            names.extend(day.debate.iter().map(|s| s.speaker.as_str()));
            for (voter, candidate) in &day.votes {
                names.push(voter);
                names.push(candidate);
            }
            names.extend(day.eliminated.as_deref());
        }
        names.extend(self.failures.iter().map(|f| f.player.as_str()));
        names
    }
}
