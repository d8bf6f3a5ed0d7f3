//! Per-round transcript of every generation request the engine made.

use serde::{Deserialize, Serialize};

use crate::domain::ActionKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub player: String,
    pub action: ActionKind,
    pub prompt: String,
    /// Raw text as the gateway returned it, even when it could not be used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundLog {
    pub round: u32,
    pub entries: Vec<LogEntry>,
}

impl RoundLog {
    pub fn new(round: u32) -> Self {
        Self {
            round,
            entries: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        player: &str,
        action: ActionKind,
        prompt: &str,
        reply: Option<&str>,
        error: Option<String>,
    ) {
        self.entries.push(LogEntry {
            player: player.to_string(),
            action,
            prompt: prompt.to_string(),
            reply: reply.map(str::to_string),
            error,
        });
    }

    /// Entries for one action kind, in the order they were recorded.
    pub fn of(&self, action: ActionKind) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.action == action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_entries_omit_reply() {
        let mut log = RoundLog::new(2);
        log.record("Derek", ActionKind::Vote, "vote now", None, Some("timed out".into()));
        log.record(
            "Scott",
            ActionKind::Vote,
            "vote now",
            Some("{\"target\":\"Derek\"}"),
            None,
        );

        let json = serde_json::to_value(&log).unwrap();
        assert!(json["entries"][0].get("reply").is_none());
        assert_eq!(json["entries"][0]["error"], "timed out");
        assert!(json["entries"][1].get("error").is_none());
        assert_eq!(json["entries"][1]["action"], "vote");
        assert_eq!(log.of(ActionKind::Vote).count(), 2);
        assert_eq!(log.of(ActionKind::Debate).count(), 0);
    }
}
