//! Turning raw gateway text into decisions.
//!
//! Agents are asked for `{"target": "<name>" | null}` or
//! `{"say": "<text>" | null}`. Models like to wrap JSON in prose or code
//! fences, so the first `{ ... }` span is extracted before parsing.

use lazy_regex::regex;
use serde_json::Value;

use crate::gateway::{Constraints, GenerationError};

fn json_object(reply: &str) -> Option<Value> {
    let span = regex!(r"(?s)\{.*\}").find(reply)?;
    serde_json::from_str(span.as_str()).ok()
}

fn match_choice(name: &str, choices: &[String]) -> Option<String> {
    let name = name.trim();
    choices
        .iter()
        .find(|c| c.as_str() == name)
        .or_else(|| choices.iter().find(|c| c.eq_ignore_ascii_case(name)))
        .cloned()
}

/// Parse a target decision. `Ok(None)` is an abstention.
///
/// Names outside `constraints.choices` are rejected.
pub fn parse_target(reply: &str, constraints: &Constraints) -> Result<Option<String>, GenerationError> {
    let picked = match json_object(reply) {
        Some(value) => match value.get("target") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) if name.trim().is_empty() => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(other) => {
                return Err(GenerationError::InvalidResponse(format!(
                    "target must be a name or null, got {other}"
                )))
            }
        },
        // bare name without JSON
        None => Some(reply.trim().to_string()).filter(|s| !s.is_empty()),
    };

    match picked {
        None if constraints.allow_abstain => Ok(None),
        None => Err(GenerationError::InvalidResponse(
            "abstaining is not allowed here".into(),
        )),
        Some(name) => match_choice(&name, &constraints.choices)
            .map(Some)
            .ok_or_else(|| {
                GenerationError::InvalidResponse(format!(
                    "'{name}' is not one of {:?}",
                    constraints.choices
                ))
            }),
    }
}

/// Parse a debate statement. `Ok(None)` means the speaker passes.
pub fn parse_statement(reply: &str) -> Result<Option<String>, GenerationError> {
    match json_object(reply) {
        Some(value) => match value.get("say") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => {
                let text = text.trim();
                Ok((!text.is_empty()).then(|| text.to_string()))
            }
            Some(other) => Err(GenerationError::InvalidResponse(format!(
                "say must be text or null, got {other}"
            ))),
        },
        None => {
            let text = reply.trim();
            Ok((!text.is_empty()).then(|| text.to_string()))
        }
    }
}
