//! Prompt text for each request the engine makes.
//!
//! Prompts only ever contain what the addressed player is allowed to know:
//! their own view, their role's private knowledge and the public record.

use std::fmt::Write;

use crate::domain::{ActionKind, Player, Role, Round, Statement};

const RULES: &str = "You are playing Werewolf. Villagers win when every werewolf is dead. \
Werewolves win when they outnumber the rest, or when both the Seer and the Doctor are gone. \
Each night the werewolves kill, the Doctor protects someone and the Seer learns one \
player's side. Each day everybody debates and votes; a tied vote eliminates nobody.";

fn role_brief(player: &Player) -> String {
    let mut brief = format!("You are {}, a {}.", player.name, player.role());
    match player.role() {
        Role::Werewolf if !player.view.werewolf_allies.is_empty() => {
            let _ = write!(
                brief,
                " Your fellow werewolves are: {}.",
                player.view.werewolf_allies.join(", ")
            );
        }
        Role::Seer => {
            if let Some(found) = player.investigations().filter(|f| !f.is_empty()) {
                let known: Vec<String> = found
                    .iter()
                    .map(|(name, side)| format!("{name} plays for the {side:?}"))
                    .collect();
                let _ = write!(brief, " You have learned: {}.", known.join("; "));
            }
        }
        Role::Doctor => {
            if let Some(last) = player.last_protected() {
                let _ = write!(brief, " Last night you protected {last}; you may not pick them again.");
            }
        }
        _ => {}
    }
    brief
}

fn history(rounds: &[Round]) -> String {
    let mut text = String::new();
    for round in rounds {
        let _ = write!(text, "Round {}: ", round.number);
        match (&round.night.casualty, round.night.saved) {
            (Some(dead), _) => {
                let _ = write!(text, "{dead} was killed in the night. ");
            }
            (None, true) => text.push_str("An attack was foiled by the Doctor. "),
            (None, false) => text.push_str("Nobody died in the night. "),
        }
        if let Some(day) = &round.day {
            match &day.eliminated {
                Some(out) => {
                    let _ = write!(text, "The village voted out {out}.");
                }
                None => text.push_str("The vote was tied; nobody was voted out."),
            }
        }
        text.push('\n');
    }
    text
}

fn header(player: &Player, rounds: &[Round]) -> String {
    let mut text = format!(
        "{RULES}\n\n{}\nIt is round {}. Still alive: {}.\n",
        role_brief(player),
        player.view.round,
        player.view.alive.join(", ")
    );
    if !rounds.is_empty() {
        text.push_str("\nWhat has happened so far:\n");
        text.push_str(&history(rounds));
    }
    text
}

fn debate_transcript(statements: &[Statement]) -> String {
    if statements.is_empty() {
        return "Nobody has spoken yet today.\n".to_string();
    }
    let mut text = String::from("Today's debate so far:\n");
    for s in statements {
        let _ = writeln!(text, "{}: {}", s.speaker, s.text);
    }
    text
}

fn choice_request(action: ActionKind, choices: &[String]) -> String {
    let ask = match action {
        ActionKind::Eliminate => "Choose who the werewolves should kill tonight.",
        ActionKind::Protect => "Choose who to protect from the werewolves tonight.",
        ActionKind::Investigate => "Choose whose side to uncover tonight.",
        ActionKind::Vote => "Vote for who the village should eliminate.",
        ActionKind::Debate => "",
    };
    format!(
        "{ask}\nAllowed choices: {}.\nReply with a JSON object: {{\"target\": \"<name>\", \"reasoning\": \"<why>\"}}. \
Use null as the target to abstain.",
        choices.join(", ")
    )
}

/// Night action prompt for a werewolf, doctor or seer.
pub fn night(player: &Player, rounds: &[Round], action: ActionKind, choices: &[String]) -> String {
    format!("{}\n{}", header(player, rounds), choice_request(action, choices))
}

/// One debate statement, seeing everything said earlier today.
pub fn debate(player: &Player, rounds: &[Round], statements: &[Statement]) -> String {
    format!(
        "{}\n{}\nIt is your turn to speak. Reply with a JSON object: {{\"say\": \"<statement>\"}}. \
Use null to pass for the rest of the day.",
        header(player, rounds),
        debate_transcript(statements)
    )
}

/// Day vote prompt, after the debate is over.
pub fn vote(player: &Player, rounds: &[Round], statements: &[Statement], choices: &[String]) -> String {
    format!(
        "{}\n{}\n{}",
        header(player, rounds),
        debate_transcript(statements),
        choice_request(ActionKind::Vote, choices)
    )
}
