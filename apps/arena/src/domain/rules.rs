//! Pure game rules: who may be targeted, who won, how votes resolve.

use std::collections::BTreeMap;

use crate::domain::player::Player;
use crate::domain::roles::{ActionKind, Alignment, Role};
use crate::domain::state::GameState;

/// Names `player` may pick for `action`, in roster order.
///
/// - Eliminate: living non-werewolves.
/// - Protect: any living player except last night's choice.
/// - Investigate: living players other than the seer not yet investigated.
/// - Vote: living players other than the voter.
/// - Debate has no targets.
pub fn eligible_targets(state: &GameState, player: &Player, action: ActionKind) -> Vec<String> {
    let alive = state.alive_players();
    match action {
        ActionKind::Eliminate => alive
            .filter(|p| !p.is_werewolf())
            .map(|p| p.name.clone())
            .collect(),
        ActionKind::Protect => {
            let previous = player.last_protected();
            alive
                .filter(|p| Some(p.name.as_str()) != previous)
                .map(|p| p.name.clone())
                .collect()
        }
        ActionKind::Investigate => {
            let seen = player.investigations();
            alive
                .filter(|p| p.name != player.name)
                .filter(|p| seen.is_none_or(|s| !s.contains_key(&p.name)))
                .map(|p| p.name.clone())
                .collect()
        }
        ActionKind::Vote => alive
            .filter(|p| p.name != player.name)
            .map(|p| p.name.clone())
            .collect(),
        ActionKind::Debate => Vec::new(),
    }
}

/// Decide the game, if it is decided.
///
/// Villagers win once every werewolf is dead. Werewolves win when they hold a
/// strict majority of the living, or when no seer or doctor survives and at
/// least one werewolf does.
pub fn check_winner(state: &GameState) -> Option<Alignment> {
    let living: Vec<&Player> = state.alive_players().collect();
    let wolves = living.iter().filter(|p| p.is_werewolf()).count();

    if wolves == 0 {
        return Some(Alignment::Villagers);
    }
    if wolves * 2 > living.len() {
        return Some(Alignment::Werewolves);
    }
    let specialists = living
        .iter()
        .any(|p| matches!(p.role(), Role::Seer | Role::Doctor));
    if !specialists {
        return Some(Alignment::Werewolves);
    }
    None
}

/// Count ballots per candidate.
pub fn tally_votes(votes: &BTreeMap<String, String>) -> BTreeMap<String, u32> {
    let mut tally = BTreeMap::new();
    for candidate in votes.values() {
        *tally.entry(candidate.clone()).or_insert(0) += 1;
    }
    tally
}

/// The candidate with strictly the most votes.
///
/// A tie at the top eliminates nobody. This never depends on ballot order.
pub fn vote_outcome(tally: &BTreeMap<String, u32>) -> Option<String> {
    let top = tally.values().copied().max()?;
    let mut leaders = tally.iter().filter(|(_, count)| **count == top);
    let (leader, _) = leaders.next()?;
    if leaders.next().is_some() {
        return None;
    }
    Some(leader.clone())
}

/// Combine werewolf proposals into one attack target.
///
/// `proposals` must be in werewolf roster order. The most proposed target
/// wins; a tie goes to whichever tied target the earliest werewolf proposed.
pub fn pack_target(proposals: &[(String, String)]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, target) in proposals {
        *counts.entry(target.as_str()).or_insert(0) += 1;
    }
    let top = counts.values().copied().max()?;
    proposals
        .iter()
        .map(|(_, target)| target)
        .find(|target| counts.get(target.as_str()) == Some(&top))
        .cloned()
}

/// Speaking order for a round: the alive roster rotated left by one seat per
/// round, so round 1 starts with the first living player.
pub fn speaking_order(alive: &[String], round: u32) -> Vec<String> {
    if alive.is_empty() {
        return Vec::new();
    }
    let shift = (round.saturating_sub(1) as usize) % alive.len();
    let mut order = alive.to_vec();
    order.rotate_left(shift);
    order
}
