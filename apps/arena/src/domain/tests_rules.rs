use std::collections::BTreeMap;

use crate::domain::rules::{
    check_winner, eligible_targets, pack_target, speaking_order, tally_votes, vote_outcome,
};
use crate::domain::test_state_helpers::{six_player_game, two_wolf_game};
use crate::domain::{ActionKind, Alignment};

fn names(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn wolves_cannot_target_each_other() {
    let state = two_wolf_game();
    let wolf = &state.werewolves[0];
    let targets = eligible_targets(&state, wolf, ActionKind::Eliminate);
    assert!(!targets.contains(&"Jacob".to_string()));
    assert!(!targets.contains(&"Mason".to_string()));
    assert_eq!(targets, names(&["Ginger", "Paul", "Hayley", "Derek", "Scott"]));
}

#[test]
fn doctor_cannot_repeat_last_protection() {
    let mut state = six_player_game();
    state.doctor.record_protection(Some("Hayley".into()));
    let targets = eligible_targets(&state, &state.doctor, ActionKind::Protect);
    assert!(!targets.contains(&"Hayley".to_string()));
    assert!(targets.contains(&"Paul".to_string()), "self-protection is allowed");
}

#[test]
fn seer_skips_self_dead_and_already_investigated() {
    let mut state = six_player_game();
    state.seer.record_investigation("Jacob", Alignment::Werewolves);
    state.eliminate("Hayley");
    let targets = eligible_targets(&state, &state.seer, ActionKind::Investigate);
    assert_eq!(targets, names(&["Paul", "Derek", "Scott"]));
}

#[test]
fn voters_cannot_vote_for_themselves() {
    let state = six_player_game();
    let voter = state.player("Derek").unwrap();
    let targets = eligible_targets(&state, voter, ActionKind::Vote);
    assert_eq!(targets.len(), 5);
    assert!(!targets.contains(&"Derek".to_string()));
}

#[test]
fn villagers_win_when_wolves_are_gone() {
    let mut state = six_player_game();
    assert_eq!(check_winner(&state), None);
    state.eliminate("Jacob");
    assert_eq!(check_winner(&state), Some(Alignment::Villagers));
}

#[test]
fn wolves_win_with_strict_majority() {
    let mut state = two_wolf_game();
    // 7 alive: 2 wolves
    for name in ["Hayley", "Derek"] {
        state.eliminate(name);
    }
    // 5 alive, 2 wolves: no majority, specialists alive
    assert_eq!(check_winner(&state), None);
    state.eliminate("Scott");
    // 4 alive, 2 wolves: parity is not a majority
    assert_eq!(check_winner(&state), None);
    state.eliminate("Ginger");
    // 3 alive, 2 wolves
    assert_eq!(check_winner(&state), Some(Alignment::Werewolves));
}

#[test]
fn wolves_win_once_seer_and_doctor_are_dead() {
    let mut state = six_player_game();
    state.eliminate("Ginger");
    assert_eq!(check_winner(&state), None);
    state.eliminate("Paul");
    assert_eq!(check_winner(&state), Some(Alignment::Werewolves));
}

#[test]
fn tie_means_no_elimination() {
    let votes: BTreeMap<String, String> = [
        ("Ginger", "Jacob"),
        ("Paul", "Jacob"),
        ("Jacob", "Hayley"),
        ("Hayley", "Derek"),
        ("Derek", "Hayley"),
    ]
    .into_iter()
    .map(|(a, b)| (a.to_string(), b.to_string()))
    .collect();
    let tally = tally_votes(&votes);
    assert_eq!(tally.get("Jacob"), Some(&2));
    assert_eq!(tally.get("Hayley"), Some(&2));
    assert_eq!(vote_outcome(&tally), None);
}

#[test]
fn strict_plurality_eliminates() {
    let votes: BTreeMap<String, String> = [
        ("Ginger", "Jacob"),
        ("Paul", "Jacob"),
        ("Jacob", "Hayley"),
    ]
    .into_iter()
    .map(|(a, b)| (a.to_string(), b.to_string()))
    .collect();
    assert_eq!(vote_outcome(&tally_votes(&votes)), Some("Jacob".to_string()));
}

#[test]
fn no_ballots_no_elimination() {
    assert_eq!(vote_outcome(&BTreeMap::new()), None);
}

#[test]
fn pack_target_prefers_majority_then_lead_wolf() {
    let p = |w: &str, t: &str| (w.to_string(), t.to_string());
    assert_eq!(
        pack_target(&[p("Jacob", "Hayley"), p("Mason", "Derek"), p("Isaac", "Derek")]),
        Some("Derek".to_string())
    );
    assert_eq!(
        pack_target(&[p("Jacob", "Hayley"), p("Mason", "Derek")]),
        Some("Hayley".to_string())
    );
    assert_eq!(pack_target(&[]), None);
}

#[test]
fn speaking_order_rotates_each_round() {
    let alive = names(&["A", "B", "C"]);
    assert_eq!(speaking_order(&alive, 1), names(&["A", "B", "C"]));
    assert_eq!(speaking_order(&alive, 2), names(&["B", "C", "A"]));
    assert_eq!(speaking_order(&alive, 4), names(&["A", "B", "C"]));
    assert!(speaking_order(&[], 3).is_empty());
}
