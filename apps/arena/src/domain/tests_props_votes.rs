//! Property tests for day vote resolution (pure domain).
//!
//! Contract:
//! - The tally only depends on the multiset of ballots, never on arrival order.
//! - A tie at the top eliminates nobody.
//! - A strict leader is always eliminated.

use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::domain::rules::{tally_votes, vote_outcome};
use crate::domain::test_prelude;

const CANDIDATES: &[&str] = &["Derek", "Scott", "Jacob", "Isaac", "Hayley"];

/// Ballots as (voter index, candidate index) with unique voters.
fn ballots() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec(0..CANDIDATES.len(), 0..12).prop_map(|choices| {
        choices
            .into_iter()
            .enumerate()
            .collect::<Vec<(usize, usize)>>()
    })
}

fn to_votes(ballots: &[(usize, usize)]) -> BTreeMap<String, String> {
    ballots
        .iter()
        .map(|(voter, candidate)| (format!("voter-{voter}"), CANDIDATES[*candidate].to_string()))
        .collect()
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: shuffling ballot arrival order never changes the outcome.
    #[test]
    fn prop_outcome_is_order_independent(
        ballots in ballots(),
        seed in any::<u64>(),
    ) {
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        let mut shuffled = ballots.clone();
        shuffled.shuffle(&mut rand::rngs::StdRng::seed_from_u64(seed));

        let a = vote_outcome(&tally_votes(&to_votes(&ballots)));
        let b = vote_outcome(&tally_votes(&to_votes(&shuffled)));
        prop_assert_eq!(a, b);
    }

    /// Property: two candidates sharing the top count means no elimination,
    /// no matter how often the same ballots are evaluated.
    #[test]
    fn prop_tie_never_eliminates(
        per_candidate in 1usize..5,
        a in 0..CANDIDATES.len(),
        offset in 1..CANDIDATES.len(),
    ) {
        let b = (a + offset) % CANDIDATES.len();
        let mut ballots = Vec::new();
        for i in 0..per_candidate {
            ballots.push((i * 2, a));
            ballots.push((i * 2 + 1, b));
        }
        let votes = to_votes(&ballots);
        for _ in 0..3 {
            prop_assert_eq!(vote_outcome(&tally_votes(&votes)), None);
        }
    }

    /// Property: whenever the outcome names somebody, they hold strictly the most votes.
    #[test]
    fn prop_winner_is_strict_leader(ballots in ballots()) {
        let tally = tally_votes(&to_votes(&ballots));
        if let Some(leader) = vote_outcome(&tally) {
            let leader_votes = tally[&leader];
            for (candidate, count) in &tally {
                if *candidate != leader {
                    prop_assert!(*count < leader_votes);
                }
            }
        } else if let Some(top) = tally.values().max() {
            prop_assert!(tally.values().filter(|c| *c == top).count() > 1);
        }
    }
}
