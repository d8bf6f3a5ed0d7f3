//! Domain layer: pure game model and rules, no I/O.

pub mod player;
pub mod roles;
pub mod roster;
pub mod round;
pub mod rules;
pub mod state;

#[cfg(test)]
pub(crate) mod test_prelude;
#[cfg(test)]
pub(crate) mod test_state_helpers;
#[cfg(test)]
mod tests_props_votes;
#[cfg(test)]
mod tests_rules;

// Re-exports for ergonomics
pub use player::{GameView, Player, RoleState};
pub use roles::{ActionKind, Alignment, Role};
pub use roster::{deal, Roster, RosterSpec, NAME_POOL};
pub use round::{ActionFailure, DayOutcome, Investigation, NightOutcome, Round, Statement};
pub use state::GameState;
