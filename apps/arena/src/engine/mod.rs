//! Round engine: drives one game through Night, Resolving and Day until a
//! winner is known, a fatal error occurs or a stop is requested.

mod log;
mod pool;
pub mod prompts;
pub mod reply;

use std::collections::BTreeSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::rules::{
    check_winner, eligible_targets, pack_target, speaking_order, tally_votes, vote_outcome,
};
use crate::domain::{
    ActionFailure, ActionKind, Alignment, DayOutcome, GameState, Investigation, NightOutcome,
    Player, Round, Statement,
};
use crate::error::ArenaError;
use crate::gateway::{Constraints, GenerationError, RoleContext, SharedGateway};

pub use log::{LogEntry, RoundLog};
pub use pool::{GenerationRequest, WorkerPool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Worker pool size, shared by every phase of this engine.
    pub threads: usize,
    /// Statements each player may make per day.
    pub max_debate_turns: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Night,
    Resolving,
    Day,
    Terminal,
}

/// Why the run loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(Alignment),
    Stopped,
    Failed(String),
}

/// Notified after every completed round, before the stop checkpoint.
#[async_trait]
pub trait RoundObserver: Send + Sync {
    async fn round_completed(&self, state: &GameState, logs: &[RoundLog]);
}

/// What the night produced, before resolution.
#[derive(Default)]
struct NightChoices {
    proposals: Vec<(String, String)>,
    /// `(doctor, choice)` when the doctor was asked at all.
    protect: Option<(String, Option<String>)>,
    investigate: Option<(String, String)>,
}

pub struct RoundEngine {
    session_id: String,
    pool: WorkerPool,
    settings: EngineSettings,
    phase: Mutex<EnginePhase>,
}

impl RoundEngine {
    pub fn new(session_id: impl Into<String>, gateway: SharedGateway, settings: EngineSettings) -> Self {
        Self {
            session_id: session_id.into(),
            pool: WorkerPool::new(gateway, settings.threads),
            settings,
            phase: Mutex::new(EnginePhase::Night),
        }
    }

    pub fn phase(&self) -> EnginePhase {
        *self.phase.lock()
    }

    fn enter(&self, phase: EnginePhase) {
        *self.phase.lock() = phase;
    }

    /// Play rounds until the game is decided, fails or `cancel` fires.
    ///
    /// The stop signal is only looked at before a Night starts; a round in
    /// progress always runs to completion.
    pub async fn run(
        &self,
        mut state: GameState,
        mut logs: Vec<RoundLog>,
        cancel: &CancellationToken,
        observer: &dyn RoundObserver,
    ) -> RunOutcome {
        loop {
            if let Some(winner) = state.winner {
                self.enter(EnginePhase::Terminal);
                return RunOutcome::Completed(winner);
            }
            if let Some(message) = &state.error_message {
                self.enter(EnginePhase::Terminal);
                return RunOutcome::Failed(message.clone());
            }
            if cancel.is_cancelled() {
                info!(session_id = %self.session_id, round = state.completed_rounds(), "stop honoured");
                self.enter(EnginePhase::Terminal);
                return RunOutcome::Stopped;
            }

            let number = state.completed_rounds() as u32 + 1;
            let mut log = RoundLog::new(number);
            if let Err(e) = self.play_round(&mut state, &mut log).await {
                error!(session_id = %self.session_id, round = number, error = %e, "round failed");
                self.enter(EnginePhase::Terminal);
                return RunOutcome::Failed(e.to_string());
            }
            logs.push(log);

            info!(
                session_id = %self.session_id,
                round = number,
                alive = state.alive.len(),
                winner = ?state.winner,
                "round completed"
            );
            observer.round_completed(&state, &logs).await;
        }
    }

    /// Play exactly one round and append it to `state`.
    pub async fn play_round(&self, state: &mut GameState, log: &mut RoundLog) -> Result<(), ArenaError> {
        let number = state.completed_rounds() as u32 + 1;
        let mut failures = Vec::new();
        state.rebuild_views(number);

        self.enter(EnginePhase::Night);
        let choices = self.night(state, number, log, &mut failures).await?;

        self.enter(EnginePhase::Resolving);
        let night = resolve_night(state, choices);
        let mut winner = check_winner(state);

        let day = if winner.is_none() {
            self.enter(EnginePhase::Day);
            let day = self.day(state, number, log, &mut failures).await?;
            if let Some(out) = &day.eliminated {
                state.eliminate(out);
            }
            winner = check_winner(state);
            Some(day)
        } else {
            None
        };

        state.rebuild_views(number);
        state.push_round(Round {
            number,
            night,
            day,
            failures,
        })?;

        if let Some(side) = winner {
            info!(session_id = %self.session_id, round = number, winner = ?side, "winner decided");
            state.winner = Some(side);
            self.enter(EnginePhase::Terminal);
        }
        Ok(())
    }

    fn context(&self, player: &Player) -> RoleContext {
        RoleContext {
            session_id: self.session_id.clone(),
            player: player.clone(),
        }
    }

    fn note_failure(
        &self,
        failures: &mut Vec<ActionFailure>,
        player: &str,
        action: ActionKind,
        error: &GenerationError,
    ) {
        warn!(
            session_id = %self.session_id,
            player,
            action = %action,
            error = %error,
            "generation failed, treating as no action"
        );
        failures.push(ActionFailure {
            player: player.to_string(),
            action,
            error: error.to_string(),
        });
    }

    /// Parse one reply, recording it in the log and as a failure if unusable.
    fn settle(
        &self,
        player: &str,
        request: &GenerationRequest,
        answer: Result<String, GenerationError>,
        log: &mut RoundLog,
        failures: &mut Vec<ActionFailure>,
    ) -> Option<Option<String>> {
        let action = request.constraints.action;
        let parsed = match &answer {
            Ok(text) => reply::parse_target(text, &request.constraints),
            Err(e) => Err(e.clone()),
        };
        let raw = answer.as_deref().ok();
        match parsed {
            Ok(target) => {
                log.record(player, action, &request.prompt, raw, None);
                Some(target)
            }
            Err(e) => {
                log.record(player, action, &request.prompt, raw, Some(e.to_string()));
                self.note_failure(failures, player, action, &e);
                None
            }
        }
    }

    async fn night(
        &self,
        state: &GameState,
        number: u32,
        log: &mut RoundLog,
        failures: &mut Vec<ActionFailure>,
    ) -> Result<NightChoices, ArenaError> {
        let mut requests = Vec::new();
        for player in state.alive_players() {
            let Some(action) = player.night_action() else {
                continue;
            };
            let choices = eligible_targets(state, player, action);
            if choices.is_empty() {
                if action == ActionKind::Investigate {
                    debug!(player = %player.name, "seer has nobody left to investigate");
                    continue;
                }
                return Err(ArenaError::fatal_round(format!(
                    "{} has no eligible {action} targets in round {number}",
                    player.name
                )));
            }
            requests.push(GenerationRequest {
                context: self.context(player),
                prompt: prompts::night(player, &state.rounds, action, &choices),
                constraints: Constraints::choose(action, choices),
            });
        }

        let replies = self.pool.dispatch(requests.clone()).await;
        let mut outcome = NightChoices::default();
        let mut answered = 0usize;

        for (request, answer) in requests.iter().zip(replies) {
            let name = request.context.player.name.clone();
            let action = request.constraints.action;
            let decision = self.settle(&name, request, answer, log, failures);
            if decision.is_some() {
                answered += 1;
            }
            let target = decision.flatten();
            match action {
                ActionKind::Eliminate => {
                    if let Some(t) = target {
                        outcome.proposals.push((name, t));
                    }
                }
                ActionKind::Protect => outcome.protect = Some((name, target)),
                ActionKind::Investigate => outcome.investigate = target.map(|t| (name, t)),
                ActionKind::Debate | ActionKind::Vote => {}
            }
        }

        if !requests.is_empty() && answered == 0 {
            return Err(ArenaError::fatal_round(format!(
                "every night action failed in round {number}"
            )));
        }
        Ok(outcome)
    }

    async fn day(
        &self,
        state: &GameState,
        number: u32,
        log: &mut RoundLog,
        failures: &mut Vec<ActionFailure>,
    ) -> Result<DayOutcome, ArenaError> {
        let order = speaking_order(&state.alive, number);
        let debate = self.debate(state, &order, log, failures).await;

        let mut requests = Vec::new();
        for name in &state.alive {
            let Some(player) = state.player(name) else {
                continue;
            };
            let choices = eligible_targets(state, player, ActionKind::Vote);
            if choices.is_empty() {
                return Err(ArenaError::fatal_round(format!(
                    "{name} has no eligible vote targets in round {number}"
                )));
            }
            requests.push(GenerationRequest {
                context: self.context(player),
                prompt: prompts::vote(player, &state.rounds, &debate, &choices),
                constraints: Constraints::choose(ActionKind::Vote, choices),
            });
        }

        let replies = self.pool.dispatch(requests.clone()).await;
        let mut votes = std::collections::BTreeMap::new();
        let mut answered = 0usize;
        for (request, answer) in requests.iter().zip(replies) {
            let voter = request.context.player.name.clone();
            if let Some(choice) = self.settle(&voter, request, answer, log, failures) {
                answered += 1;
                if let Some(candidate) = choice {
                    votes.insert(voter, candidate);
                }
            }
        }
        if !requests.is_empty() && answered == 0 {
            return Err(ArenaError::fatal_round(format!(
                "every vote failed in round {number}"
            )));
        }

        let tally = tally_votes(&votes);
        let eliminated = vote_outcome(&tally);
        debug!(session_id = %self.session_id, round = number, ?tally, ?eliminated, "votes counted");

        Ok(DayOutcome {
            speaking_order: order,
            debate,
            votes,
            tally,
            eliminated,
        })
    }

    /// Sequential statements; a failed statement only costs that turn.
    async fn debate(
        &self,
        state: &GameState,
        order: &[String],
        log: &mut RoundLog,
        failures: &mut Vec<ActionFailure>,
    ) -> Vec<Statement> {
        let mut statements: Vec<Statement> = Vec::new();
        let mut passed: BTreeSet<&str> = BTreeSet::new();

        for _turn in 0..self.settings.max_debate_turns {
            for speaker in order {
                if passed.contains(speaker.as_str()) {
                    continue;
                }
                let Some(player) = state.player(speaker) else {
                    continue;
                };
                let request = GenerationRequest {
                    context: self.context(player),
                    prompt: prompts::debate(player, &state.rounds, &statements),
                    constraints: Constraints::statement(),
                };
                let answer = self.pool.generate(request.clone()).await;
                let parsed = match &answer {
                    Ok(text) => reply::parse_statement(text),
                    Err(e) => Err(e.clone()),
                };
                let raw = answer.as_deref().ok();
                match parsed {
                    Ok(Some(text)) => {
                        log.record(speaker, ActionKind::Debate, &request.prompt, raw, None);
                        statements.push(Statement {
                            speaker: speaker.clone(),
                            text,
                        });
                    }
                    Ok(None) => {
                        log.record(speaker, ActionKind::Debate, &request.prompt, raw, None);
                        passed.insert(speaker.as_str());
                    }
                    Err(e) => {
                        log.record(speaker, ActionKind::Debate, &request.prompt, raw, Some(e.to_string()));
                        self.note_failure(failures, speaker, ActionKind::Debate, &e);
                    }
                }
            }
            if passed.len() == order.len() {
                break;
            }
        }
        statements
    }
}

/// Apply the night's choices: protection, investigation, then the attack.
fn resolve_night(state: &mut GameState, choices: NightChoices) -> NightOutcome {
    let NightChoices {
        proposals,
        protect,
        investigate,
    } = choices;

    let mut protected = None;
    if let Some((doctor, choice)) = protect {
        if let Some(player) = state.player_mut(&doctor) {
            player.record_protection(choice.clone());
        }
        protected = choice;
    }

    let investigation = investigate.and_then(|(seer, target)| {
        let alignment = state.player(&target)?.alignment();
        if let Some(player) = state.player_mut(&seer) {
            player.record_investigation(&target, alignment);
        }
        Some(Investigation {
            seer,
            target,
            alignment,
        })
    });

    let eliminate = pack_target(&proposals);
    let saved = eliminate.is_some() && eliminate == protected;
    let casualty = if saved { None } else { eliminate.clone() };
    if let Some(dead) = &casualty {
        state.eliminate(dead);
    }

    NightOutcome {
        eliminate,
        protect: protected,
        investigation,
        saved,
        casualty,
    }
}
