//! Host-side match driver
//!
//! Owns the authoritative [`GameState`] and feeds it the way every replica
//! must: queued actions first, in a fixed order, then fixed-size ticks.
//! Frame time is accumulated and spent in `TICK_MS` steps.

use std::collections::HashSet;

use crate::consts::*;
use crate::rules::{Rules, RulesError};
use crate::sim::{
    Action, ActionError, GameEvent, GameState, MatchResults, PlayerId, apply_action, tick,
};

/// Errors produced while starting a session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("a match needs {min} to {max} players, got {0}", min = MIN_PLAYERS, max = MAX_PLAYERS)]
    PlayerCount(usize),

    #[error("player '{0}' appears more than once")]
    DuplicatePlayer(PlayerId),

    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// An action waiting for the next frame
#[derive(Debug, Clone)]
struct Submission {
    player: PlayerId,
    action: Action,
}

/// What happened during one [`Session::advance`] call
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Ticks simulated this frame
    pub ticks: u32,
    /// Actions that passed validation
    pub applied: usize,
    /// Actions refused, in the order they were tried
    pub rejected: Vec<ActionError>,
    /// Set on the single frame where the match ended
    pub results: Option<MatchResults>,
}

/// Longest frame the accumulator will take in one call
pub const MAX_FRAME_MS: f32 = 100.0;

/// A running match
#[derive(Debug)]
pub struct Session {
    state: GameState,
    accumulator: f32,
    queue: Vec<Submission>,
    results: Option<MatchResults>,
}

impl Session {
    /// Validate setup parameters and build the initial state
    pub fn new(seed: u64, player_ids: &[PlayerId], rules: Rules) -> Result<Self, SessionError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_ids.len()) {
            return Err(SessionError::PlayerCount(player_ids.len()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = player_ids.iter().find(|id| !seen.insert(*id)) {
            return Err(SessionError::DuplicatePlayer(dup.clone()));
        }
        rules.validate()?;

        log::info!("Session started with seed: {}", seed);
        Ok(Self {
            state: GameState::with_rules(seed, player_ids, rules),
            accumulator: 0.0,
            queue: Vec::new(),
            results: None,
        })
    }

    /// Read-only view of the authoritative state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn results(&self) -> Option<&MatchResults> {
        self.results.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.state.game_over
    }

    /// Queue an action for the next frame
    pub fn submit(&mut self, player: PlayerId, action: Action) {
        self.queue.push(Submission { player, action });
    }

    /// Apply an action right away, outside the frame queue
    pub fn apply_now(&mut self, player: &PlayerId, action: Action) -> Result<(), ActionError> {
        apply_action(&mut self.state, player, action)
    }

    /// Feedback events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Run one host frame of `frame_dt` elapsed time
    pub fn advance(&mut self, frame_dt: f32) -> FrameReport {
        let mut report = FrameReport::default();

        // Registry order first, submission order within a player
        let mut queue = std::mem::take(&mut self.queue);
        let state = &self.state;
        queue.sort_by_key(|s| state.index_of(&s.player).unwrap_or(usize::MAX));

        for Submission { player, action } in queue {
            match apply_action(&mut self.state, &player, action) {
                Ok(()) => report.applied += 1,
                Err(err) => report.rejected.push(err),
            }
        }

        // A bogus frame time (NaN, infinity) counts as no time at all
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_MS)
        } else {
            0.0
        };
        self.accumulator += frame_dt;
        while self.accumulator >= TICK_MS && report.ticks < MAX_SUBSTEPS {
            self.accumulator -= TICK_MS;
            report.ticks += 1;

            if let Some(results) = tick(&mut self.state, TICK_MS) {
                log::info!("Session finished after match clock ran out");
                self.results = Some(results.clone());
                report.results = Some(results);
                self.accumulator = 0.0;
                break;
            }
        }

        report
    }
}
