//! Per-update simulation step
//!
//! Advances the match clock, moves a free ball, bounces it off the walls and
//! resolves hits. Ball velocity is a per-tick displacement, so the host must
//! call this at a steady rate.

use super::collision::{bounce_off_walls, within_reach};
use super::scoring::{MatchResults, rank_players};
use super::state::{GameEvent, GameState, PlayerId};
use crate::rules::Attribution;

/// Advance the game state by one tick of `dt` elapsed time
///
/// Returns the final results on the one tick where the match clock runs out.
pub fn tick(state: &mut GameState, dt: f32) -> Option<MatchResults> {
    // A finished match is frozen
    if state.game_over {
        return None;
    }

    state.game_time -= dt.max(0.0);

    if state.game_time <= 0.0 {
        state.game_over = true;
        let results = rank_players(&state.players);
        log::info!("Match over: {:?}", results.0);
        state.events.push(GameEvent::MatchOver {
            results: results.clone(),
        });
        return Some(results);
    }

    if state.ball.moving {
        advance_ball(state);
        update_release(state);
        if state.ball.visible {
            resolve_hits(state);
        }
    }

    None
}

/// Move the free ball one step and bounce it off the walls
fn advance_ball(state: &mut GameState) {
    let ball = &mut state.ball;
    ball.pos += ball.vel;

    let contact = bounce_off_walls(
        &mut ball.pos,
        &mut ball.vel,
        &state.field,
        state.rules.clamp_ball_to_field,
    );
    if contact.any() {
        state.events.push(GameEvent::WallBounce { pos: ball.pos });
    }
}

/// Stop the ball on the first visible player it reaches
fn resolve_hits(state: &mut GameState) {
    let radius = state.rules.collision_radius;

    for idx in 0..state.players.len() {
        // The ball stops on the first hit; nobody else can be struck this tick
        if !state.ball.moving {
            break;
        }

        let player = &state.players[idx];
        if state.ball.is_held_by(&player.id) || !player.visible {
            continue;
        }
        if state.ball.clearing_thrower && state.ball.last_thrown_by.as_ref() == Some(&player.id) {
            continue;
        }
        if !within_reach(player.pos, state.ball.pos, radius) {
            continue;
        }

        let struck = player.id.clone();
        let scorer = find_scorer(state, &struck);
        if let Some(scorer_id) = &scorer {
            if let Some(p) = state.player_mut(scorer_id) {
                p.score += 1;
            }
        }
        log::debug!("{struck} hit, point to {scorer:?}");

        state.ball.stop();
        state.events.push(GameEvent::PlayerHit { struck, scorer });
    }
}

/// With release grace the thrower becomes a valid target only once the ball
/// has been out of their reach.
fn update_release(state: &mut GameState) {
    if !state.ball.clearing_thrower {
        return;
    }
    let radius = state.rules.collision_radius;
    let still_close = state
        .ball
        .last_thrown_by
        .as_ref()
        .and_then(|id| state.player(id))
        .is_some_and(|thrower| within_reach(thrower.pos, state.ball.pos, radius));
    if !still_close {
        state.ball.clearing_thrower = false;
    }
}

/// Who earns the point for hitting `struck`
fn find_scorer(state: &GameState, struck: &PlayerId) -> Option<PlayerId> {
    match state.rules.attribution {
        Attribution::ListOrder => state
            .players
            .iter()
            .find(|p| &p.id != struck && !state.ball.is_held_by(&p.id))
            .map(|p| p.id.clone()),
        Attribution::Thrower => state
            .ball
            .last_thrown_by
            .as_ref()
            .filter(|thrower| *thrower != struck)
            .cloned(),
    }
}
