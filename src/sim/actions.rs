//! Player actions
//!
//! Every action validates against the current state before touching it, so
//! a rejected action leaves the state exactly as it was.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::within_reach;
use super::state::{GameEvent, GameState, PlayerId};
use crate::normalize_or_zero;

/// An action submitted by one player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    MovePlayer { direction: Vec2 },
    TakeBall,
    HideBall,
    ShowBall,
    ThrowBall { direction: Vec2 },
    CloseEyes,
    OpenEyes,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::MovePlayer { .. } => "movePlayer",
            Action::TakeBall => "takeBall",
            Action::HideBall => "hideBall",
            Action::ShowBall => "showBall",
            Action::ThrowBall { .. } => "throwBall",
            Action::CloseEyes => "closeEyes",
            Action::OpenEyes => "openEyes",
        }
    }
}

/// Why an action was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    UnknownPlayer,
    MatchOver,
    NotHoldingBall,
    BallOutOfReach,
    BallHidden,
    BallMoving,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::UnknownPlayer => "player is not in this match",
            Rejection::MatchOver => "match is over",
            Rejection::NotHoldingBall => "player does not have the ball",
            Rejection::BallOutOfReach => "ball is out of reach",
            Rejection::BallHidden => "ball is hidden",
            Rejection::BallMoving => "ball is moving",
        };
        f.write_str(reason)
    }
}

/// Errors produced by action handlers
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("invalid action {action} by {player}: {reason}")]
    InvalidAction {
        player: PlayerId,
        action: &'static str,
        reason: Rejection,
    },
}

impl ActionError {
    pub fn reason(&self) -> Rejection {
        match self {
            ActionError::InvalidAction { reason, .. } => *reason,
        }
    }
}

/// Validate and apply one action for `player`
pub fn apply_action(
    state: &mut GameState,
    player: &PlayerId,
    action: Action,
) -> Result<(), ActionError> {
    let result = match action {
        Action::MovePlayer { direction } => move_player(state, player, direction),
        Action::TakeBall => take_ball(state, player),
        Action::HideBall => hide_ball(state, player),
        Action::ShowBall => show_ball(state, player),
        Action::ThrowBall { direction } => throw_ball(state, player, direction),
        Action::CloseEyes => close_eyes(state, player),
        Action::OpenEyes => open_eyes(state, player),
    };
    if let Err(err) = &result {
        log::debug!("{err}");
    }
    result
}

/// Checks shared by every action; returns the actor's registry index
fn check_actor(
    state: &GameState,
    player: &PlayerId,
    action: &'static str,
) -> Result<usize, ActionError> {
    let reject = |reason| ActionError::InvalidAction {
        player: player.clone(),
        action,
        reason,
    };
    let idx = state
        .index_of(player)
        .ok_or_else(|| reject(Rejection::UnknownPlayer))?;
    if state.game_over {
        return Err(reject(Rejection::MatchOver));
    }
    Ok(idx)
}

fn require_holder(
    state: &GameState,
    player: &PlayerId,
    action: &'static str,
) -> Result<(), ActionError> {
    if state.has_ball(player) {
        Ok(())
    } else {
        Err(ActionError::InvalidAction {
            player: player.clone(),
            action,
            reason: Rejection::NotHoldingBall,
        })
    }
}

/// Step toward `direction` at player speed, staying on the field
pub fn move_player(
    state: &mut GameState,
    player: &PlayerId,
    direction: Vec2,
) -> Result<(), ActionError> {
    let idx = check_actor(state, player, "movePlayer")?;

    let step = normalize_or_zero(direction) * state.rules.player_speed;
    let pos = state.field.clamp(state.players[idx].pos + step);
    state.players[idx].pos = pos;

    // Carried ball follows
    if state.ball.is_held_by(player) {
        state.ball.pos = pos;
    }
    Ok(())
}

/// Pick up a visible, resting ball within reach
pub fn take_ball(state: &mut GameState, player: &PlayerId) -> Result<(), ActionError> {
    const ACTION: &str = "takeBall";
    let idx = check_actor(state, player, ACTION)?;

    let pos = state.players[idx].pos;
    let ball = &state.ball;
    let reason = if !within_reach(pos, ball.pos, state.rules.collision_radius) {
        Some(Rejection::BallOutOfReach)
    } else if !ball.visible {
        Some(Rejection::BallHidden)
    } else if ball.moving {
        Some(Rejection::BallMoving)
    } else {
        None
    };
    if let Some(reason) = reason {
        return Err(ActionError::InvalidAction {
            player: player.clone(),
            action: ACTION,
            reason,
        });
    }

    // Replacing the holder takes the ball from anyone else
    state.ball.holder = Some(player.clone());
    state.ball.pos = pos;
    state.events.push(GameEvent::BallTaken {
        player: player.clone(),
    });
    Ok(())
}

pub fn hide_ball(state: &mut GameState, player: &PlayerId) -> Result<(), ActionError> {
    check_actor(state, player, "hideBall")?;
    require_holder(state, player, "hideBall")?;

    state.ball.visible = false;
    state.events.push(GameEvent::BallHidden {
        player: player.clone(),
    });
    Ok(())
}

pub fn show_ball(state: &mut GameState, player: &PlayerId) -> Result<(), ActionError> {
    check_actor(state, player, "showBall")?;
    require_holder(state, player, "showBall")?;

    state.ball.visible = true;
    state.events.push(GameEvent::BallShown {
        player: player.clone(),
    });
    Ok(())
}

/// Release the held, visible ball along `direction`
pub fn throw_ball(
    state: &mut GameState,
    player: &PlayerId,
    direction: Vec2,
) -> Result<(), ActionError> {
    const ACTION: &str = "throwBall";
    check_actor(state, player, ACTION)?;
    require_holder(state, player, ACTION)?;
    if !state.ball.visible {
        return Err(ActionError::InvalidAction {
            player: player.clone(),
            action: ACTION,
            reason: Rejection::BallHidden,
        });
    }

    let vel = normalize_or_zero(direction) * state.rules.ball_speed;
    let grace = state.rules.release_grace;
    let ball = &mut state.ball;
    ball.vel = vel;
    ball.moving = true;
    ball.holder = None;
    ball.last_thrown_by = Some(player.clone());
    ball.clearing_thrower = grace;

    log::debug!("{player} threw the ball at {vel}");
    state.events.push(GameEvent::BallThrown {
        player: player.clone(),
        vel,
    });
    Ok(())
}

pub fn close_eyes(state: &mut GameState, player: &PlayerId) -> Result<(), ActionError> {
    let idx = check_actor(state, player, "closeEyes")?;
    state.players[idx].visible = false;
    state.events.push(GameEvent::EyesClosed {
        player: player.clone(),
    });
    Ok(())
}

pub fn open_eyes(state: &mut GameState, player: &PlayerId) -> Result<(), ActionError> {
    let idx = check_actor(state, player, "openEyes")?;
    state.players[idx].visible = true;
    state.events.push(GameEvent::EyesOpened {
        player: player.clone(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_MS;
    use crate::sim::tick;

    fn two_players() -> GameState {
        let mut state = GameState::new(42, &[PlayerId::from("a"), PlayerId::from("b")]);
        state.players[0].pos = Vec2::new(380.0, 300.0);
        state.players[1].pos = Vec2::new(700.0, 300.0);
        state
    }

    fn a() -> PlayerId {
        "a".into()
    }

    fn b() -> PlayerId {
        "b".into()
    }

    #[test]
    fn test_take_and_throw() {
        let mut state = two_players();
        take_ball(&mut state, &a()).unwrap();
        assert!(state.has_ball(&a()));
        assert_eq!(state.ball.pos, state.players[0].pos);

        throw_ball(&mut state, &a(), Vec2::new(1.0, 0.0)).unwrap();
        assert!(state.ball.moving);
        assert_eq!(state.ball.vel, Vec2::new(10.0, 0.0));
        assert!(!state.has_ball(&a()));
        assert_eq!(state.ball.last_thrown_by, Some(a()));
    }

    #[test]
    fn test_throw_normalizes_direction() {
        let mut state = two_players();
        take_ball(&mut state, &a()).unwrap();
        throw_ball(&mut state, &a(), Vec2::new(0.0, -250.0)).unwrap();
        assert_eq!(state.ball.vel, Vec2::new(0.0, -10.0));
    }

    #[test]
    fn test_take_out_of_reach() {
        let mut state = two_players();
        let before = state.clone();
        let err = take_ball(&mut state, &b()).unwrap_err();
        assert_eq!(err.reason(), Rejection::BallOutOfReach);
        assert_eq!(state, before);
    }

    #[test]
    fn test_take_hidden_ball_rejected() {
        let mut state = two_players();
        take_ball(&mut state, &a()).unwrap();
        hide_ball(&mut state, &a()).unwrap();
        state.players[1].pos = state.players[0].pos + Vec2::new(5.0, 0.0);

        let before = state.clone();
        let err = take_ball(&mut state, &b()).unwrap_err();
        assert_eq!(err.reason(), Rejection::BallHidden);
        assert_eq!(state, before);
    }

    #[test]
    fn test_take_moving_ball_rejected() {
        let mut state = two_players();
        take_ball(&mut state, &a()).unwrap();
        throw_ball(&mut state, &a(), Vec2::new(0.0, 1.0)).unwrap();
        let err = take_ball(&mut state, &a()).unwrap_err();
        assert_eq!(err.reason(), Rejection::BallMoving);
    }

    #[test]
    fn test_steal_transfers_possession() {
        let mut state = two_players();
        take_ball(&mut state, &a()).unwrap();
        state.players[1].pos = state.players[0].pos + Vec2::new(0.0, 10.0);

        take_ball(&mut state, &b()).unwrap();
        assert!(state.has_ball(&b()));
        assert!(!state.has_ball(&a()));
    }

    #[test]
    fn test_hide_show_require_holder() {
        let mut state = two_players();
        let before = state.clone();
        for action in [
            Action::HideBall,
            Action::ShowBall,
            Action::ThrowBall {
                direction: Vec2::X,
            },
        ] {
            let err = apply_action(&mut state, &b(), action).unwrap_err();
            assert_eq!(err.reason(), Rejection::NotHoldingBall);
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_hide_then_show() {
        let mut state = two_players();
        take_ball(&mut state, &a()).unwrap();
        hide_ball(&mut state, &a()).unwrap();
        assert!(!state.ball.visible);
        show_ball(&mut state, &a()).unwrap();
        assert!(state.ball.visible);
    }

    #[test]
    fn test_throw_hidden_ball_rejected() {
        let mut state = two_players();
        take_ball(&mut state, &a()).unwrap();
        hide_ball(&mut state, &a()).unwrap();

        let before = state.clone();
        let err = throw_ball(&mut state, &a(), Vec2::X).unwrap_err();
        assert_eq!(err.reason(), Rejection::BallHidden);
        assert_eq!(state, before);
    }

    #[test]
    fn test_move_clamps_and_carries_ball() {
        let mut state = two_players();
        take_ball(&mut state, &a()).unwrap();
        state.players[0].pos = Vec2::new(2.0, 300.0);
        state.ball.pos = state.players[0].pos;

        move_player(&mut state, &a(), Vec2::new(-1.0, 0.0)).unwrap();
        assert_eq!(state.players[0].pos, Vec2::new(0.0, 300.0));
        assert_eq!(state.ball.pos, Vec2::new(0.0, 300.0));

        move_player(&mut state, &a(), Vec2::new(3.0, 4.0)).unwrap();
        assert!((state.players[0].pos - Vec2::new(3.0, 304.0)).length() < 1e-4);
        assert_eq!(state.ball.pos, state.players[0].pos);
    }

    #[test]
    fn test_move_zero_direction_is_noop() {
        let mut state = two_players();
        let before = state.players[1].pos;
        move_player(&mut state, &b(), Vec2::ZERO).unwrap();
        assert_eq!(state.players[1].pos, before);
    }

    #[test]
    fn test_move_without_ball_leaves_ball() {
        let mut state = two_players();
        let ball_before = state.ball.pos;
        move_player(&mut state, &b(), Vec2::Y).unwrap();
        assert_eq!(state.ball.pos, ball_before);
    }

    #[test]
    fn test_eyes() {
        let mut state = two_players();
        close_eyes(&mut state, &b()).unwrap();
        assert!(!state.players[1].visible);
        open_eyes(&mut state, &b()).unwrap();
        assert!(state.players[1].visible);
    }

    #[test]
    fn test_unknown_player_rejected() {
        let mut state = two_players();
        let before = state.clone();
        let err = apply_action(&mut state, &"mallory".into(), Action::CloseEyes).unwrap_err();
        assert_eq!(err.reason(), Rejection::UnknownPlayer);
        assert_eq!(state, before);
    }

    #[test]
    fn test_actions_rejected_after_match_over() {
        let mut state = two_players();
        state.game_time = 1.0;
        tick::tick(&mut state, TICK_MS);
        let err = apply_action(&mut state, &a(), Action::OpenEyes).unwrap_err();
        assert_eq!(err.reason(), Rejection::MatchOver);
    }

    #[test]
    fn test_error_message() {
        let err = ActionError::InvalidAction {
            player: "b".into(),
            action: "hideBall",
            reason: Rejection::NotHoldingBall,
        };
        assert_eq!(
            err.to_string(),
            "invalid action hideBall by b: player does not have the ball"
        );
    }

    #[test]
    fn test_action_json_shape() {
        let action: Action =
            serde_json::from_str(r#"{ "type": "throw_ball", "direction": [1.0, 0.0] }"#).unwrap();
        assert_eq!(action, Action::ThrowBall { direction: Vec2::X });
        assert_eq!(action.name(), "throwBall");
    }
}
