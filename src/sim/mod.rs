//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - State is passed in explicitly, never global
//! - Seeded RNG only (spawn positions)
//! - Stable iteration order (player registry order)
//! - No rendering, audio or networking dependencies

pub mod actions;
pub mod collision;
pub mod scoring;
pub mod state;
pub mod tick;

pub use actions::{
    Action, ActionError, Rejection, apply_action, close_eyes, hide_ball, move_player, open_eyes,
    show_ball, take_ball, throw_ball,
};
pub use collision::{WallContact, bounce_off_walls, distance, within_reach};
pub use scoring::{MatchResults, Outcome, rank_players};
pub use state::{Ball, Field, GameEvent, GameState, Player, PlayerId, setup};
pub use tick::tick;
