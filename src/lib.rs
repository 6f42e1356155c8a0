//! Blackout Ball - hide, throw and dodge on a shared field
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state, tick, actions, scoring)
//! - `rules`: Data-driven match tuning
//! - `session`: Host-side driver (fixed timestep, action ordering, match end)
//! - `scoreboard`: Ranked standings for presentation

pub mod rules;
pub mod scoreboard;
pub mod session;
pub mod sim;

pub use rules::{Attribution, Rules, RulesError};
pub use scoreboard::{Scoreboard, Standing};
pub use session::{Session, SessionError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed host tick interval in milliseconds (60 Hz)
    pub const TICK_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Players per match (inclusive bounds, enforced by the host)
    pub const MIN_PLAYERS: usize = 2;
    pub const MAX_PLAYERS: usize = 4;

    /// Field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
    /// Players never spawn closer than this to a wall
    pub const SPAWN_MARGIN: f32 = 50.0;

    /// Ball displacement per tick when thrown
    pub const BALL_SPEED: f32 = 10.0;
    /// Player displacement per move action
    pub const PLAYER_SPEED: f32 = 5.0;
    /// Reach for picking up the ball and for being hit by it
    pub const COLLISION_RADIUS: f32 = 30.0;

    /// Match length in milliseconds (5 minutes)
    pub const GAME_DURATION_MS: f32 = 5.0 * 60.0 * 1000.0;
}

/// Unit vector in the direction of `v`, or zero for the zero vector
#[inline]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}

/// Format a remaining time in milliseconds as `M:SS`
pub fn format_time(time_ms: f32) -> String {
    let total_secs = (time_ms.max(0.0) / 1000.0).floor() as u32;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(consts::GAME_DURATION_MS), "5:00");
        assert_eq!(format_time(61_999.0), "1:01");
        assert_eq!(format_time(9_000.0), "0:09");
        assert_eq!(format_time(-250.0), "0:00");
    }

    #[test]
    fn test_normalize_or_zero() {
        assert_eq!(normalize_or_zero(Vec2::ZERO), Vec2::ZERO);
        let n = normalize_or_zero(Vec2::new(3.0, 4.0));
        assert!((n.x - 0.6).abs() < 1e-6);
        assert!((n.y - 0.8).abs() < 1e-6);
    }
}
