//! Match rules and tuning
//!
//! Every gameplay constant the simulation reads lives here so a host can
//! load a JSON rules file instead of recompiling. Missing fields fall back
//! to the values in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Who gets the point when a thrown ball hits somebody
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Attribution {
    /// First player in registry order who is not the struck player
    #[default]
    #[value(alias = "list_order")]
    ListOrder,
    /// The player who actually threw the ball
    Thrower,
}

impl Attribution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribution::ListOrder => "list_order",
            Attribution::Thrower => "thrower",
        }
    }
}

/// Errors produced while loading or validating rules
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rules: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid rule '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunable match rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,
    /// Distance from each wall inside which players never spawn
    pub spawn_margin: f32,

    // === Motion ===
    /// Ball displacement per tick while moving
    pub ball_speed: f32,
    /// Player displacement per move action
    pub player_speed: f32,
    /// Pickup reach and hit radius
    pub collision_radius: f32,

    // === Match ===
    /// Match length, same units as the tick driver's elapsed time
    pub game_duration: f32,

    // === Behavior switches ===
    /// Pull the ball back inside the field when it crosses a wall
    pub clamp_ball_to_field: bool,
    pub attribution: Attribution,
    /// A fresh throw cannot strike its thrower until it has left their reach
    pub release_grace: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            spawn_margin: SPAWN_MARGIN,

            ball_speed: BALL_SPEED,
            player_speed: PLAYER_SPEED,
            collision_radius: COLLISION_RADIUS,

            game_duration: GAME_DURATION_MS,

            clamp_ball_to_field: true,
            attribution: Attribution::ListOrder,
            release_grace: false,
        }
    }
}

impl Rules {
    /// Parse and validate rules from a JSON document
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: Rules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load rules from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let rules = Self::from_json(&json)?;
        log::info!("Loaded rules from {}", path.display());
        Ok(rules)
    }

    pub fn to_json(&self) -> Result<String, RulesError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), RulesError> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("ball_speed", self.ball_speed),
            ("player_speed", self.player_speed),
            ("collision_radius", self.collision_radius),
            ("game_duration", self.game_duration),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(RulesError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }

        if !self.spawn_margin.is_finite() || self.spawn_margin < 0.0 {
            return Err(RulesError::Invalid {
                field: "spawn_margin",
                reason: format!("must be non-negative, got {}", self.spawn_margin),
            });
        }
        let shortest_side = self.field_width.min(self.field_height);
        if self.spawn_margin * 2.0 >= shortest_side {
            return Err(RulesError::Invalid {
                field: "spawn_margin",
                reason: format!(
                    "{} leaves no spawn area on a {}x{} field",
                    self.spawn_margin, self.field_width, self.field_height
                ),
            });
        }

        Ok(())
    }
}
