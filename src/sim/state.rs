//! Game state and core simulation types
//!
//! Everything replicas must agree on lives here. The whole [`GameState`]
//! is the read-only snapshot handed to presentation after each tick/action.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::rules::Rules;
use crate::sim::scoring::MatchResults;

/// Stable participant identifier supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Rectangular playing field, fixed at setup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Inclusive bounds check against `[0, width] x [0, height]`
    #[inline]
    pub fn contains(&self, pos: Vec2) -> bool {
        (0.0..=self.width).contains(&pos.x) && (0.0..=self.height).contains(&pos.y)
    }

    #[inline]
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        pos.clamp(Vec2::ZERO, Vec2::new(self.width, self.height))
    }
}

/// A participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub pos: Vec2,
    /// Eyes open; a player with closed eyes cannot be hit
    pub visible: bool,
    pub score: u32,
}

impl Player {
    pub fn new(id: PlayerId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            visible: true,
            score: 0,
        }
    }
}

/// The single shared ball
///
/// Possession is tracked here rather than per player, so there can never be
/// two holders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub visible: bool,
    pub moving: bool,
    /// Player carrying the ball (ball position follows them)
    pub holder: Option<PlayerId>,
    /// Player who released the most recent throw
    #[serde(default)]
    pub last_thrown_by: Option<PlayerId>,
    /// Under release grace: the ball has not yet left the thrower's reach
    #[serde(default)]
    pub clearing_thrower: bool,
}

impl Ball {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            visible: true,
            moving: false,
            holder: None,
            last_thrown_by: None,
            clearing_thrower: false,
        }
    }

    /// Halt the ball where it is
    pub fn stop(&mut self) {
        self.moving = false;
        self.vel = Vec2::ZERO;
        self.clearing_thrower = false;
    }

    pub fn is_held_by(&self, id: &PlayerId) -> bool {
        self.holder.as_ref() == Some(id)
    }
}

/// Things that happened during a tick or action, for audio/visual feedback
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    BallTaken { player: PlayerId },
    BallThrown { player: PlayerId, vel: Vec2 },
    BallHidden { player: PlayerId },
    BallShown { player: PlayerId },
    /// Ball reflected off one or both walls
    WallBounce { pos: Vec2 },
    PlayerHit {
        struck: PlayerId,
        scorer: Option<PlayerId>,
    },
    EyesClosed { player: PlayerId },
    EyesOpened { player: PlayerId },
    MatchOver { results: MatchResults },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Rules the match was set up with
    pub rules: Rules,
    pub field: Field,
    /// Players in registry order; this order drives every scan
    pub players: Vec<Player>,
    pub ball: Ball,
    /// Remaining match time
    pub game_time: f32,
    pub game_over: bool,
    /// Pending feedback events (not part of the replicated snapshot)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new match with default rules, seeding spawn positions
    pub fn new(seed: u64, player_ids: &[PlayerId]) -> Self {
        Self::with_rules(seed, player_ids, Rules::default())
    }

    pub fn with_rules(seed: u64, player_ids: &[PlayerId], rules: Rules) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        setup(player_ids, rules, &mut rng)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    /// Registry index of a player
    pub fn index_of(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    pub fn player_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.iter().map(|p| &p.id)
    }

    pub fn has_ball(&self, id: &PlayerId) -> bool {
        self.ball.is_held_by(id)
    }

    /// Take all pending feedback events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Serialize the replicated part of the state
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_snapshot_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Build the initial state for a match
///
/// Player count bounds are the host's concern; this accepts any list.
pub fn setup<R: Rng>(player_ids: &[PlayerId], rules: Rules, rng: &mut R) -> GameState {
    let field = Field::new(rules.field_width, rules.field_height);
    // Unvalidated rules may leave no room inside the margin; shrink it
    let spawn_span = |side: f32| {
        let margin = rules.spawn_margin.max(0.0).min((side / 2.0).max(0.0));
        (margin, (side - margin).max(margin))
    };
    let (min_x, max_x) = spawn_span(field.width);
    let (min_y, max_y) = spawn_span(field.height);

    let players = player_ids
        .iter()
        .map(|id| {
            let pos = Vec2::new(
                rng.random_range(min_x..=max_x),
                rng.random_range(min_y..=max_y),
            );
            Player::new(id.clone(), pos)
        })
        .collect::<Vec<_>>();

    log::info!(
        "Match set up: {} players on {}x{} field, {} time units",
        players.len(),
        field.width,
        field.height,
        rules.game_duration
    );

    GameState {
        game_time: rules.game_duration,
        game_over: false,
        ball: Ball::new(field.center()),
        field,
        players,
        rules,
        events: Vec::new(),
    }
}
