//! Ranked standings for the HUD and the results screen

use serde::{Deserialize, Serialize};

use crate::format_time;
use crate::sim::{GameState, MatchResults, Outcome, PlayerId};

/// One row of the standings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-indexed; tied scores share a rank
    pub rank: usize,
    pub player: PlayerId,
    pub score: u32,
    pub has_ball: bool,
    /// Known once the match is over
    pub outcome: Option<Outcome>,
}

/// Standings sorted by score, highest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub entries: Vec<Standing>,
    /// Remaining time as `M:SS`
    pub clock: String,
}

impl Scoreboard {
    /// Build standings from a state snapshot (and final results, if any)
    pub fn from_state(state: &GameState, results: Option<&MatchResults>) -> Self {
        // Stable sort keeps registry order among equal scores
        let mut players: Vec<_> = state.players.iter().collect();
        players.sort_by(|a, b| b.score.cmp(&a.score));

        let mut entries: Vec<Standing> = Vec::with_capacity(players.len());
        for (i, player) in players.into_iter().enumerate() {
            let rank = match entries.last() {
                Some(prev) if prev.score == player.score => prev.rank,
                _ => i + 1,
            };
            entries.push(Standing {
                rank,
                player: player.id.clone(),
                score: player.score,
                has_ball: state.has_ball(&player.id),
                outcome: results.and_then(|r| r.get(&player.id)),
            });
        }

        Self {
            entries,
            clock: format_time(state.game_time),
        }
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    pub fn rank_of(&self, player: &PlayerId) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| &e.player == player)
            .map(|e| e.rank)
    }

    /// Plain-text table, one player per line
    pub fn render(&self) -> String {
        let mut out = format!("Time left {}\n", self.clock);
        for entry in &self.entries {
            let ball = if entry.has_ball { " (ball)" } else { "" };
            let outcome = entry
                .outcome
                .map(|o| format!(" - {}", o.as_str().to_uppercase()))
                .unwrap_or_default();
            out.push_str(&format!(
                "{}. {} {}{}{}\n",
                entry.rank, entry.player, entry.score, ball, outcome
            ));
        }
        out
    }
}
