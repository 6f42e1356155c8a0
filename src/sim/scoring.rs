//! End-of-match ranking

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::{Player, PlayerId};

/// Final result for one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Won,
    Lost,
    Tie,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Won => "won",
            Outcome::Lost => "lost",
            Outcome::Tie => "tie",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for every participant, keyed by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchResults(pub BTreeMap<PlayerId, Outcome>);

impl MatchResults {
    pub fn get(&self, id: &PlayerId) -> Option<Outcome> {
        self.0.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, Outcome)> {
        self.0.iter().map(|(id, outcome)| (id, *outcome))
    }

    /// The sole winner, if there is one
    pub fn winner(&self) -> Option<&PlayerId> {
        self.iter()
            .find(|(_, outcome)| *outcome == Outcome::Won)
            .map(|(id, _)| id)
    }
}

/// Rank players by score: a unique top score wins, a shared one ties
pub fn rank_players(players: &[Player]) -> MatchResults {
    let Some(top) = players.iter().map(|p| p.score).max() else {
        return MatchResults::default();
    };
    let leaders = players.iter().filter(|p| p.score == top).count();

    let results = players
        .iter()
        .map(|p| {
            let outcome = if p.score < top {
                Outcome::Lost
            } else if leaders == 1 {
                Outcome::Won
            } else {
                Outcome::Tie
            };
            (p.id.clone(), outcome)
        })
        .collect();

    MatchResults(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn players(scores: &[(&str, u32)]) -> Vec<Player> {
        scores
            .iter()
            .map(|(id, score)| Player {
                score: *score,
                ..Player::new(PlayerId::from(*id), Vec2::ZERO)
            })
            .collect()
    }

    #[test]
    fn test_single_winner() {
        let results = rank_players(&players(&[("p1", 3), ("p2", 1), ("p3", 1)]));
        assert_eq!(results.get(&"p1".into()), Some(Outcome::Won));
        assert_eq!(results.get(&"p2".into()), Some(Outcome::Lost));
        assert_eq!(results.get(&"p3".into()), Some(Outcome::Lost));
        assert_eq!(results.winner(), Some(&PlayerId::from("p1")));
    }

    #[test]
    fn test_two_way_tie() {
        let results = rank_players(&players(&[("a", 2), ("b", 2)]));
        assert_eq!(results.get(&"a".into()), Some(Outcome::Tie));
        assert_eq!(results.get(&"b".into()), Some(Outcome::Tie));
        assert_eq!(results.winner(), None);
    }

    #[test]
    fn test_partial_tie_rest_lose() {
        let results = rank_players(&players(&[("a", 1), ("b", 4), ("c", 4), ("d", 0)]));
        assert_eq!(results.get(&"a".into()), Some(Outcome::Lost));
        assert_eq!(results.get(&"b".into()), Some(Outcome::Tie));
        assert_eq!(results.get(&"c".into()), Some(Outcome::Tie));
        assert_eq!(results.get(&"d".into()), Some(Outcome::Lost));
    }

    #[test]
    fn test_all_zero_is_full_tie() {
        let results = rank_players(&players(&[("a", 0), ("b", 0), ("c", 0)]));
        assert_eq!(results.iter().count(), 3);
        assert!(results.iter().all(|(_, o)| o == Outcome::Tie));
    }

    #[test]
    fn test_results_serialize_lowercase() {
        let results = rank_players(&players(&[("a", 1), ("b", 0)]));
        let json = serde_json::to_string(&results).unwrap();
        assert_eq!(json, r#"{"a":"won","b":"lost"}"#);
    }
}
