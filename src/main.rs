//! Blackout Ball headless runner
//!
//! Plays a full match between simple bots on the authoritative simulation
//! and prints the final standings. Useful for soak-testing rules files.
//!
//! Usage: `blackout-ball [--seed N] [--players N] [--rules PATH] [--attribution NAME]`
//! `[--release-grace] [--print-rules]`

#[cfg(not(target_arch = "wasm32"))]
mod bots {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use blackout_ball::Session;
    use blackout_ball::consts::TICK_MS;
    use blackout_ball::sim::collision::{point_in_circle, predict_circle_collision};
    use blackout_ball::sim::{Action, GameEvent, GameState, MatchResults, Player, PlayerId};

    /// How many ticks ahead a bot looks when deciding to dodge
    const DODGE_LOOKAHEAD: f32 = 4.0;

    /// Pick one action for `me` this frame
    pub fn choose_action(state: &GameState, me: &PlayerId, rng: &mut Pcg32) -> Option<Action> {
        let player = state.player(me)?;
        let ball = &state.ball;
        let radius = state.rules.collision_radius;

        // Incoming ball, our own throw included: shut eyes until it passes
        let threatened = ball.moving
            && ball.visible
            && (point_in_circle(ball.pos, player.pos, radius * 1.5)
                || predict_circle_collision(
                    ball.pos,
                    ball.vel,
                    0.0,
                    player.pos,
                    radius,
                    DODGE_LOOKAHEAD,
                ));
        if threatened {
            return player.visible.then_some(Action::CloseEyes);
        }

        if state.has_ball(me) {
            if !ball.visible {
                return Some(if rng.random_bool(0.1) {
                    Action::ShowBall
                } else {
                    wander(state, player, rng)
                });
            }

            let target = nearest_target(state, player);
            // Eyes go shut before a release so the throw cannot strike the thrower
            if !player.visible {
                return Some(match target {
                    Some(target) => Action::ThrowBall {
                        direction: target.pos - player.pos,
                    },
                    None => Action::OpenEyes,
                });
            }
            if rng.random_bool(0.02) {
                return Some(Action::HideBall);
            }
            if target.is_some() && rng.random_bool(0.2) {
                return Some(Action::CloseEyes);
            }
            return Some(wander(state, player, rng));
        }

        if !player.visible {
            return Some(Action::OpenEyes);
        }

        if ball.visible && !ball.moving {
            if point_in_circle(ball.pos, player.pos, radius * 0.9) {
                return Some(Action::TakeBall);
            }
            return Some(Action::MovePlayer {
                direction: ball.pos - player.pos,
            });
        }

        Some(wander(state, player, rng))
    }

    /// Nearest opponent whose eyes are open
    fn nearest_target<'a>(state: &'a GameState, me: &Player) -> Option<&'a Player> {
        state
            .players
            .iter()
            .filter(|p| p.id != me.id && p.visible)
            .min_by(|a, b| {
                a.pos
                    .distance_squared(me.pos)
                    .partial_cmp(&b.pos.distance_squared(me.pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    fn wander(state: &GameState, me: &Player, rng: &mut Pcg32) -> Action {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let heading = Vec2::from_angle(angle);
        // Turn back toward the middle rather than pressing into a wall
        let ahead = me.pos + heading * state.rules.collision_radius;
        let direction = if state.field.contains(ahead) {
            heading
        } else {
            state.field.center() - me.pos
        };
        Action::MovePlayer { direction }
    }

    /// Drive every participant until the match clock runs out
    ///
    /// Returns the final results and the number of hits seen.
    pub fn play_match(session: &mut Session, seed: u64) -> (MatchResults, u32) {
        let mut rng = Pcg32::seed_from_u64(seed ^ 0x5eed);
        let ids: Vec<PlayerId> = session.state().player_ids().cloned().collect();

        let mut hits = 0u32;
        loop {
            for id in &ids {
                if let Some(action) = choose_action(session.state(), id, &mut rng) {
                    session.submit(id.clone(), action);
                }
            }

            let report = session.advance(TICK_MS);
            for err in &report.rejected {
                log::trace!("{err}");
            }
            hits += session
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::PlayerHit { .. }))
                .count() as u32;

            if let Some(results) = report.results {
                return (results, hits);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;

    use clap::Parser;

    use blackout_ball::consts::{MAX_PLAYERS, MIN_PLAYERS};
    use blackout_ball::{Attribution, Rules, RulesError};

    /// Play a headless Blackout Ball match between bots
    #[derive(Debug, Parser)]
    #[command(name = "blackout-ball", about, long_about = None)]
    pub struct Args {
        /// Seed for spawn positions and bot decisions
        #[arg(long, default_value_t = 12345)]
        pub seed: u64,

        /// Number of bots in the match
        #[arg(
            long,
            default_value_t = 3,
            value_parser = clap::value_parser!(u8).range(MIN_PLAYERS as i64..=MAX_PLAYERS as i64)
        )]
        pub players: u8,

        /// JSON rules file; missing fields keep their defaults
        #[arg(long = "rules", value_name = "PATH")]
        pub rules_path: Option<PathBuf>,

        /// Who is credited when a ball strikes somebody
        #[arg(long, value_enum)]
        pub attribution: Option<Attribution>,

        /// A fresh throw passes through its own thrower
        #[arg(long)]
        pub release_grace: bool,

        /// Print the effective rules as JSON and exit
        #[arg(long)]
        pub print_rules: bool,
    }

    impl Args {
        /// Rules file (or defaults) with command line overrides applied
        pub fn rules(&self) -> Result<Rules, RulesError> {
            let mut rules = match &self.rules_path {
                Some(path) => Rules::load(path)?,
                None => Rules::default(),
            };
            if let Some(attribution) = self.attribution {
                rules.attribution = attribution;
            }
            if self.release_grace {
                rules.release_grace = true;
            }
            Ok(rules)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use clap::Parser;

    use blackout_ball::sim::PlayerId;
    use blackout_ball::{Scoreboard, Session};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();
    let rules = args.rules()?;
    if args.print_rules {
        println!("{}", rules.to_json()?);
        return Ok(());
    }

    let player_ids: Vec<PlayerId> = (1..=args.players)
        .map(|i| PlayerId::new(format!("bot{i}")))
        .collect();
    let mut session = Session::new(args.seed, &player_ids, rules)?;

    log::info!(
        "Blackout Ball (headless) starting: {} bots, attribution {}",
        player_ids.len(),
        session.state().rules.attribution.as_str()
    );

    let (results, hits) = bots::play_match(&mut session, args.seed);

    let board = Scoreboard::from_state(session.state(), Some(&results));
    println!("{}", board.render());
    log::info!("{} hits, winner: {:?}", hits, results.winner());
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the host runtime on the web
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use clap::Parser;

    use blackout_ball::consts::TICK_MS;
    use blackout_ball::sim::PlayerId;
    use blackout_ball::{Attribution, Rules, Session};

    use super::{bots, cli};

    fn parse(args: &[&str]) -> Result<cli::Args, clap::Error> {
        cli::Args::try_parse_from(std::iter::once("blackout-ball").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.seed, 12345);
        assert_eq!(args.players, 3);
        assert!(args.rules_path.is_none());
        assert_eq!(args.rules().unwrap(), Rules::default());
    }

    #[test]
    fn test_cli_overrides_rules() {
        let args = parse(&[
            "--seed",
            "7",
            "--players",
            "4",
            "--attribution",
            "thrower",
            "--release-grace",
        ])
        .unwrap();
        assert_eq!(args.seed, 7);
        assert_eq!(args.players, 4);

        let rules = args.rules().unwrap();
        assert_eq!(rules.attribution, Attribution::Thrower);
        assert!(rules.release_grace);
    }

    #[test]
    fn test_cli_rejects_bad_input() {
        assert!(parse(&["--players", "1"]).is_err());
        assert!(parse(&["--players", "5"]).is_err());
        assert!(parse(&["--attribution", "nobody"]).is_err());
        assert!(parse(&["--seed", "abc"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
    }

    #[test]
    fn test_headless_match_finishes() {
        let ids: Vec<PlayerId> = ["bot1", "bot2", "bot3"].map(PlayerId::from).to_vec();
        let rules = Rules {
            game_duration: TICK_MS * 600.0,
            ..Default::default()
        };
        let mut session = Session::new(42, &ids, rules).unwrap();

        let (results, _hits) = bots::play_match(&mut session, 42);
        assert!(session.is_over());
        assert_eq!(session.results(), Some(&results));
        for id in &ids {
            assert!(results.get(id).is_some(), "{id} missing from results");
        }
        assert_eq!(results.iter().count(), ids.len());
    }

    #[test]
    fn test_headless_match_is_deterministic() {
        let ids: Vec<PlayerId> = ["bot1", "bot2"].map(PlayerId::from).to_vec();
        let rules = Rules {
            game_duration: TICK_MS * 300.0,
            ..Default::default()
        };
        let mut first = Session::new(9, &ids, rules.clone()).unwrap();
        let mut second = Session::new(9, &ids, rules).unwrap();

        let (results1, hits1) = bots::play_match(&mut first, 9);
        let (results2, hits2) = bots::play_match(&mut second, 9);
        assert_eq!(results1, results2);
        assert_eq!(hits1, hits2);
        assert_eq!(first.state(), second.state());
    }
}
