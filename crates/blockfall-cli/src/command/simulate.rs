use std::path::PathBuf;

use blockfall_engine::{GameSession, PieceSeed, PieceSource, SessionSnapshot, SessionState};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Seed for pieces and placements as 32 hex digits (random if omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// Virtual milliseconds that pass on every tick
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
    /// Stop a game that is still running after this many ticks
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,
    /// Let gravity settle every piece instead of hard dropping it
    #[arg(long)]
    gravity_only: bool,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    seed: PieceSeed,
    tick_ms: u64,
    games: Vec<GameReport>,
    best_score: u64,
    total_score: u64,
    total_cleared_lines: usize,
}

#[derive(Debug, Serialize)]
struct GameReport {
    game: usize,
    seed: PieceSeed,
    final_state: SessionState,
    score: u64,
    cleared_lines: usize,
    completed_pieces: usize,
    line_cleared_counter: [usize; 5],
    ticks: u64,
    elapsed_ms: u64,
    final_snapshot: SessionSnapshot,
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::from_seed(seed.to_u128().to_be_bytes());
    info!(seed = %seed.to_hex(), games = arg.games, "starting simulation");

    let games: Vec<_> = (0..arg.games)
        .map(|game| {
            let game_seed = rng.random();
            let policy = RandomPlacement::new(Pcg32::seed_from_u64(rng.random()));
            play_game(game, game_seed, policy, arg)
        })
        .collect();

    let report = SimulationReport {
        seed,
        tick_ms: arg.tick_ms,
        best_score: games.iter().map(|g| g.score).max().unwrap_or(0),
        total_score: games.iter().map(|g| g.score).sum(),
        total_cleared_lines: games.iter().map(|g| g.cleared_lines).sum(),
        games,
    };
    Output::save_json(&report, arg.output.as_deref())?;
    Ok(())
}

fn play_game(
    game: usize,
    seed: PieceSeed,
    mut policy: RandomPlacement,
    arg: &SimulateArg,
) -> GameReport {
    let mut session = GameSession::with_seed(seed);
    session.start();

    let mut ticks = 0;
    let mut needs_placement = true;
    while session.state().is_running() && ticks < arg.max_ticks {
        ticks += 1;
        let outcome = if needs_placement {
            needs_placement = false;
            policy.steer(&mut session);
            if arg.gravity_only {
                session.advance(arg.tick_ms)
            } else {
                session.hard_drop()
            }
        } else {
            session.advance(arg.tick_ms)
        };
        if let Some(outcome) = outcome {
            needs_placement = true;
            debug!(game, ?outcome, "piece locked");
        }
    }

    if session.state().is_running() {
        warn!(game, ticks, "game stopped at tick limit");
    }
    let stats = session.stats();
    info!(
        game,
        score = stats.score(),
        lines = stats.total_cleared_lines(),
        pieces = stats.completed_pieces(),
        "game finished"
    );
    GameReport {
        game,
        seed,
        final_state: session.state(),
        score: stats.score(),
        cleared_lines: stats.total_cleared_lines(),
        completed_pieces: stats.completed_pieces(),
        line_cleared_counter: *stats.line_cleared_counter(),
        ticks,
        elapsed_ms: ticks.saturating_mul(arg.tick_ms),
        final_snapshot: session.snapshot(),
    }
}

/// Picks a random orientation and column for every new piece.
#[derive(Debug)]
struct RandomPlacement {
    rng: Pcg32,
}

impl RandomPlacement {
    fn new(rng: Pcg32) -> Self {
        Self { rng }
    }

    /// Rotates the active piece and slides it towards a random column until
    /// it arrives or is blocked.
    fn steer<S>(&mut self, session: &mut GameSession<S>)
    where
        S: PieceSource,
    {
        let rotations = self.rng.random_range(0..4);
        for _ in 0..rotations {
            session.rotate();
        }

        let Some(piece) = session.active_piece() else {
            return;
        };
        let width = i32::try_from(session.board().width()).unwrap_or(i32::MAX);
        let target = self.rng.random_range(0..width);
        let left_edge = piece
            .occupied_positions()
            .iter()
            .map(|&(x, _)| x)
            .min()
            .unwrap_or(piece.position().x);
        debug!(kind = ?piece.kind(), rotations, target, "placing piece");

        let shift = target - left_edge;
        for _ in 0..shift.unsigned_abs() {
            let moved = if shift < 0 {
                session.move_left()
            } else {
                session.move_right()
            };
            if !moved {
                break;
            }
        }
    }
}
