use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;
use twenty48_core::{Board, Difficulty, GameEngine, MemoryScoreStore, Move, ScoreStore};

/// Batch simulation settings supplied by the CLI.
#[derive(Clone, Debug)]
pub struct SimulateOptions {
    pub difficulty: Difficulty,
    pub games: u32,
    pub seed: u64,
    pub max_workers: Option<usize>,
}

/// Summary of one finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub game_id: u32,
    pub seed: u64,
    pub difficulty: Difficulty,
    pub moves: u64,
    pub score: u64,
    pub highest_tile: u32,
}

/// Directions that would change `board`.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    Move::ALL
        .into_iter()
        .filter(|&m| board.shift(m).1.moved)
        .collect()
}

/// Drive one board to completion with a uniformly random legal-move policy.
pub fn play_one(game_id: u32, difficulty: Difficulty, seed: u64) -> GameResult {
    let mut engine = GameEngine::seeded(difficulty, seed, MemoryScoreStore::new());
    let mut policy_rng = StdRng::seed_from_u64(seed ^ 0x9E37_79B9_7F4A_7C15);
    let mut moves: u64 = 0;

    while !engine.is_game_over() {
        let legal = legal_moves(engine.board());
        let Some(&dir) = legal.choose(&mut policy_rng) else {
            break;
        };
        if engine.make_move(dir) {
            moves += 1;
        }
    }

    GameResult {
        game_id,
        seed,
        difficulty,
        moves,
        score: engine.score(),
        highest_tile: engine.board().highest_tile(),
    }
}

/// Play `opts.games` games in parallel; game `i` is seeded `opts.seed + i`.
pub fn simulate(opts: &SimulateOptions) -> Result<Vec<GameResult>> {
    let pb = ProgressBar::new(u64::from(opts.games));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta})")
            .context("invalid progress template")?,
    );

    let process = || -> Vec<GameResult> {
        (0..opts.games)
            .into_par_iter()
            .map(|id| {
                let out = play_one(id, opts.difficulty, opts.seed.wrapping_add(u64::from(id)));
                pb.inc(1);
                out
            })
            .collect()
    };

    let mut results = if let Some(n) = opts.max_workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .context("failed to build rayon thread pool")?
            .install(process)
    } else {
        process()
    };
    pb.finish_with_message("games played");

    results.sort_by_key(|r| r.game_id);
    if let Some(best) = results.iter().max_by_key(|r| r.score) {
        info!(
            "played {} {} games; best score {} (game {}, highest tile {})",
            results.len(),
            opts.difficulty,
            best.score,
            best.game_id,
            best.highest_tile
        );
    }
    Ok(results)
}

/// Write one JSON object per line.
pub fn write_results(path: &Path, results: &[GameResult]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    for r in results {
        serde_json::to_writer(&mut w, r)?;
        w.write_all(b"\n")?;
    }
    w.flush().with_context(|| format!("failed to write {}", path.display()))
}

/// Save every result under `name` in its tier's leaderboard.
pub fn record_results<S: ScoreStore>(store: &mut S, name: &str, results: &[GameResult]) -> Result<()> {
    for r in results {
        let score = i64::try_from(r.score).context("score does not fit the leaderboard")?;
        store.save(name, score, r.difficulty)?;
    }
    Ok(())
}
