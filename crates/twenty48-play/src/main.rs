mod autoplay;
mod config;
mod terminal;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use twenty48_core::{Difficulty, FileScoreStore, ScoreStore};

use autoplay::SimulateOptions;
use config::Config;
use terminal::{SessionOptions, TerminalSession};

#[derive(Debug, Parser)]
#[command(author, version, about = "Sliding-tile merge puzzle in the terminal")]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, value_name = "FILE", value_parser = clap::value_parser!(PathBuf))]
    config: Option<PathBuf>,

    /// Difficulty tier: easy (6x6), medium (5x5) or hard (4x4)
    #[arg(long, global = true, value_name = "TIER")]
    difficulty: Option<Difficulty>,

    /// RNG seed for reproducible games
    #[arg(long, global = true, value_name = "N")]
    seed: Option<u64>,

    /// Directory holding the leaderboard files
    #[arg(long, global = true, value_name = "DIR")]
    leaderboard_dir: Option<PathBuf>,

    /// Name recorded on game over instead of prompting
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play interactively (default)
    Play {
        /// Disable the bell on merges
        #[arg(long)]
        quiet: bool,
    },
    /// Print the ranked leaderboard for a tier
    Leaderboard,
    /// Play many games with a random policy
    Simulate {
        /// Number of games
        #[arg(long, default_value_t = 100)]
        games: u32,
        /// Number of worker threads (defaults to Rayon default)
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
        /// Write per-game results as JSON lines
        #[arg(long, value_name = "FILE")]
        results: Option<PathBuf>,
        /// Also record every result on the leaderboard under this name
        #[arg(long)]
        record_as: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::load(cli.config.as_deref())?;
    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level.as_str())).init();

    if let Some(d) = cli.difficulty {
        cfg.difficulty = d;
    }
    if let Some(seed) = cli.seed {
        cfg.seed = Some(seed);
    }
    if let Some(dir) = cli.leaderboard_dir {
        cfg.leaderboard.dir = dir;
    }

    match cli.command.unwrap_or(Command::Play { quiet: false }) {
        Command::Play { quiet } => {
            let options = SessionOptions {
                difficulty: cfg.difficulty,
                seed: cfg.seed,
                player: cli.name.or(cfg.player),
                bell: cfg.feedback.bell && !quiet,
                leaderboard_dir: cfg.leaderboard.dir,
            };
            let stdin = io::stdin();
            TerminalSession::new(stdin.lock(), io::stdout(), options).run()
        }
        Command::Leaderboard => {
            let store = FileScoreStore::new(&cfg.leaderboard.dir);
            print!("{}", store.display(cfg.difficulty)?);
            Ok(())
        }
        Command::Simulate { games, workers, results, record_as } => {
            let opts = SimulateOptions {
                difficulty: cfg.difficulty,
                games,
                seed: cfg.seed.unwrap_or_else(rand::random),
                max_workers: workers,
            };
            info!("simulating {} {} games from seed {}", opts.games, opts.difficulty, opts.seed);
            let played = autoplay::simulate(&opts)?;
            for r in &played {
                println!(
                    "game {:>4}  seed {:>20}  moves {:>6}  score {:>7}  highest {:>5}",
                    r.game_id, r.seed, r.moves, r.score, r.highest_tile
                );
            }
            if let Some(path) = results {
                autoplay::write_results(&path, &played)?;
                info!("wrote {} results to {}", played.len(), path.display());
            }
            if let Some(name) = record_as {
                let mut store = FileScoreStore::new(&cfg.leaderboard.dir);
                autoplay::record_results(&mut store, &name, &played)?;
            }
            Ok(())
        }
    }
}
