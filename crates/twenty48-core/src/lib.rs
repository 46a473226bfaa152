//! twenty48-core: sliding-tile merge puzzle engine.
//!
//! This crate provides:
//! - An N×N `Board` with slide/merge resolution (`engine::shift`), spawning,
//!   terminal-state detection and scoring
//! - `GameEngine`, a session with bounded undo and change notifications
//! - `Difficulty` tiers (6×6, 5×5, 4×4) and ranked leaderboards (`leaderboard`)
//!
//! Quick start:
//! ```
//! use twenty48_core::{Difficulty, GameEngine, MemoryScoreStore, Move};
//!
//! // Deterministic session with a seeded RNG
//! let mut game = GameEngine::seeded(Difficulty::Hard, 42, MemoryScoreStore::new());
//! for dir in [Move::Left, Move::Up, Move::Right, Move::Down] {
//!     game.make_move(dir);
//! }
//! if game.is_game_over() {
//!     game.save_high_score("player", Difficulty::Hard).unwrap();
//! }
//! assert!(game.score() >= 4);
//! ```

pub mod difficulty;
pub mod engine;
pub mod leaderboard;

pub use difficulty::Difficulty;
pub use engine::{Board, BoardEvent, GameEngine, Move, MoveOutcome};
pub use leaderboard::{FileScoreStore, MemoryScoreStore, ScoreEntry, ScoreStore};
