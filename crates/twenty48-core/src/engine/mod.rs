//! Engine module: N×N board, slide/merge resolution, undo history and the
//! `GameEngine` that ties them to a random source and a score store.
//!
//! - `Board` is the owned grid state with useful read-only methods.
//! - Free functions in `ops` mirror the methods when convenient (e.g., `shift`).
//! - `GameEngine` is the stateful session: moves, undo, new game, notifications.

mod history;
mod ops;
pub mod state;

use anyhow::{Context, Result};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::difficulty::Difficulty;
use crate::leaderboard::ScoreStore;

pub use history::{History, HISTORY_CAPACITY};
pub use ops::{count_empty, get_highest_tile_val, get_score, insert_random_tile, is_game_over, shift};
pub use state::{Board, Move, MoveOutcome, Score, Tile, MERGE_CEILING};

/// Board change notification delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    /// Board was reset and seeded with two tiles.
    NewGame,
    /// A move changed the board. `merged` separates a merge from a plain slide.
    Moved { direction: Move, merged: bool },
    /// The previous board was restored.
    Undone,
}

type Observer = Box<dyn FnMut(&BoardEvent, &Board)>;

/// A single game session.
///
/// Owns the board, the undo history, the random source used for spawning and
/// the store that receives the final score. Not thread-safe; drive it from one
/// thread.
///
/// ```
/// use twenty48_core::{Difficulty, GameEngine, MemoryScoreStore, Move};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let rng = StdRng::seed_from_u64(42);
/// let mut game = GameEngine::new(Difficulty::Hard, rng, MemoryScoreStore::new());
/// assert_eq!(game.board().size(), 4);
/// assert_eq!(game.board().count_empty(), 14);
/// let _moved = game.make_move(Move::Left);
/// ```
pub struct GameEngine<R: Rng, S: ScoreStore> {
    difficulty: Difficulty,
    board: Board,
    history: History,
    rng: R,
    store: S,
    observers: Vec<Observer>,
}

impl<S: ScoreStore> GameEngine<StdRng, S> {
    /// Session seeded from OS entropy.
    pub fn from_entropy(difficulty: Difficulty, store: S) -> Self {
        Self::new(difficulty, StdRng::from_entropy(), store)
    }

    /// Session with a reproducible tile sequence.
    pub fn seeded(difficulty: Difficulty, seed: u64, store: S) -> Self {
        Self::new(difficulty, StdRng::seed_from_u64(seed), store)
    }
}

impl<R: Rng, S: ScoreStore> GameEngine<R, S> {
    /// Create a session and start its first game.
    pub fn new(difficulty: Difficulty, rng: R, store: S) -> Self {
        let mut engine = Self {
            difficulty,
            board: Board::empty(difficulty.board_size()),
            history: History::new(),
            rng,
            store,
            observers: Vec::new(),
        };
        engine.new_game();
        engine
    }

    /// Register a callback fired after every board change.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&BoardEvent, &Board) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Clear the board and history, then spawn two tiles.
    pub fn new_game(&mut self) {
        self.board = Board::empty(self.difficulty.board_size());
        self.history.clear();
        ops::insert_random_tile(&mut self.board, &mut self.rng);
        ops::insert_random_tile(&mut self.board, &mut self.rng);
        debug!("new {} game", self.difficulty);
        self.notify(BoardEvent::NewGame);
    }

    /// Slide/merge in `direction`; spawn a tile and notify if anything changed.
    ///
    /// The pre-move board is recorded for undo on every call, even when the
    /// move turns out to be a no-op.
    pub fn make_move(&mut self, direction: Move) -> bool {
        self.history.push(self.board.clone());
        let outcome = ops::shift_in_place(&mut self.board, direction);
        debug!(
            "move {direction:?}: moved={} merged={}",
            outcome.moved, outcome.merged
        );
        if !outcome.moved {
            return false;
        }
        ops::insert_random_tile(&mut self.board, &mut self.rng);
        self.notify(BoardEvent::Moved {
            direction,
            merged: outcome.merged,
        });
        true
    }

    /// Restore the most recent snapshot.
    ///
    /// Requires more than one stored snapshot; otherwise the board is left
    /// untouched and `false` is returned.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_for_undo() {
            Some(previous) => {
                self.board = previous;
                debug!("undo; {} snapshot(s) left", self.history.len());
                self.notify(BoardEvent::Undone);
                true
            }
            None => false,
        }
    }

    /// True when no legal move remains.
    pub fn is_game_over(&self) -> bool {
        ops::is_game_over(&self.board)
    }

    /// Score the current board and hand it to the store. Returns the saved score.
    pub fn save_high_score(&mut self, player_name: &str, difficulty: Difficulty) -> Result<i64> {
        let score = i64::try_from(self.score()).context("score does not fit the leaderboard")?;
        self.store
            .save(player_name, score, difficulty)
            .with_context(|| format!("failed to save {difficulty} high score"))?;
        Ok(score)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Sum of all cell values on the current board.
    pub fn score(&self) -> Score {
        self.board.score()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Snapshots currently held for undo.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    fn notify(&mut self, event: BoardEvent) {
        for observer in self.observers.iter_mut() {
            observer(&event, &self.board);
        }
    }
}
