use std::fmt;

use anyhow::{bail, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ops;

/// A cell value: 0 for empty, otherwise a power of two >= 2.
pub type Tile = u32;
/// Sum of cell values.
pub type Score = u64;

/// Tiles holding this value never merge again.
pub const MERGE_CEILING: Tile = 2048;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All four directions, in a fixed order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];
}

/// What a single directional shift did to the board.
///
/// `moved` is set when any tile slid or merged; `merged` only when at least
/// one merge happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved: bool,
    pub merged: bool,
}

/// Square N×N board stored row-major.
///
/// `Clone` is a full deep copy, which is what the undo history stores.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Tile>,
}

impl Board {
    /// An all-empty board of `size`×`size` cells.
    pub fn empty(size: usize) -> Self {
        Board {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Build a board from explicit rows.
    ///
    /// Rows must form a square and every value must be 0 or a power of two >= 2.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// let b = Board::from_rows(&[vec![2, 0], vec![0, 4]]).unwrap();
    /// assert_eq!(b.size(), 2);
    /// assert_eq!(b.get(1, 1), 4);
    /// ```
    pub fn from_rows(rows: &[Vec<Tile>]) -> Result<Self> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != size {
                bail!("row {r} has {} cells, expected {size}", row.len());
            }
            for &v in row {
                if v != 0 && (v < 2 || !v.is_power_of_two()) {
                    bail!("invalid tile value {v} in row {r}");
                }
                cells.push(v);
            }
        }
        Ok(Board { size, cells })
    }

    /// Side length of the board.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at (`row`, `col`). Panics when out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.cells[row * self.size + col]
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [Tile] {
        &mut self.cells
    }

    /// Iterate rows as slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        // chunks(0) panics, so a zero-sized board yields nothing
        self.cells.chunks(self.size.max(1))
    }

    /// Collect the board into owned rows.
    pub fn to_rows(&self) -> Vec<Vec<Tile>> {
        self.rows().map(<[Tile]>::to_vec).collect()
    }

    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    ///
    /// ```
    /// use twenty48_core::engine::{Board, Move};
    /// let b = Board::from_rows(&[vec![2, 2], vec![0, 0]]).unwrap();
    /// let (after, outcome) = b.shift(Move::Left);
    /// assert_eq!(after.get(0, 0), 4);
    /// assert!(outcome.moved && outcome.merged);
    /// ```
    pub fn shift(&self, dir: Move) -> (Self, MoveOutcome) {
        let mut next = self.clone();
        let outcome = ops::shift_in_place(&mut next, dir);
        (next, outcome)
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot, using the provided RNG.
    ///
    /// A full board is returned unchanged.
    ///
    /// ```
    /// use twenty48_core::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::empty(4).with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        ops::insert_random_tile(&mut self, rng);
        self
    }

    /// Compute the total score for this board.
    #[inline]
    pub fn score(&self) -> Score {
        ops::get_score(self)
    }

    /// Return true if no legal moves remain.
    #[inline]
    pub fn is_game_over(&self) -> bool {
        ops::is_game_over(self)
    }

    /// Return the highest tile value present on the board.
    #[inline]
    pub fn highest_tile(&self) -> Tile {
        ops::get_highest_tile_val(self)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(&self) -> usize {
        ops::count_empty(self)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("size", &self.size)
            .field("rows", &self.to_rows())
            .finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(self.size * 8);
        writeln!(f)?;
        for (r, row) in self.rows().enumerate() {
            if r > 0 {
                writeln!(f, "{rule}")?;
            }
            let line: Vec<String> = row.iter().map(ops::format_val).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_rejects_ragged_and_bad_values() {
        assert!(Board::from_rows(&[vec![2, 0], vec![0]]).is_err());
        assert!(Board::from_rows(&[vec![3, 0], vec![0, 0]]).is_err());
        assert!(Board::from_rows(&[vec![1, 0], vec![0, 0]]).is_err());
        assert!(Board::from_rows(&[vec![4096, 0], vec![0, 2]]).is_ok());
    }

    #[test]
    fn shift_leaves_original_untouched() {
        let b = Board::from_rows(&[vec![0, 2], vec![0, 0]]).unwrap();
        let (after, outcome) = b.shift(Move::Left);
        assert_eq!(b.get(0, 1), 2);
        assert_eq!(after.get(0, 0), 2);
        assert_eq!(
            outcome,
            MoveOutcome {
                moved: true,
                merged: false
            }
        );
    }

    #[test]
    fn display_renders_every_row() {
        let b = Board::from_rows(&[vec![2, 0, 0], vec![0, 2048, 0], vec![0, 0, 4]]).unwrap();
        let text = b.to_string();
        assert!(text.contains("2048"));
        assert_eq!(text.lines().filter(|l| l.contains('|')).count(), 3);
        assert_eq!(text.lines().filter(|l| l.starts_with("---")).count(), 2);
    }

    #[test]
    fn rows_round_trip_through_to_rows() {
        let rows = vec![vec![2, 4], vec![8, 0]];
        assert_eq!(Board::from_rows(&rows).unwrap().to_rows(), rows);
    }
}
