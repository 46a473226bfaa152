use log::debug;
use rand::Rng;

use super::state::{Board, Move, MoveOutcome, Score, Tile, MERGE_CEILING};

/// Slide/merge tiles in the given direction. No randomness.
pub fn shift(board: &Board, direction: Move) -> (Board, MoveOutcome) {
    board.shift(direction)
}

/// Slide and merge every row (Left/Right) or column (Up/Down) of `board` in place.
pub(crate) fn shift_in_place(board: &mut Board, direction: Move) -> MoveOutcome {
    let size = board.size();
    let cells = board.cells_mut();
    let mut outcome = MoveOutcome::default();
    for line_idx in 0..size {
        let line = line_indices(size, line_idx, direction);
        let line_outcome = shift_line(cells, &line);
        outcome.moved |= line_outcome.moved;
        outcome.merged |= line_outcome.merged;
    }
    outcome
}

/// Cell indices of one line, ordered from the leading edge (the side tiles
/// move towards) to the trailing edge.
fn line_indices(size: usize, line_idx: usize, direction: Move) -> Vec<usize> {
    match direction {
        Move::Left => (0..size).map(|c| line_idx * size + c).collect(),
        Move::Right => (0..size).rev().map(|c| line_idx * size + c).collect(),
        Move::Up => (0..size).map(|r| r * size + line_idx).collect(),
        Move::Down => (0..size).rev().map(|r| r * size + line_idx).collect(),
    }
}

/// Single pass over a line: each tile slides towards the leading edge through
/// empty cells, then merges into its blocking neighbour when they are equal.
///
/// A cell that already received a merge this pass does not accept another,
/// and tiles at `MERGE_CEILING` never merge.
fn shift_line(cells: &mut [Tile], line: &[usize]) -> MoveOutcome {
    let mut outcome = MoveOutcome::default();
    let mut merged_into = vec![false; line.len()];
    for i in 1..line.len() {
        if cells[line[i]] == 0 {
            continue;
        }
        let mut k = i;
        while k > 0 && cells[line[k - 1]] == 0 {
            cells[line[k - 1]] = cells[line[k]];
            cells[line[k]] = 0;
            k -= 1;
            outcome.moved = true;
        }
        if k == 0 {
            continue;
        }
        let (target, source) = (line[k - 1], line[k]);
        // `merged_into` caps each receiving cell at one merge per move, so
        // [2, 2, 4] Left is [4, 4, 0] rather than cascading into [8, 0, 0].
        // Keep the guard: the one-merge-per-cell rule is the intended contract.
        if cells[target] == cells[source] && cells[target] != MERGE_CEILING && !merged_into[k - 1] {
            cells[target] *= 2;
            cells[source] = 0;
            merged_into[k - 1] = true;
            outcome.moved = true;
            outcome.merged = true;
        }
    }
    outcome
}

/// True when the board has no empty cell and no two orthogonal neighbours match.
///
/// Checking right and below from every cell covers each adjacent pair once.
pub fn is_game_over(board: &Board) -> bool {
    let size = board.size();
    for r in 0..size {
        for c in 0..size {
            let v = board.get(r, c);
            if v == 0 {
                return false;
            }
            if c + 1 < size && v == board.get(r, c + 1) {
                return false;
            }
            if r + 1 < size && v == board.get(r + 1, c) {
                return false;
            }
        }
    }
    true
}

/// Sum of every cell value.
pub fn get_score(board: &Board) -> Score {
    board.cells().iter().map(|&v| Score::from(v)).sum()
}

/// Count the number of zero tiles.
pub fn count_empty(board: &Board) -> usize {
    board.cells().iter().filter(|&&v| v == 0).count()
}

pub fn get_highest_tile_val(board: &Board) -> Tile {
    board.cells().iter().copied().max().unwrap_or(0)
}

/// Insert a random 2 (90%) or 4 (10%) tile into a uniformly chosen empty cell.
///
/// Returns the row-major index and value placed, or `None` if the board is full.
pub fn insert_random_tile<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> Option<(usize, Tile)> {
    let empty: Vec<usize> = board
        .cells()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v == 0)
        .map(|(idx, _)| idx)
        .collect();
    if empty.is_empty() {
        return None;
    }
    let idx = empty[rng.gen_range(0..empty.len())];
    let tile = generate_random_tile(rng);
    board.cells_mut()[idx] = tile;
    debug!("spawned {tile} at cell {idx}");
    Some((idx, tile))
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 {
        2
    } else {
        4
    }
}

pub(crate) fn format_val(val: &Tile) -> String {
    match val {
        0 => String::from("       "),
        &x => {
            let mut x = x.to_string();
            while x.len() < 7 {
                match x.len() {
                    6 => x = format!(" {}", x),
                    _ => x = format!(" {} ", x),
                }
            }
            x
        }
    }
}
