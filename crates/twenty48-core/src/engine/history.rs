use std::collections::VecDeque;

use super::state::Board;

/// Maximum number of snapshots kept for undo.
pub const HISTORY_CAPACITY: usize = 4;

/// Bounded buffer of board snapshots.
///
/// Pushing past capacity evicts the oldest snapshot; undo takes from the
/// newest end. Snapshots are owned copies, never shared with the live board.
#[derive(Debug, Clone, Default)]
pub struct History {
    snapshots: VecDeque<Board>,
}

impl History {
    pub fn new() -> Self {
        Self {
            snapshots: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// Record a snapshot, dropping the oldest once over capacity.
    pub fn push(&mut self, snapshot: Board) {
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > HISTORY_CAPACITY {
            self.snapshots.pop_front();
        }
    }

    /// Take the most recent snapshot for an undo.
    ///
    /// Only succeeds while more than one snapshot is held, so the first
    /// recorded move of a session cannot be undone on its own.
    pub fn pop_for_undo(&mut self) -> Option<Board> {
        if self.snapshots.len() > 1 {
            self.snapshots.pop_back()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(v: u32) -> Board {
        Board::from_rows(&[vec![v, 0], vec![0, 0]]).unwrap()
    }

    #[test]
    fn never_exceeds_capacity_and_evicts_oldest() {
        let mut h = History::new();
        for i in 1..=10 {
            h.push(marked(1 << i));
            assert!(h.len() <= HISTORY_CAPACITY);
        }
        assert_eq!(h.len(), HISTORY_CAPACITY);
        let mut popped = Vec::new();
        while let Some(b) = h.pop_for_undo() {
            popped.push(b.get(0, 0));
        }
        // the oldest surviving snapshot (2^7) stays behind
        assert_eq!(popped, vec![1 << 10, 1 << 9, 1 << 8]);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn single_snapshot_is_not_undoable() {
        let mut h = History::new();
        assert!(h.pop_for_undo().is_none());
        h.push(marked(2));
        assert!(h.pop_for_undo().is_none());
        assert_eq!(h.len(), 1);
        h.push(marked(4));
        assert_eq!(h.pop_for_undo().unwrap().get(0, 0), 4);
    }

    #[test]
    fn clear_empties() {
        let mut h = History::new();
        h.push(marked(2));
        h.clear();
        assert!(h.is_empty());
    }
}
