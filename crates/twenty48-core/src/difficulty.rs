use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Error};
use serde::{Deserialize, Serialize};

/// Difficulty tier. Fixes the board size and selects the leaderboard partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// 6×6 board.
    Easy,
    /// 5×5 board.
    Medium,
    /// 4×4 board.
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn board_size(self) -> usize {
        match self {
            Difficulty::Easy => 6,
            Difficulty::Medium => 5,
            Difficulty::Hard => 4,
        }
    }

    /// Inverse of [`Difficulty::board_size`].
    pub fn from_board_size(size: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.board_size() == size)
    }

    /// Lowercase key used in file names and config.
    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        write!(f, "{name}")
    }
}

/// Accepts tier names (`easy`, `Medium`, ...) or a board size (`6`, `5x5`).
impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(d) = Self::ALL.into_iter().find(|d| d.key() == s) {
            return Ok(d);
        }
        let size = s.split_once('x').map_or(s.as_str(), |(n, _)| n);
        match size.parse::<usize>().ok().and_then(Self::from_board_size) {
            Some(d) => Ok(d),
            None => bail!("unknown difficulty {s:?}; expected easy, medium or hard"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_fixed_per_tier() {
        assert_eq!(Difficulty::Easy.board_size(), 6);
        assert_eq!(Difficulty::Medium.board_size(), 5);
        assert_eq!(Difficulty::Hard.board_size(), 4);
        assert_eq!(Difficulty::from_board_size(5), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_board_size(3), None);
    }

    #[test]
    fn parses_names_and_sizes() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(" Hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("5x5".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("4".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
        assert!("7x7".parse::<Difficulty>().is_err());
    }
}
