//! Ranked high scores, partitioned by difficulty tier.
//!
//! The engine only ever calls [`ScoreStore::save`]; `load` and `display` are
//! for the presentation layer.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i64,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Persistence for ranked high scores.
pub trait ScoreStore {
    /// Insert an entry and keep the tier ordered by descending score.
    fn save(&mut self, player_name: &str, score: i64, difficulty: Difficulty) -> Result<()>;

    /// Entries for a tier, best first.
    fn load(&self, difficulty: Difficulty) -> Result<Vec<ScoreEntry>>;

    /// Human-readable ranked list for a tier.
    fn display(&self, difficulty: Difficulty) -> Result<String> {
        Ok(format_leaderboard(difficulty, &self.load(difficulty)?))
    }
}

/// Render a ranked list as `Leaderboard (<Tier>):` followed by `name: score` lines.
pub fn format_leaderboard(difficulty: Difficulty, entries: &[ScoreEntry]) -> String {
    let mut out = format!("Leaderboard ({difficulty}):\n");
    for e in entries {
        out.push_str(&format!("{}: {}\n", e.name, e.score));
    }
    out
}

/// Stable descending sort; ties keep insertion order.
fn rank(entries: &mut [ScoreEntry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Text-file leaderboard: one `name|score` line per entry, one file per tier.
///
/// Files live in `dir` as `highscores_<tier>.txt`. A save re-reads the file,
/// appends, re-sorts and rewrites it whole.
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    dir: PathBuf,
}

impl FileScoreStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Partition file for a tier.
    pub fn path_for(&self, difficulty: Difficulty) -> PathBuf {
        self.dir.join(format!("highscores_{}.txt", difficulty.key()))
    }

    /// Make a name safe for the `name|score` line format.
    ///
    /// `|` becomes `/` and line breaks become spaces, so the entry reads back
    /// as exactly one line with two fields.
    pub fn sanitize_name(name: &str) -> String {
        name.chars()
            .map(|c| match c {
                '|' => '/',
                '\n' | '\r' => ' ',
                c => c,
            })
            .collect()
    }

    /// Parse one `name|score` line. Wrong field count or a non-integer score yields `None`.
    pub fn parse_line(line: &str) -> Option<ScoreEntry> {
        let mut parts = line.split('|');
        let (name, score) = (parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let score = score.trim().parse::<i64>().ok()?;
        Some(ScoreEntry::new(name, score))
    }

    fn write_all(&self, difficulty: Difficulty, entries: &[ScoreEntry]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.path_for(difficulty);
        let contents: String = entries
            .iter()
            .map(|e| format!("{}|{}\n", e.name, e.score))
            .collect();
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
    }
}

impl ScoreStore for FileScoreStore {
    fn save(&mut self, player_name: &str, score: i64, difficulty: Difficulty) -> Result<()> {
        let player_name = Self::sanitize_name(player_name);
        let mut entries = self.load(difficulty)?;
        entries.push(ScoreEntry::new(player_name.as_str(), score));
        rank(&mut entries);
        self.write_all(difficulty, &entries)?;
        info!(
            "saved score {score} for {player_name:?} to {}",
            self.path_for(difficulty).display()
        );
        Ok(())
    }

    fn load(&self, difficulty: Difficulty) -> Result<Vec<ScoreEntry>> {
        let path = self.path_for(difficulty);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        let entries = contents
            .lines()
            .filter_map(|line| {
                let entry = Self::parse_line(line);
                if entry.is_none() {
                    debug!("skipping malformed leaderboard line {line:?}");
                }
                entry
            })
            .collect();
        Ok(entries)
    }
}

/// In-process store, useful for simulations and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    partitions: HashMap<Difficulty, Vec<ScoreEntry>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn save(&mut self, player_name: &str, score: i64, difficulty: Difficulty) -> Result<()> {
        let entries = self.partitions.entry(difficulty).or_default();
        entries.push(ScoreEntry::new(player_name, score));
        rank(entries);
        Ok(())
    }

    fn load(&self, difficulty: Difficulty) -> Result<Vec<ScoreEntry>> {
        Ok(self.partitions.get(&difficulty).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_empty() {
        let td = tempdir().unwrap();
        let store = FileScoreStore::new(td.path());
        assert!(store.load(Difficulty::Hard).unwrap().is_empty());
    }

    #[test]
    fn save_sorts_descending_and_rewrites_file() {
        let td = tempdir().unwrap();
        let mut store = FileScoreStore::new(td.path());
        store.save("ana", 120, Difficulty::Medium).unwrap();
        store.save("bob", 300, Difficulty::Medium).unwrap();
        store.save("ana", 200, Difficulty::Medium).unwrap();
        store.save("cy", 200, Difficulty::Medium).unwrap();

        let entries = store.load(Difficulty::Medium).unwrap();
        assert_eq!(
            entries,
            vec![
                ScoreEntry::new("bob", 300),
                ScoreEntry::new("ana", 200),
                ScoreEntry::new("cy", 200),
                ScoreEntry::new("ana", 120),
            ]
        );
        let raw = fs::read_to_string(store.path_for(Difficulty::Medium)).unwrap();
        assert_eq!(raw, "bob|300\nana|200\ncy|200\nana|120\n");
    }

    #[test]
    fn partitions_are_independent() {
        let td = tempdir().unwrap();
        let mut store = FileScoreStore::new(td.path());
        store.save("ana", 10, Difficulty::Easy).unwrap();
        assert!(store.load(Difficulty::Hard).unwrap().is_empty());
        assert!(store.path_for(Difficulty::Easy).ends_with("highscores_easy.txt"));
        assert!(store.path_for(Difficulty::Medium).ends_with("highscores_medium.txt"));
        assert!(store.path_for(Difficulty::Hard).ends_with("highscores_hard.txt"));
    }

    #[test]
    fn malformed_lines_are_dropped_on_save() {
        let td = tempdir().unwrap();
        let mut store = FileScoreStore::new(td.path());
        fs::write(
            store.path_for(Difficulty::Hard),
            "good|50\nno-score\nbad|x\ntoo|many|fields\n\nneg|-3\n",
        )
        .unwrap();
        store.save("new", 60, Difficulty::Hard).unwrap();
        let raw = fs::read_to_string(store.path_for(Difficulty::Hard)).unwrap();
        assert_eq!(raw, "new|60\ngood|50\nneg|-3\n");
    }

    #[test]
    fn names_with_separators_survive_a_reload() {
        let td = tempdir().unwrap();
        let mut store = FileScoreStore::new(td.path());
        store.save("a|b", 10, Difficulty::Hard).unwrap();
        store.save("two\nlines\r", 20, Difficulty::Hard).unwrap();

        let entries = store.load(Difficulty::Hard).unwrap();
        assert_eq!(
            entries,
            vec![ScoreEntry::new("two lines ", 20), ScoreEntry::new("a/b", 10)]
        );
        let raw = fs::read_to_string(store.path_for(Difficulty::Hard)).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert_eq!(
            store.display(Difficulty::Hard).unwrap(),
            "Leaderboard (Hard):\ntwo lines : 20\na/b: 10\n"
        );
    }

    #[test]
    fn parse_line_cases() {
        assert_eq!(FileScoreStore::parse_line("a|1"), Some(ScoreEntry::new("a", 1)));
        assert_eq!(FileScoreStore::parse_line("a| 7 "), Some(ScoreEntry::new("a", 7)));
        assert_eq!(FileScoreStore::parse_line("|5"), Some(ScoreEntry::new("", 5)));
        assert_eq!(FileScoreStore::parse_line("a"), None);
        assert_eq!(FileScoreStore::parse_line("a|1.5"), None);
        assert_eq!(FileScoreStore::parse_line("a|1|2"), None);
    }

    #[test]
    fn display_lists_in_rank_order() {
        let mut store = MemoryScoreStore::new();
        store.save("low", 4, Difficulty::Easy).unwrap();
        store.save("high", 40, Difficulty::Easy).unwrap();
        assert_eq!(
            store.display(Difficulty::Easy).unwrap(),
            "Leaderboard (Easy):\nhigh: 40\nlow: 4\n"
        );
        assert_eq!(store.display(Difficulty::Hard).unwrap(), "Leaderboard (Hard):\n");
    }

    #[test]
    fn unwritable_directory_is_an_error() {
        let td = tempdir().unwrap();
        let blocker = td.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let mut store = FileScoreStore::new(blocker.join("nested"));
        assert!(store.save("a", 1, Difficulty::Hard).is_err());
    }
}
