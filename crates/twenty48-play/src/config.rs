use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use twenty48_core::Difficulty;

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Config {
    #[serde(default = "defaults::difficulty")]
    pub difficulty: Difficulty,

    /// Name recorded on game over without prompting.
    #[serde(default)]
    pub player: Option<String>,

    /// Fixed RNG seed; omitted means seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Log filter handed to env_logger, e.g. "info", "debug".
    #[serde(default = "defaults::log_level")]
    pub log_level: String,

    #[serde(default)]
    pub leaderboard: Leaderboard,

    #[serde(default)]
    pub feedback: Feedback,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Leaderboard {
    /// Directory holding `highscores_<tier>.txt`.
    #[serde(default = "defaults::leaderboard_dir")]
    pub dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct Feedback {
    /// Ring the terminal bell when a move merges tiles.
    #[serde(default = "defaults::bell")]
    pub bell: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: defaults::difficulty(),
            player: None,
            seed: None,
            log_level: defaults::log_level(),
            leaderboard: Leaderboard::default(),
            feedback: Feedback::default(),
        }
    }
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self { dir: defaults::leaderboard_dir() }
    }
}

impl Default for Feedback {
    fn default() -> Self {
        Self { bell: defaults::bell() }
    }
}

impl Config {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(cfg)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_toml(p),
            None => Ok(Self::default()),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use twenty48_core::Difficulty;

    pub fn difficulty() -> Difficulty { Difficulty::Hard }
    pub fn log_level() -> String { "info".to_string() }
    pub fn leaderboard_dir() -> PathBuf { PathBuf::from(".") }
    pub fn bell() -> bool { true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.difficulty, Difficulty::Hard);
        assert!(cfg.feedback.bell);
    }

    #[test]
    fn reads_all_sections() {
        let td = tempdir().unwrap();
        let path = td.path().join("play.toml");
        std::fs::write(
            &path,
            r#"
difficulty = "easy"
player = "ana"
seed = 7
log_level = "debug"

[leaderboard]
dir = "scores"

[feedback]
bell = false
"#,
        )
        .unwrap();
        let cfg = Config::from_toml(&path).unwrap();
        assert_eq!(cfg.difficulty, Difficulty::Easy);
        assert_eq!(cfg.player.as_deref(), Some("ana"));
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.leaderboard.dir, PathBuf::from("scores"));
        assert!(!cfg.feedback.bell);
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        assert!(toml::from_str::<Config>("difficulty = \"extreme\"").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let td = tempdir().unwrap();
        assert!(Config::from_toml(td.path().join("nope.toml")).is_err());
    }
}
