//! Line-oriented terminal front end.
//!
//! The engine knows nothing about the terminal: board changes arrive through a
//! subscribed observer that queues events, and the session drains the queue
//! after each command to redraw and ring the bell.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use twenty48_core::{BoardEvent, Difficulty, FileScoreStore, GameEngine, Move, ScoreStore};

const HELP: &str = "keys: w/a/s/d or up/left/down/right to move, u or z to undo, n new game, q quit";

/// One parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Move),
    Undo,
    NewGame,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let cmd = match line.trim().to_ascii_lowercase().as_str() {
        "w" | "k" | "up" => Command::Move(Move::Up),
        "s" | "j" | "down" => Command::Move(Move::Down),
        "a" | "h" | "left" => Command::Move(Move::Left),
        "d" | "l" | "right" => Command::Move(Move::Right),
        "u" | "z" | "undo" => Command::Undo,
        "n" | "new" => Command::NewGame,
        "?" | "help" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub difficulty: Difficulty,
    pub seed: Option<u64>,
    pub player: Option<String>,
    pub bell: bool,
    pub leaderboard_dir: PathBuf,
}

type Engine = GameEngine<StdRng, FileScoreStore>;

/// Interactive session over any line reader and writer.
pub struct TerminalSession<I: BufRead, O: Write> {
    input: I,
    output: O,
    options: SessionOptions,
    games_started: u64,
}

enum GameEnd {
    Quit,
    Restart(Difficulty),
}

impl<I: BufRead, O: Write> TerminalSession<I, O> {
    pub fn new(input: I, output: O, options: SessionOptions) -> Self {
        Self {
            input,
            output,
            options,
            games_started: 0,
        }
    }

    /// Play until the user quits or input runs out.
    pub fn run(&mut self) -> Result<()> {
        let mut difficulty = self.options.difficulty;
        loop {
            match self.play(difficulty)? {
                GameEnd::Quit => break,
                GameEnd::Restart(next) => difficulty = next,
            }
        }
        writeln!(self.output, "bye")?;
        Ok(())
    }

    fn build_engine(&mut self, difficulty: Difficulty) -> Engine {
        let rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.games_started)),
            None => StdRng::from_entropy(),
        };
        self.games_started += 1;
        let store = FileScoreStore::new(&self.options.leaderboard_dir);
        GameEngine::new(difficulty, rng, store)
    }

    fn play(&mut self, difficulty: Difficulty) -> Result<GameEnd> {
        let mut engine = self.build_engine(difficulty);
        let events: Rc<RefCell<Vec<BoardEvent>>> = Rc::default();
        let queue = Rc::clone(&events);
        engine.subscribe(move |event, _board| queue.borrow_mut().push(*event));

        writeln!(self.output, "{difficulty} ({0}x{0}). {HELP}", difficulty.board_size())?;
        self.render(&engine)?;

        loop {
            let Some(line) = self.read_line()? else {
                return Ok(GameEnd::Quit);
            };
            let progressed = match parse_command(&line) {
                Some(Command::Move(dir)) => engine.make_move(dir),
                Some(Command::Undo) => {
                    let undone = engine.undo();
                    if !undone {
                        writeln!(self.output, "nothing to undo")?;
                    }
                    undone
                }
                Some(Command::NewGame) => {
                    engine.new_game();
                    false
                }
                Some(Command::Help) => {
                    writeln!(self.output, "{HELP}")?;
                    false
                }
                Some(Command::Quit) => return Ok(GameEnd::Quit),
                None => {
                    writeln!(self.output, "unknown command {:?}; {HELP}", line.trim())?;
                    false
                }
            };

            let drained: Vec<BoardEvent> = events.borrow_mut().drain(..).collect();
            if drained.is_empty() {
                continue;
            }
            let merged = drained
                .iter()
                .any(|e| matches!(e, BoardEvent::Moved { merged: true, .. }));
            if merged && self.options.bell {
                write!(self.output, "\x07")?;
            }
            self.render(&engine)?;

            if progressed && engine.is_game_over() {
                return self.game_over(&mut engine);
            }
        }
    }

    fn game_over(&mut self, engine: &mut Engine) -> Result<GameEnd> {
        let difficulty = engine.difficulty();
        let name = match self.options.player.clone() {
            Some(name) => name,
            None => {
                writeln!(self.output, "Game over! Enter your name for the leaderboard:")?;
                match self.read_line()? {
                    Some(line) => line.trim().to_string(),
                    None => return Ok(GameEnd::Quit),
                }
            }
        };
        let score = engine.save_high_score(&name, difficulty)?;
        info!("{name} finished a {difficulty} game with {score}");
        writeln!(self.output, "Game over! {name} scored {score}.")?;
        write!(self.output, "{}", engine.store().display(difficulty)?)?;

        writeln!(self.output, "Play again? [y/N]")?;
        let again = self
            .read_line()?
            .is_some_and(|l| matches!(l.trim().to_ascii_lowercase().as_str(), "y" | "yes"));
        if !again {
            return Ok(GameEnd::Quit);
        }
        writeln!(
            self.output,
            "Choose difficulty [easy 6x6 / medium 5x5 / hard 4x4] (enter keeps {difficulty}):"
        )?;
        let next = match self.read_line()? {
            Some(line) if !line.trim().is_empty() => match line.parse::<Difficulty>() {
                Ok(d) => d,
                Err(e) => {
                    writeln!(self.output, "{e}; keeping {difficulty}")?;
                    difficulty
                }
            },
            _ => difficulty,
        };
        Ok(GameEnd::Restart(next))
    }

    fn render(&mut self, engine: &Engine) -> Result<()> {
        write!(self.output, "{}", engine.board())?;
        writeln!(self.output, "score: {}", engine.score())?;
        self.output.flush().context("failed to flush terminal")
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        let n = self
            .input
            .read_line(&mut buf)
            .context("failed to read input")?;
        Ok((n > 0).then_some(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn options(dir: PathBuf) -> SessionOptions {
        SessionOptions {
            difficulty: Difficulty::Hard,
            seed: Some(1),
            player: Some("tester".to_string()),
            bell: false,
            leaderboard_dir: dir,
        }
    }

    #[test]
    fn parses_key_bindings() {
        assert_eq!(parse_command("w\n"), Some(Command::Move(Move::Up)));
        assert_eq!(parse_command(" LEFT "), Some(Command::Move(Move::Left)));
        assert_eq!(parse_command("z"), Some(Command::Undo));
        assert_eq!(parse_command("n"), Some(Command::NewGame));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("x"), None);
    }

    #[test]
    fn quits_on_command_and_on_eof() {
        let td = tempdir().unwrap();
        let mut out = Vec::new();
        TerminalSession::new(Cursor::new("a\nfoo\nu\nq\n"), &mut out, options(td.path().into()))
            .run()
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Hard (4x4)"));
        assert!(text.contains("unknown command \"foo\""));
        assert!(text.ends_with("bye\n"));

        let mut out = Vec::new();
        TerminalSession::new(Cursor::new(""), &mut out, options(td.path().into()))
            .run()
            .unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("bye\n"));
    }

    #[test]
    fn finished_game_lands_on_leaderboard() {
        let td = tempdir().unwrap();
        let script = "w\na\ns\nd\n".repeat(20_000);
        let mut out = Vec::new();
        TerminalSession::new(Cursor::new(script), &mut out, options(td.path().into()))
            .run()
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Game over! tester scored"));
        assert!(text.contains("Leaderboard (Hard):\ntester: "));

        let store = FileScoreStore::new(td.path());
        let entries = store.load(Difficulty::Hard).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "tester");
        assert!(entries[0].score > 0);
    }
}
