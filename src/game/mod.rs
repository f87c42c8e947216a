pub mod classic;
pub mod ghost;
pub mod race;
pub mod rush;
pub mod survivor;
pub mod zen;

use std::time::Duration;

use clap::ValueEnum;
use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::audio::{self, Cue};
use crate::clock::{IntervalTimer, SECOND_TICK};
use crate::config::GameOptions;
use crate::result::ResultRecord;
use crate::session::TypingSession;
use crate::store::ScoreStore;
use crate::text_gen::generate;

pub use classic::ClassicGame;
pub use ghost::GhostGame;
pub use race::RaceGame;
pub use rush::RushGame;
pub use survivor::SurvivorGame;
pub use zen::ZenGame;

/// The six playable challenges.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameKind {
    Classic,
    Zen,
    Survivor,
    Ghost,
    CarRace,
    WordRush,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::Classic,
        GameKind::Zen,
        GameKind::Survivor,
        GameKind::Ghost,
        GameKind::CarRace,
        GameKind::WordRush,
    ];

    pub fn title(self) -> &'static str {
        match self {
            GameKind::Classic => "Classic",
            GameKind::Zen => "Zen",
            GameKind::Survivor => "Survivor",
            GameKind::Ghost => "Ghost Race",
            GameKind::CarRace => "Car Race",
            GameKind::WordRush => "Word Rush",
        }
    }

    pub fn blurb(self) -> &'static str {
        match self {
            GameKind::Classic => "race the clock for your best wpm",
            GameKind::Zen => "no timer, type at your own pace",
            GameKind::Survivor => "three lives, clean words or lose one",
            GameKind::Ghost => "race a ghost running at your personal best",
            GameKind::CarRace => "outtype three rival cars to the line",
            GameKind::WordRush => "one word at a time against a shrinking ring",
        }
    }
}

/// Shared session lifecycle. The first keystroke of any kind only lifts
/// the idle overlay; the first content keystroke after that starts the
/// clock and is applied. Finished is latched: once set, input is dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Armed,
    Running,
    Finished,
}

/// What became of one keystroke, for mode-specific reactions layered on
/// top of the shared handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    Ignored,
    Revealed,
    Deleted,
    Typed { ch: char, correct: bool },
}

/// The pieces every text-based mode composes: a typing session, the phase
/// lifecycle, the 1 Hz clock with its per-second WPM samples, and a streak
/// counter for the HUD.
#[derive(Debug)]
pub(crate) struct TextCore {
    pub session: TypingSession,
    pub phase: Phase,
    pub elapsed_secs: u64,
    pub streak: u32,
    pub wpm_samples: Vec<u32>,
    second: IntervalTimer,
}

impl TextCore {
    pub fn new(words: &[String]) -> Self {
        Self {
            session: TypingSession::from_words(words),
            phase: Phase::Idle,
            elapsed_secs: 0,
            streak: 0,
            wpm_samples: Vec::new(),
            second: IntervalTimer::new(SECOND_TICK),
        }
    }

    /// Apply the shared lifecycle to one keystroke. Backspace is always
    /// structural; it deletes but never starts the clock.
    pub fn handle_key(&mut self, code: KeyCode) -> KeyOutcome {
        match self.phase {
            Phase::Finished => KeyOutcome::Ignored,
            Phase::Idle => {
                self.phase = Phase::Armed;
                KeyOutcome::Revealed
            }
            Phase::Armed | Phase::Running => match code {
                KeyCode::Backspace => {
                    self.session.delete_char();
                    KeyOutcome::Deleted
                }
                KeyCode::Char(c) => {
                    if self.phase == Phase::Armed {
                        self.phase = Phase::Running;
                    }
                    let correct = self.session.expected_char() == Some(c);
                    self.session.type_char(c);
                    if correct {
                        self.streak += 1;
                        audio::play(Cue::KeyCorrect);
                    } else {
                        self.streak = 0;
                        audio::play(Cue::KeyWrong);
                    }
                    if c == ' ' {
                        audio::play(Cue::WordDone);
                    }
                    KeyOutcome::Typed { ch: c, correct }
                }
                _ => KeyOutcome::Ignored,
            },
        }
    }

    /// Whole seconds elapsed since the last call; zero unless Running.
    pub fn second_fires(&mut self, dt: Duration) -> u32 {
        if self.phase != Phase::Running {
            return 0;
        }
        self.second.advance(dt)
    }

    /// Advance the session clock one second and record a WPM sample.
    pub fn sample_second(&mut self) -> u64 {
        self.elapsed_secs += 1;
        let wpm = self.session.calc_wpm(self.elapsed_secs);
        self.wpm_samples.push(wpm);
        self.elapsed_secs
    }

    /// Live WPM for the HUD.
    pub fn wpm_now(&self) -> u32 {
        if self.phase != Phase::Running {
            return 0;
        }
        self.session.calc_wpm(self.elapsed_secs)
    }
}

/// One launched game: the tagged union the app drives through a uniform
/// key/tick/result surface.
#[derive(Debug)]
pub enum Game {
    Classic(ClassicGame),
    Zen(ZenGame),
    Survivor(SurvivorGame),
    Ghost(GhostGame),
    CarRace(RaceGame),
    WordRush(RushGame),
}

impl Game {
    /// Build a fresh session for `kind`, generating its text and reading
    /// whatever stored bests the mode derives pace from.
    pub fn launch(kind: GameKind, options: &GameOptions, store: &dyn ScoreStore) -> Self {
        match kind {
            GameKind::Classic => {
                let words = generate(&options.gen_request(options.duration_secs));
                Game::Classic(ClassicGame::new(&words, options.duration_secs))
            }
            GameKind::Zen => {
                let words = generate(&options.gen_request(zen::ZEN_TEXT_SECS));
                Game::Zen(ZenGame::new(&words))
            }
            GameKind::Survivor => {
                let words = generate(&options.gen_request(options.duration_secs));
                Game::Survivor(SurvivorGame::new(&words, options.duration_secs))
            }
            GameKind::Ghost => {
                let words = generate(&options.gen_request(options.duration_secs));
                let pb = store.get(&format!("classic_{}", options.duration_secs));
                Game::Ghost(GhostGame::new(&words, options.duration_secs, pb))
            }
            GameKind::CarRace => {
                let words = generate(&options.gen_request(race::RACE_DURATION_SECS));
                Game::CarRace(RaceGame::new(&words, store.get("classic_30")))
            }
            GameKind::WordRush => Game::WordRush(RushGame::new()),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            Game::Classic(_) => GameKind::Classic,
            Game::Zen(_) => GameKind::Zen,
            Game::Survivor(_) => GameKind::Survivor,
            Game::Ghost(_) => GameKind::Ghost,
            Game::CarRace(_) => GameKind::CarRace,
            Game::WordRush(_) => GameKind::WordRush,
        }
    }

    pub fn on_key(&mut self, code: KeyCode) {
        match self {
            Game::Classic(g) => g.on_key(code),
            Game::Zen(g) => g.on_key(code),
            Game::Survivor(g) => g.on_key(code),
            Game::Ghost(g) => g.on_key(code),
            Game::CarRace(g) => g.on_key(code),
            Game::WordRush(g) => g.on_key(code),
        }
    }

    pub fn on_tick(&mut self, dt: Duration) {
        match self {
            Game::Classic(g) => g.on_tick(dt),
            Game::Zen(g) => g.on_tick(dt),
            Game::Survivor(g) => g.on_tick(dt),
            Game::Ghost(g) => g.on_tick(dt),
            Game::CarRace(g) => g.on_tick(dt),
            Game::WordRush(g) => g.on_tick(dt),
        }
    }

    pub fn is_finished(&self) -> bool {
        match self {
            Game::Classic(g) => g.is_finished(),
            Game::Zen(g) => g.is_finished(),
            Game::Survivor(g) => g.is_finished(),
            Game::Ghost(g) => g.is_finished(),
            Game::CarRace(g) => g.is_finished(),
            Game::WordRush(g) => g.is_finished(),
        }
    }

    /// The mode's ResultRecord, exactly once, after any emission delay.
    pub fn poll_result(&mut self) -> Option<ResultRecord> {
        match self {
            Game::Classic(g) => g.poll_result(),
            Game::Zen(g) => g.poll_result(),
            Game::Survivor(g) => g.poll_result(),
            Game::Ghost(g) => g.poll_result(),
            Game::CarRace(g) => g.poll_result(),
            Game::WordRush(g) => g.poll_result(),
        }
    }
}
