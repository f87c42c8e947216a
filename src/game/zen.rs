use std::time::Duration;

use crossterm::event::KeyCode;

use crate::audio::{self, Cue};
use crate::game::{KeyOutcome, Phase, TextCore};
use crate::result::{Finalizer, ResultRecord, StatLine};
use crate::session::Stats;

/// How much text an untimed session is seeded with.
pub const ZEN_TEXT_SECS: u64 = 120;

/// Untimed mode: the clock free-runs and only feeds the headline WPM.
/// Ends when the text runs out or on an explicit finish (Enter).
#[derive(Debug)]
pub struct ZenGame {
    core: TextCore,
    finalizer: Finalizer,
}

impl ZenGame {
    pub fn new(words: &[String]) -> Self {
        Self {
            core: TextCore::new(words),
            finalizer: Finalizer::default(),
        }
    }

    pub fn on_key(&mut self, code: KeyCode) {
        if code == KeyCode::Enter && self.core.phase == Phase::Running {
            self.finish();
            return;
        }
        if let KeyOutcome::Typed { .. } = self.core.handle_key(code) {
            if self.core.session.is_done() {
                self.finish();
            }
        }
    }

    pub fn on_tick(&mut self, dt: Duration) {
        self.finalizer.advance(dt);
        for _ in 0..self.core.second_fires(dt) {
            // elapsed only; zen keeps no per-second history
            self.core.elapsed_secs += 1;
        }
    }

    fn finish(&mut self) {
        if self.finalizer.is_finalized() {
            return;
        }
        let Stats {
            correct,
            incorrect,
            accuracy,
        } = self.core.session.stats();
        let elapsed = self.core.elapsed_secs.max(1);
        let wpm = self.core.session.calc_wpm(elapsed);
        let record = ResultRecord {
            label: "zen · untimed".to_string(),
            main_num: wpm,
            main_unit: "words per minute",
            stats: vec![
                StatLine::new(format!("{}%", accuracy), "Accuracy"),
                StatLine::new(correct.to_string(), "Correct Chars"),
                StatLine::new(incorrect.to_string(), "Errors"),
                StatLine::new(format!("{}s", elapsed), "Time Taken"),
            ],
            wpm_history: Vec::new(),
            pb_key: "zen".to_string(),
            score: wpm,
        };
        if self.finalizer.finalize(record) {
            self.core.phase = Phase::Finished;
            audio::play(Cue::Finish);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finalizer.is_finalized()
    }

    pub fn poll_result(&mut self) -> Option<ResultRecord> {
        self.finalizer.poll()
    }

    // HUD accessors

    pub fn phase(&self) -> Phase {
        self.core.phase
    }

    pub fn session(&self) -> &crate::session::TypingSession {
        &self.core.session
    }

    pub fn wpm_now(&self) -> u32 {
        self.core.wpm_now()
    }

    pub fn streak(&self) -> u32 {
        self.core.streak
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.core.elapsed_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn type_all(game: &mut ZenGame, text: &str) {
        for c in text.chars() {
            game.on_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn no_timer_ever_ends_a_zen_session() {
        let mut game = ZenGame::new(&words("endless calm typing"));
        game.on_key(KeyCode::Char('e'));
        type_all(&mut game, "endless");
        game.on_tick(Duration::from_secs(3600));
        assert!(!game.is_finished());
        assert_eq!(game.elapsed_secs(), 3600);
    }

    #[test]
    fn text_exhaustion_finishes() {
        let mut game = ZenGame::new(&words("hi"));
        game.on_key(KeyCode::Char('h'));
        type_all(&mut game, "hi");
        assert!(game.is_finished());
        let record = game.poll_result().unwrap();
        assert_eq!(record.label, "zen · untimed");
        assert!(record.wpm_history.is_empty());
    }

    #[test]
    fn enter_finishes_manually_while_running() {
        let mut game = ZenGame::new(&words("plenty of words left"));
        game.on_key(KeyCode::Char('p'));
        type_all(&mut game, "plenty");
        game.on_tick(Duration::from_secs(6));
        game.on_key(KeyCode::Enter);

        assert!(game.is_finished());
        let record = game.poll_result().unwrap();
        // 6 correct chars over 6 seconds
        assert_eq!(record.main_num, 12);
        assert_eq!(record.stats[3].val, "6s");
    }

    #[test]
    fn enter_before_running_is_inert() {
        let mut game = ZenGame::new(&words("hello"));
        game.on_key(KeyCode::Enter); // reveals only
        game.on_key(KeyCode::Enter); // armed, not running: no finish
        assert!(!game.is_finished());
    }

    #[test]
    fn elapsed_affects_headline_only() {
        let mut game = ZenGame::new(&words("abcdef"));
        game.on_key(KeyCode::Char('a'));
        type_all(&mut game, "abc");
        game.on_tick(Duration::from_secs(60));
        assert!(!game.is_finished());
        type_all(&mut game, "def");
        let record = game.poll_result().unwrap();
        assert_eq!(record.stats[0].val, "100%");
    }
}
