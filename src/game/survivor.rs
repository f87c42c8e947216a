use std::time::Duration;

use crossterm::event::KeyCode;

use crate::audio::{self, Cue};
use crate::game::{KeyOutcome, Phase, TextCore};
use crate::result::{Finalizer, ResultRecord, StatLine};
use crate::session::Stats;

pub const MAX_LIVES: u32 = 3;

/// Delay between losing the last life and emitting the result, so the
/// life-loss feedback lands before the screen changes.
const LAST_LIFE_DELAY: Duration = Duration::from_millis(350);

/// Lives-based survival: finishing a word with a lingering error costs a
/// life. Words are judged only at their space boundary, so the final word
/// of the text is never judged.
#[derive(Debug)]
pub struct SurvivorGame {
    core: TextCore,
    duration_secs: u64,
    lives: u32,
    note: &'static str,
    finalizer: Finalizer,
}

impl SurvivorGame {
    pub fn new(words: &[String], duration_secs: u64) -> Self {
        Self {
            core: TextCore::new(words),
            duration_secs,
            lives: MAX_LIVES,
            note: "",
            finalizer: Finalizer::default(),
        }
    }

    pub fn on_key(&mut self, code: KeyCode) {
        // The boundary check must read the cursor while it still sits on
        // the space, i.e. before the keystroke is applied.
        let word_err =
            code == KeyCode::Char(' ') && self.core.session.last_word_has_error();

        match self.core.handle_key(code) {
            KeyOutcome::Typed { ch: ' ', .. } if word_err => {
                self.lives = self.lives.saturating_sub(1);
                self.core.streak = 0;
                audio::play(Cue::LifeLost);
                if self.lives == 0 {
                    self.finish_after("no lives left", LAST_LIFE_DELAY);
                }
            }
            KeyOutcome::Typed { .. } => {
                if self.core.session.is_done() {
                    self.finish_after("all words done!", Duration::ZERO);
                }
            }
            _ => {}
        }
    }

    pub fn on_tick(&mut self, dt: Duration) {
        self.finalizer.advance(dt);
        for _ in 0..self.core.second_fires(dt) {
            if self.finalizer.is_finalized() {
                break;
            }
            let elapsed = self.core.sample_second();
            if elapsed >= self.duration_secs {
                self.finish_after("survived!", Duration::ZERO);
            }
        }
    }

    fn finish_after(&mut self, note: &'static str, delay: Duration) {
        if self.finalizer.is_finalized() {
            return;
        }
        let Stats {
            correct,
            incorrect,
            accuracy,
        } = self.core.session.stats();
        let wpm = self.core.session.calc_wpm(self.core.elapsed_secs);
        let record = ResultRecord {
            label: format!("survivor · {}s", self.duration_secs),
            main_num: wpm,
            main_unit: "words per minute",
            stats: vec![
                StatLine::new(format!("{} / {}", self.lives, MAX_LIVES), "Lives Left"),
                StatLine::new(format!("{}%", accuracy), "Accuracy"),
                StatLine::new(format!("{} / {}", correct, incorrect), "Correct / Errors"),
                StatLine::new(note, "Outcome"),
            ],
            wpm_history: self.core.wpm_samples.clone(),
            pb_key: format!("survivor_{}", self.duration_secs),
            score: wpm,
        };
        if self.finalizer.finalize_after(record, delay) {
            self.core.phase = Phase::Finished;
            self.note = note;
            if self.lives == 0 {
                audio::play(Cue::GameOver);
            } else {
                audio::play(Cue::Finish);
            }
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

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn note(&self) -> &'static str {
        self.note
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn time_left(&self) -> u64 {
        self.duration_secs.saturating_sub(self.core.elapsed_secs)
    }
}
