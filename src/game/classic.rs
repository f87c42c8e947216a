use std::time::Duration;

use crossterm::event::KeyCode;

use crate::audio::{self, Cue};
use crate::game::{KeyOutcome, Phase, TextCore};
use crate::result::{consistency, Finalizer, ResultRecord, StatLine};
use crate::session::Stats;

/// Fixed-duration race against the clock. Ends on timeout or when the text
/// runs out, whichever fires first; the finalize latch absorbs the other.
#[derive(Debug)]
pub struct ClassicGame {
    core: TextCore,
    duration_secs: u64,
    finalizer: Finalizer,
}

impl ClassicGame {
    pub fn new(words: &[String], duration_secs: u64) -> Self {
        Self {
            core: TextCore::new(words),
            duration_secs,
            finalizer: Finalizer::default(),
        }
    }

    pub fn on_key(&mut self, code: KeyCode) {
        if let KeyOutcome::Typed { .. } = self.core.handle_key(code) {
            if self.core.session.is_done() {
                self.finish();
            }
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
                self.finish();
            }
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
        let wpm = self.core.session.calc_wpm(self.core.elapsed_secs);
        let record = ResultRecord {
            label: format!("classic · {}s", self.duration_secs),
            main_num: wpm,
            main_unit: "words per minute",
            stats: vec![
                StatLine::new(format!("{}%", accuracy), "Accuracy"),
                StatLine::new(format!("{} / {}", correct, incorrect), "Correct / Errors"),
                StatLine::new(format!("{} wpm", wpm), "Raw WPM"),
                StatLine::new(
                    format!("{}%", consistency(&self.core.wpm_samples)),
                    "Consistency",
                ),
            ],
            wpm_history: self.core.wpm_samples.clone(),
            pb_key: format!("classic_{}", self.duration_secs),
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

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn time_left(&self) -> u64 {
        self.duration_secs.saturating_sub(self.core.elapsed_secs)
    }
}
