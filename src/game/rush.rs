use std::time::Duration;

use crossterm::event::KeyCode;

use crate::audio::{self, Cue};
use crate::clock::{IntervalTimer, OneShot, RingClock, SECOND_TICK};
use crate::game::Phase;
use crate::result::{Finalizer, ResultRecord, StatLine};
use crate::text_gen::rush_words;

pub const RUSH_DURATION_SECS: u64 = 60;

const START_LIMIT_SECS: f64 = 3.0;
const LIMIT_STEP_SECS: f64 = 0.15;
const MIN_LIMIT_SECS: f64 = 0.8;
/// Every Nth completed word tightens the ring.
const TIGHTEN_EVERY: u32 = 5;
const POOL_SIZE: usize = 300;
/// How long the ok/fail flash lingers for the renderer.
const FLASH_LINGER: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Ok,
    Fail,
}

/// One word at a time against a shrinking countdown ring. Completing the
/// word the instant its last character matches scores; the space key is an
/// explicit skip; running the ring down is a failure.
#[derive(Debug)]
pub struct RushGame {
    pool: Vec<String>,
    pool_cursor: usize,
    word: String,
    typed: String,
    score: u32,
    combo: u32,
    max_combo: u32,
    limit_secs: f64,
    ring: RingClock,
    phase: Phase,
    elapsed_secs: u64,
    second: IntervalTimer,
    flash: Option<Flash>,
    flash_clear: OneShot,
    finalizer: Finalizer,
}

impl RushGame {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let mut game = Self {
            pool: rush_words(POOL_SIZE),
            pool_cursor: 0,
            word: String::new(),
            typed: String::new(),
            score: 0,
            combo: 0,
            max_combo: 0,
            limit_secs: START_LIMIT_SECS,
            ring: RingClock::start(Duration::from_secs_f64(START_LIMIT_SECS)),
            phase: Phase::Idle,
            elapsed_secs: 0,
            second: IntervalTimer::new(SECOND_TICK),
            flash: None,
            flash_clear: OneShot::default(),
            finalizer: Finalizer::default(),
        };
        game.next_word();
        game
    }

    fn next_word(&mut self) {
        if self.pool_cursor >= self.pool.len() {
            self.pool = rush_words(POOL_SIZE);
            self.pool_cursor = 0;
        }
        self.word = self.pool[self.pool_cursor].clone();
        self.pool_cursor += 1;
        self.typed.clear();
        self.ring.restart(Duration::from_secs_f64(self.limit_secs));
    }

    pub fn on_key(&mut self, code: KeyCode) {
        match self.phase {
            Phase::Finished => {}
            Phase::Idle => {
                // first keystroke only wakes the arena
                self.phase = Phase::Armed;
            }
            Phase::Armed | Phase::Running => match code {
                KeyCode::Backspace => {
                    self.typed.pop();
                }
                KeyCode::Char(' ') => {
                    if self.phase == Phase::Armed {
                        self.start();
                    }
                    self.fail();
                }
                KeyCode::Char(c) => {
                    if self.phase == Phase::Armed {
                        self.start();
                    }
                    self.typed.push(c);
                    audio::play(Cue::KeyCorrect);
                    if self.typed == self.word {
                        self.success();
                    }
                }
                _ => {}
            },
        }
    }

    fn start(&mut self) {
        self.phase = Phase::Running;
        self.ring.restart(Duration::from_secs_f64(self.limit_secs));
    }

    pub fn on_tick(&mut self, dt: Duration) {
        self.finalizer.advance(dt);
        if self.flash_clear.advance(dt) {
            self.flash = None;
        }
        if self.phase != Phase::Running {
            return;
        }

        if self.ring.advance(dt) {
            self.fail();
        }
        for _ in 0..self.second.advance(dt) {
            self.elapsed_secs += 1;
            if self.elapsed_secs >= RUSH_DURATION_SECS {
                self.finish();
                return;
            }
        }
    }

    fn success(&mut self) {
        self.score += 1;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        if self.score % TIGHTEN_EVERY == 0 {
            self.limit_secs = (self.limit_secs - LIMIT_STEP_SECS).max(MIN_LIMIT_SECS);
        }
        self.flash = Some(Flash::Ok);
        self.flash_clear.arm(FLASH_LINGER);
        audio::play(Cue::RushCorrect);
        self.next_word();
    }

    fn fail(&mut self) {
        self.combo = 0;
        self.flash = Some(Flash::Fail);
        self.flash_clear.arm(FLASH_LINGER);
        audio::play(Cue::RushFail);
        self.next_word();
    }

    fn finish(&mut self) {
        if self.finalizer.is_finalized() {
            return;
        }
        let words_per_min =
            (self.score as f64 * 60.0 / RUSH_DURATION_SECS as f64).round() as u32;
        let record = ResultRecord {
            label: format!("word rush · {}s", RUSH_DURATION_SECS),
            main_num: self.score,
            main_unit: "words completed",
            stats: vec![
                StatLine::new(self.max_combo.to_string(), "Best Combo"),
                StatLine::new(self.score.to_string(), "Words Correct"),
                StatLine::new(words_per_min.to_string(), "Words / Min"),
                StatLine::new(format!("{:.2}s", self.limit_secs), "Current Word Limit"),
            ],
            wpm_history: Vec::new(),
            pb_key: "wordrush".to_string(),
            score: self.score,
        };
        if self.finalizer.finalize(record) {
            self.phase = Phase::Finished;
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
        self.phase
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn limit_secs(&self) -> f64 {
        self.limit_secs
    }

    pub fn ring_fraction(&self) -> f64 {
        self.ring.fraction()
    }

    pub fn flash(&self) -> Option<Flash> {
        self.flash
    }

    pub fn time_left(&self) -> u64 {
        RUSH_DURATION_SECS.saturating_sub(self.elapsed_secs)
    }
}
