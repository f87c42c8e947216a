use std::time::Duration;

use crossterm::event::KeyCode;

use crate::audio::{self, Cue};
use crate::clock::{IntervalTimer, GHOST_TICK};
use crate::game::{KeyOutcome, Phase, TextCore};
use crate::result::{Finalizer, ResultRecord, StatLine};
use crate::session::Stats;

/// Pace used when no classic personal best is on record yet.
pub const DEFAULT_GHOST_WPM: u32 = 45;

/// Race against a marker replaying the stored classic personal best for
/// the same duration. Winning writes the new best back through the result
/// record, so the next ghost runs faster.
#[derive(Debug)]
pub struct GhostGame {
    core: TextCore,
    duration_secs: u64,
    ghost_wpm: u32,
    ghost_pos: f64,
    ghost_timer: IntervalTimer,
    finalizer: Finalizer,
}

impl GhostGame {
    pub fn new(words: &[String], duration_secs: u64, pb_wpm: Option<f64>) -> Self {
        let ghost_wpm = match pb_wpm {
            Some(pb) if pb > 0.0 => pb.round() as u32,
            _ => DEFAULT_GHOST_WPM,
        };
        Self {
            core: TextCore::new(words),
            duration_secs,
            ghost_wpm,
            ghost_pos: 0.0,
            ghost_timer: IntervalTimer::new(GHOST_TICK),
            finalizer: Finalizer::default(),
        }
    }

    /// Ghost speed in characters per second.
    fn ghost_cps(&self) -> f64 {
        self.ghost_wpm as f64 * 5.0 / 60.0
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
        if self.core.phase == Phase::Running {
            let step = self.ghost_cps() * GHOST_TICK.as_secs_f64();
            for _ in 0..self.ghost_timer.advance(dt) {
                self.ghost_pos += step;
            }
        }
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

        let ahead = self.chars_ahead();
        let race_result = match ahead {
            a if a > 0 => format!("you beat the ghost by {} chars", a),
            a if a < 0 => format!("ghost wins by {} chars", -a),
            _ => "it's a tie".to_string(),
        };

        let record = ResultRecord {
            label: format!("ghost race · {}s", self.duration_secs),
            main_num: wpm,
            main_unit: "words per minute",
            stats: vec![
                StatLine::new(format!("{} wpm", self.ghost_wpm), "Ghost Speed (your PB)"),
                StatLine::new(format!("{}%", accuracy), "Accuracy"),
                StatLine::new(race_result, "Race Result"),
                StatLine::new(format!("{} / {}", correct, incorrect), "Correct / Errors"),
            ],
            wpm_history: self.core.wpm_samples.clone(),
            pb_key: format!("classic_{}", self.duration_secs),
            score: wpm,
        };
        if self.finalizer.finalize(record) {
            self.core.phase = Phase::Finished;
            if ahead > 0 {
                audio::play(Cue::PersonalBest);
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

    pub fn ghost_wpm(&self) -> u32 {
        self.ghost_wpm
    }

    pub fn ghost_pos(&self) -> f64 {
        self.ghost_pos
    }

    /// Player lead in characters; negative when the ghost is ahead.
    pub fn chars_ahead(&self) -> i64 {
        self.core.session.cursor_idx() as i64 - self.ghost_pos.floor() as i64
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn time_left(&self) -> u64 {
        self.duration_secs.saturating_sub(self.core.elapsed_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn long_target() -> Vec<String> {
        words(&"word ".repeat(200).trim().to_string())
    }

    #[test]
    fn ghost_speed_defaults_without_personal_best() {
        let game = GhostGame::new(&words("abc"), 30, None);
        assert_eq!(game.ghost_wpm(), DEFAULT_GHOST_WPM);
        let zero = GhostGame::new(&words("abc"), 30, Some(0.0));
        assert_eq!(zero.ghost_wpm(), DEFAULT_GHOST_WPM);
    }

    #[test]
    fn ghost_marker_tracks_stored_pace() {
        let mut game = GhostGame::new(&long_target(), 30, Some(45.0));
        game.on_key(KeyCode::Char('x')); // reveal
        game.on_key(KeyCode::Char('w')); // start

        game.on_tick(Duration::from_secs(10));
        // 45 wpm = 3.75 chars/sec; 10s = 37.5 chars, within one 150ms tick
        let expected = 45.0 * 5.0 / 60.0 * 10.0;
        assert!((game.ghost_pos() - expected).abs() <= 3.75 * 0.15 + 1e-9);
    }

    #[test]
    fn ghost_does_not_move_before_start() {
        let mut game = GhostGame::new(&long_target(), 30, Some(45.0));
        game.on_tick(Duration::from_secs(5));
        assert_eq!(game.ghost_pos(), 0.0);
        game.on_key(KeyCode::Char('x')); // reveal only
        game.on_tick(Duration::from_secs(5));
        assert_eq!(game.ghost_pos(), 0.0);
    }

    #[test]
    fn finish_reports_the_margin() {
        let mut game = GhostGame::new(&words("ab cd"), 30, Some(45.0));
        game.on_key(KeyCode::Char('x'));
        for c in "ab cd".chars() {
            game.on_key(KeyCode::Char(c));
        }
        assert!(game.is_finished());
        let record = game.poll_result().unwrap();
        // ghost never moved: player wins by the full text
        assert_eq!(record.stats[2].val, "you beat the ghost by 5 chars");
        assert_eq!(record.pb_key, "classic_30");
    }

    #[test]
    fn timeout_can_hand_the_ghost_the_win() {
        let mut game = GhostGame::new(&long_target(), 2, Some(60.0));
        game.on_key(KeyCode::Char('x'));
        game.on_key(KeyCode::Char('w'));
        game.on_tick(Duration::from_secs(2));
        assert!(game.is_finished());
        let record = game.poll_result().unwrap();
        assert!(record.stats[2].val.starts_with("ghost wins by"));
    }

    #[test]
    fn ghost_stops_at_finalize() {
        let mut game = GhostGame::new(&long_target(), 2, Some(45.0));
        game.on_key(KeyCode::Char('x'));
        game.on_key(KeyCode::Char('w'));
        game.on_tick(Duration::from_secs(2));
        let pos = game.ghost_pos();
        game.on_tick(Duration::from_secs(5));
        assert_eq!(game.ghost_pos(), pos);
    }
}
