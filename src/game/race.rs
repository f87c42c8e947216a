use std::time::Duration;

use crossterm::event::KeyCode;

use crate::audio::{self, Cue};
use crate::clock::{IntervalTimer, AI_TICK};
use crate::game::{KeyOutcome, Phase, TextCore};
use crate::opponents::{Racer, RivalField, TRACK_LEN};
use crate::result::{Finalizer, ResultRecord, StatLine};
use crate::session::Stats;
use crate::util::ordinal;

pub const RACE_DURATION_SECS: u64 = 90;

/// Celebration window between the race-deciding event and the results
/// screen. The record's data is fixed at the trigger, not at emission.
const CELEBRATION_DELAY: Duration = Duration::from_millis(2200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 0.7,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 1.4,
        }
    }

    fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }

    fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

/// Typing race against three simulated rivals. The player's car is driven
/// purely by the cursor; rivals advance on their own 100ms tick. First to
/// the line ends the race, or the leader wins at the 90 second cap.
#[derive(Debug)]
pub struct RaceGame {
    core: TextCore,
    rivals: RivalField,
    difficulty: Difficulty,
    ai_timer: IntervalTimer,
    winner: Option<Racer>,
    player_rank: Option<usize>,
    finalizer: Finalizer,
}

impl RaceGame {
    pub fn new(words: &[String], classic_pb: Option<f64>) -> Self {
        Self {
            core: TextCore::new(words),
            rivals: RivalField::from_personal_best(classic_pb),
            difficulty: Difficulty::Medium,
            ai_timer: IntervalTimer::new(AI_TICK),
            winner: None,
            player_rank: None,
            finalizer: Finalizer::default(),
        }
    }

    /// The player's track position, derived from the cursor alone.
    pub fn player_pos(&self) -> f64 {
        self.core.session.progress() * TRACK_LEN
    }

    pub fn on_key(&mut self, code: KeyCode) {
        // Difficulty is locked in once the race starts.
        if self.core.phase == Phase::Idle || self.core.phase == Phase::Armed {
            match code {
                KeyCode::Left => {
                    self.difficulty = self.difficulty.prev();
                    return;
                }
                KeyCode::Right => {
                    self.difficulty = self.difficulty.next();
                    return;
                }
                _ => {}
            }
        }

        if let KeyOutcome::Typed { .. } = self.core.handle_key(code) {
            if self.player_pos() >= TRACK_LEN {
                self.trigger(Racer::Player);
            }
        }
    }

    pub fn on_tick(&mut self, dt: Duration) {
        self.finalizer.advance(dt);
        if self.core.phase != Phase::Running {
            return;
        }

        let mult = self.difficulty.multiplier();
        let rng = &mut rand::thread_rng();
        for _ in 0..self.ai_timer.advance(dt) {
            if let Some(name) = self.rivals.step(mult, rng) {
                self.trigger(Racer::Rival(name));
                return;
            }
        }

        for _ in 0..self.core.second_fires(dt) {
            let elapsed = self.core.sample_second();
            if elapsed >= RACE_DURATION_SECS {
                // Nobody crossed the line: furthest along takes it.
                let leader = self.rivals.leader(self.player_pos());
                self.trigger(leader);
                return;
            }
        }
    }

    fn trigger(&mut self, winner: Racer) {
        if self.finalizer.is_finalized() {
            return;
        }
        let Stats {
            correct,
            incorrect,
            accuracy,
        } = self.core.session.stats();
        let wpm = self.core.session.calc_wpm(self.core.elapsed_secs);
        let rank = self.rivals.player_rank(self.player_pos());
        let winner_name = match winner {
            Racer::Player => "you".to_string(),
            Racer::Rival(name) => name.to_string(),
        };

        let record = ResultRecord {
            label: format!("car race · {}s", RACE_DURATION_SECS),
            main_num: wpm,
            main_unit: "words per minute",
            stats: vec![
                StatLine::new(ordinal(rank), "Your Position"),
                StatLine::new(winner_name, "Race Winner"),
                StatLine::new(format!("{}%", accuracy), "Accuracy"),
                StatLine::new(format!("{} / {}", correct, incorrect), "Correct / Errors"),
            ],
            wpm_history: self.core.wpm_samples.clone(),
            pb_key: "carrace".to_string(),
            score: wpm,
        };
        if self.finalizer.finalize_after(record, CELEBRATION_DELAY) {
            self.core.phase = Phase::Finished;
            self.winner = Some(winner);
            self.player_rank = Some(rank);
            if winner == Racer::Player {
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

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn rivals(&self) -> &RivalField {
        &self.rivals
    }

    pub fn winner(&self) -> Option<Racer> {
        self.winner
    }

    pub fn player_rank(&self) -> Option<usize> {
        self.player_rank
    }

    pub fn time_left(&self) -> u64 {
        RACE_DURATION_SECS.saturating_sub(self.core.elapsed_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn long_target() -> Vec<String> {
        words(&"word ".repeat(300).trim().to_string())
    }

    fn start(game: &mut RaceGame) {
        game.on_key(KeyCode::Char('x')); // reveal
        game.on_key(KeyCode::Char('w')); // start
    }

    #[test]
    fn difficulty_cycles_only_before_start() {
        let mut game = RaceGame::new(&long_target(), None);
        assert_eq!(game.difficulty(), Difficulty::Medium);
        game.on_key(KeyCode::Right);
        assert_eq!(game.difficulty(), Difficulty::Hard);
        game.on_key(KeyCode::Left);
        game.on_key(KeyCode::Left);
        assert_eq!(game.difficulty(), Difficulty::Easy);

        start(&mut game);
        game.on_key(KeyCode::Right);
        assert_eq!(game.difficulty(), Difficulty::Easy);
    }

    #[test]
    fn idle_player_loses_to_ace() {
        let mut game = RaceGame::new(&long_target(), None);
        start(&mut game);

        // drive the whole race in 100ms steps; the player never types again
        for _ in 0..950 {
            game.on_tick(Duration::from_millis(100));
            if game.is_finished() {
                break;
            }
        }
        assert!(game.is_finished());
        assert_eq!(game.winner(), Some(Racer::Rival("Ace")));
        assert_eq!(game.player_rank(), Some(4));

        game.on_tick(CELEBRATION_DELAY);
        let record = game.poll_result().unwrap();
        assert_eq!(record.stats[0].val, "4th");
        assert_eq!(record.stats[1].val, "Ace");
    }

    #[test]
    fn finishing_the_text_wins_immediately() {
        let mut game = RaceGame::new(&words("ab"), None);
        start(&mut game); // 'w' is wrong but applied
        game.on_key(KeyCode::Char('b'));
        assert!(game.is_finished());
        assert_eq!(game.winner(), Some(Racer::Player));
    }

    #[test]
    fn emission_waits_for_the_celebration_window() {
        let mut game = RaceGame::new(&words("ab"), None);
        start(&mut game);
        game.on_key(KeyCode::Char('b'));
        assert!(game.is_finished());
        assert!(game.poll_result().is_none());

        game.on_tick(Duration::from_millis(2000));
        assert!(game.poll_result().is_none());
        game.on_tick(Duration::from_millis(300));
        assert!(game.poll_result().is_some());
    }

    #[test]
    fn record_is_snapshotted_at_the_trigger() {
        let mut game = RaceGame::new(&words("ab"), None);
        start(&mut game);
        game.on_key(KeyCode::Char('b'));
        let rank_then = game.player_rank();

        // rivals keep nothing moving during the celebration window
        game.on_tick(CELEBRATION_DELAY);
        let record = game.poll_result().unwrap();
        assert_eq!(Some(1), rank_then);
        assert_eq!(record.stats[0].val, "1st");
    }

    #[test]
    fn rival_speeds_follow_the_stored_best() {
        let game = RaceGame::new(&long_target(), Some(100.0));
        let speeds: Vec<u32> = game.rivals().rivals.iter().map(|r| r.base_wpm).collect();
        assert_eq!(speeds, vec![110, 80, 55]);
    }

    #[test]
    fn ai_only_moves_while_running() {
        let mut game = RaceGame::new(&long_target(), None);
        game.on_tick(Duration::from_secs(10));
        assert_eq!(game.rivals().rivals[0].position, 0.0);
        game.on_key(KeyCode::Char('x'));
        game.on_tick(Duration::from_secs(10));
        assert_eq!(game.rivals().rivals[0].position, 0.0);
    }
}
