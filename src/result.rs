use std::time::Duration;

use crate::clock::OneShot;
use crate::util::{mean, std_dev};

/// One labeled figure on the results screen.
#[derive(Debug, Clone, PartialEq)]
pub struct StatLine {
    pub val: String,
    pub lbl: &'static str,
}

impl StatLine {
    pub fn new(val: impl Into<String>, lbl: &'static str) -> Self {
        Self {
            val: val.into(),
            lbl,
        }
    }
}

/// The sole output of any game mode, consumed by history storage and the
/// results screen. `score` is mode-opaque: words per minute for most modes,
/// completed words for word rush.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub label: String,
    pub main_num: u32,
    pub main_unit: &'static str,
    pub stats: Vec<StatLine>,
    pub wpm_history: Vec<u32>,
    pub pb_key: String,
    pub score: u32,
}

/// Exactly-once finalization latch.
///
/// Every trigger site (timer expiry, text exhaustion, life exhaustion,
/// opponent finish) calls `finalize` or `finalize_after`; only the first
/// call captures a record, so same-instant races collapse to whichever
/// trigger ran first. The record's data is fixed at that moment even when
/// emission is deferred, and dropping the owning session before the delay
/// runs out cancels emission entirely.
#[derive(Debug, Default)]
pub struct Finalizer {
    record: Option<ResultRecord>,
    delay: OneShot,
    latched: bool,
}

impl Finalizer {
    pub fn is_finalized(&self) -> bool {
        self.latched
    }

    /// Latch and stage the record for immediate emission. Returns false if
    /// a previous trigger already won.
    pub fn finalize(&mut self, record: ResultRecord) -> bool {
        if self.latched {
            return false;
        }
        self.latched = true;
        self.record = Some(record);
        true
    }

    /// Latch now, emit after `delay`. The record still reflects state at
    /// the trigger, not at emission. A zero delay emits immediately.
    pub fn finalize_after(&mut self, record: ResultRecord, delay: Duration) -> bool {
        if !self.finalize(record) {
            return false;
        }
        if !delay.is_zero() {
            self.delay.arm(delay);
        }
        true
    }

    pub fn advance(&mut self, dt: Duration) {
        self.delay.advance(dt);
    }

    /// Takes the staged record once any emission delay has run out. Yields
    /// `Some` at most once per session.
    pub fn poll(&mut self) -> Option<ResultRecord> {
        if self.delay.armed() {
            return None;
        }
        self.record.take()
    }
}

/// Steadiness of the per-second WPM samples: 100 means perfectly even
/// pacing, 0 means the spread rivals the average. Zero samples are skipped
/// so idle lead-in seconds don't poison the figure.
pub fn consistency(samples: &[u32]) -> u32 {
    let live: Vec<f64> = samples.iter().filter(|w| **w > 0).map(|w| *w as f64).collect();
    if live.len() < 2 {
        return 100;
    }
    let m = mean(&live).unwrap_or(1.0).max(1.0);
    let sd = std_dev(&live).unwrap_or(0.0);
    (100.0 - (sd / m) * 100.0).round().max(0.0) as u32
}
