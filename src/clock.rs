use std::time::Duration;

/// Tick periods used by the game state machines. They are logically
/// independent timers multiplexed onto the app's single event pump.
pub const SECOND_TICK: Duration = Duration::from_secs(1);
pub const AI_TICK: Duration = Duration::from_millis(100);
pub const GHOST_TICK: Duration = Duration::from_millis(150);

/// Recurring timer driven by `advance` calls from the event pump.
///
/// `advance` returns how many whole periods elapsed, so a coarse pump tick
/// never drops fires; callers dispatch each fire in turn and re-read any
/// shared state fresh between them.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    acc: Duration,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        assert!(!period.is_zero());
        Self {
            period,
            acc: Duration::ZERO,
        }
    }

    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.acc += dt;
        let mut fires = 0;
        while self.acc >= self.period {
            self.acc -= self.period;
            fires += 1;
        }
        fires
    }

    pub fn reset(&mut self) {
        self.acc = Duration::ZERO;
    }
}

/// One-shot delay. Disarmed until `arm` and again after firing or `cancel`;
/// dropping it with its owning session cancels it implicitly.
#[derive(Debug, Clone, Default)]
pub struct OneShot {
    remaining: Option<Duration>,
}

impl OneShot {
    pub fn armed(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn arm(&mut self, delay: Duration) {
        self.remaining = Some(delay);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    /// Returns true exactly once, on the advance that crosses the deadline.
    pub fn advance(&mut self, dt: Duration) -> bool {
        match self.remaining {
            Some(rem) if rem <= dt => {
                self.remaining = None;
                true
            }
            Some(rem) => {
                self.remaining = Some(rem - dt);
                false
            }
            None => false,
        }
    }
}

/// Continuous countdown backing the per-word ring: exposes the fraction of
/// time remaining rather than discrete fires.
#[derive(Debug, Clone)]
pub struct RingClock {
    limit: Duration,
    elapsed: Duration,
}

impl RingClock {
    pub fn start(limit: Duration) -> Self {
        Self {
            limit,
            elapsed: Duration::ZERO,
        }
    }

    pub fn restart(&mut self, limit: Duration) {
        self.limit = limit;
        self.elapsed = Duration::ZERO;
    }

    /// Returns true exactly once, on the advance that exhausts the limit.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.elapsed >= self.limit {
            return false;
        }
        self.elapsed = (self.elapsed + dt).min(self.limit);
        self.elapsed >= self.limit
    }

    /// Fraction remaining in [0, 1]; drives both ring color and expiry.
    pub fn fraction(&self) -> f64 {
        if self.limit.is_zero() {
            return 0.0;
        }
        (1.0 - self.elapsed.as_secs_f64() / self.limit.as_secs_f64()).max(0.0)
    }

    pub fn expired(&self) -> bool {
        self.elapsed >= self.limit
    }
}
