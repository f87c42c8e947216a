use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Named feedback cues fired by game logic at specific transitions.
///
/// Playback is fire-and-forget: the sink may do nothing at all (sound off,
/// cue too chatty for a terminal bell, write failure) and the caller never
/// learns about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    KeyCorrect,
    KeyWrong,
    WordDone,
    RushCorrect,
    RushFail,
    LifeLost,
    GameOver,
    Finish,
    PersonalBest,
}

// Process-wide switch, read-only from game logic; only the UI layer flips it.
static ENABLED: AtomicBool = AtomicBool::new(true);

pub fn init(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Best-effort playback. Per-keystroke cues stay silent on the bell sink;
/// everything salient gets one BEL.
pub fn play(cue: Cue) {
    if !is_enabled() {
        return;
    }
    let ring = matches!(
        cue,
        Cue::RushFail | Cue::LifeLost | Cue::GameOver | Cue::Finish | Cue::PersonalBest
    );
    if ring {
        let mut out = io::stdout();
        let _ = out.write_all(b"\x07").and_then(|_| out.flush());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_flag_round_trips() {
        init(true);
        assert!(is_enabled());
        set_enabled(false);
        assert!(!is_enabled());
        set_enabled(true);
        assert!(is_enabled());
    }

    #[test]
    fn play_never_panics_when_disabled() {
        set_enabled(false);
        play(Cue::Finish);
        play(Cue::KeyCorrect);
        set_enabled(true);
    }
}
