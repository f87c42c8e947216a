use rand::Rng;

/// Track length in abstract progress units; the player's position is the
/// typed fraction of the target scaled onto the same range.
pub const TRACK_LEN: f64 = 500.0;

const RIVAL_NAMES: [&str; 3] = ["Ace", "Blaze", "Cruz"];
const PB_FACTORS: [f64; 3] = [1.10, 0.80, 0.55];
const FALLBACK_WPM: [u32; 3] = [65, 45, 30];

/// Relative jitter applied to each movement step.
const STEP_JITTER: f64 = 0.05;

/// Someone on the track: the human or a simulated rival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Racer {
    Player,
    Rival(&'static str),
}

#[derive(Debug, Clone)]
pub struct Rival {
    pub name: &'static str,
    pub base_wpm: u32,
    pub position: f64,
}

/// The simulated field for a race: independently paced rivals advanced by
/// a stochastic step each tick.
#[derive(Debug, Clone)]
pub struct RivalField {
    pub rivals: Vec<Rival>,
}

impl RivalField {
    /// Rival speeds derive from the stored classic personal best when one
    /// exists, otherwise fixed defaults.
    pub fn from_personal_best(pb_wpm: Option<f64>) -> Self {
        let rivals = match pb_wpm {
            Some(pb) if pb > 0.0 => RIVAL_NAMES
                .iter()
                .copied()
                .zip(PB_FACTORS)
                .map(|(name, factor)| Rival {
                    name,
                    base_wpm: (pb * factor).round() as u32,
                    position: 0.0,
                })
                .collect(),
            _ => RIVAL_NAMES
                .iter()
                .copied()
                .zip(FALLBACK_WPM)
                .map(|(name, wpm)| Rival {
                    name,
                    base_wpm: wpm,
                    position: 0.0,
                })
                .collect(),
        };
        Self { rivals }
    }

    /// Advance every rival one 100ms step at the given difficulty
    /// multiplier. Returns the first rival to reach the finish line this
    /// step, if any.
    pub fn step<R: Rng>(&mut self, multiplier: f64, rng: &mut R) -> Option<&'static str> {
        let mut finished = None;
        for rival in &mut self.rivals {
            let effective_wpm = rival.base_wpm as f64 * multiplier;
            // chars per 100ms at 5 chars per word
            let base = effective_wpm * 5.0 / 60.0 / 10.0;
            let jitter = base * STEP_JITTER * rng.gen_range(-1.0..1.0);
            let step = (base + jitter).max(0.0);
            rival.position = (rival.position + step).min(TRACK_LEN);
            if rival.position >= TRACK_LEN && finished.is_none() {
                finished = Some(rival.name);
            }
        }
        finished
    }

    /// Whoever is furthest along right now; ties go to the player.
    pub fn leader(&self, player_pos: f64) -> Racer {
        let mut best = Racer::Player;
        let mut best_pos = player_pos;
        for rival in &self.rivals {
            if rival.position > best_pos {
                best_pos = rival.position;
                best = Racer::Rival(rival.name);
            }
        }
        best
    }

    /// 1-based placement of the player by position, descending. Ties favor
    /// the player.
    pub fn player_rank(&self, player_pos: f64) -> usize {
        1 + self
            .rivals
            .iter()
            .filter(|r| r.position > player_pos)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn fallback_speeds_without_personal_best() {
        let field = RivalField::from_personal_best(None);
        let speeds: Vec<u32> = field.rivals.iter().map(|r| r.base_wpm).collect();
        assert_eq!(speeds, vec![65, 45, 30]);

        let zero = RivalField::from_personal_best(Some(0.0));
        assert_eq!(zero.rivals[0].base_wpm, 65);
    }

    #[test]
    fn speeds_scale_from_personal_best() {
        let field = RivalField::from_personal_best(Some(60.0));
        let speeds: Vec<u32> = field.rivals.iter().map(|r| r.base_wpm).collect();
        assert_eq!(speeds, vec![66, 48, 33]);
    }

    #[test]
    fn step_is_bounded_by_jitter() {
        let mut field = RivalField::from_personal_best(None);
        let mut rng = thread_rng();
        field.step(1.0, &mut rng);
        for rival in &field.rivals {
            let base = rival.base_wpm as f64 * 5.0 / 60.0 / 10.0;
            assert!(rival.position >= base * (1.0 - STEP_JITTER) - 1e-9);
            assert!(rival.position <= base * (1.0 + STEP_JITTER) + 1e-9);
        }
    }

    #[test]
    fn positions_clamp_to_track_length() {
        let mut field = RivalField::from_personal_best(Some(200.0));
        let mut rng = thread_rng();
        for _ in 0..10_000 {
            field.step(1.4, &mut rng);
        }
        for rival in &field.rivals {
            assert!(rival.position <= TRACK_LEN);
        }
    }

    #[test]
    fn fastest_rival_finishes_first() {
        let mut field = RivalField::from_personal_best(None);
        let mut rng = thread_rng();
        let mut winner = None;
        while winner.is_none() {
            winner = field.step(1.0, &mut rng);
        }
        assert_eq!(winner, Some("Ace"));
    }

    #[test]
    fn leader_and_rank_follow_positions() {
        let mut field = RivalField::from_personal_best(None);
        field.rivals[0].position = 300.0;
        field.rivals[1].position = 150.0;
        field.rivals[2].position = 50.0;

        assert_eq!(field.leader(100.0), Racer::Rival("Ace"));
        assert_eq!(field.player_rank(100.0), 3);

        assert_eq!(field.leader(400.0), Racer::Player);
        assert_eq!(field.player_rank(400.0), 1);

        // ties go to the player
        assert_eq!(field.leader(300.0), Racer::Player);
        assert_eq!(field.player_rank(300.0), 1);
    }
}
