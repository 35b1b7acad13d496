use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::session::{Answer, Examinee};
use crate::engine::types::{TrialPair, Variant};

/// Scripted stand-in for a child taking the test.
#[derive(Debug, Clone)]
pub struct SimulatedExaminee {
    rng: StdRng,
    /// Chance of picking the right option on an ordinary word.
    pub accuracy: f64,
    /// Extra error rate on words starting with b or d.
    pub bd_error_rate: f64,
    /// Reaction time range in seconds.
    pub reaction_time: (f64, f64),
}

impl SimulatedExaminee {
    pub fn new(seed: u64, accuracy: f64, bd_error_rate: f64, reaction_time: (f64, f64)) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            accuracy: accuracy.clamp(0.0, 1.0),
            bd_error_rate: bd_error_rate.clamp(0.0, 1.0),
            reaction_time,
        }
    }

    pub fn for_variant(variant: Variant, seed: u64) -> Self {
        match variant {
            Variant::Strict => Self::new(seed, 0.75, 0.0, (0.8, 2.2)),
            Variant::Generalized => Self::new(seed, 1.0, 0.4, (0.5, 2.0)),
        }
    }

    fn draw_reaction_time(&mut self) -> f64 {
        let (lo, hi) = self.reaction_time;
        let rt = if hi > lo {
            self.rng.random_range(lo..hi)
        } else {
            lo
        };
        (rt.max(0.0) * 100.0).round() / 100.0
    }
}

impl Examinee for SimulatedExaminee {
    fn respond(&mut self, trial: &TrialPair) -> Answer {
        let reaction_time = self.draw_reaction_time();

        let confusable = trial.audio_word.starts_with('b') || trial.audio_word.starts_with('d');
        let slipped = confusable && self.rng.random::<f64>() < self.bd_error_rate;
        let missed = self.rng.random::<f64>() >= self.accuracy;

        let selected_index = if slipped || missed {
            1 - trial.correct_index.min(1)
        } else {
            trial.correct_index
        };

        Answer {
            selected_index,
            reaction_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(word: &str, other: &str) -> TrialPair {
        TrialPair::new(word, [other.to_string(), word.to_string()]).unwrap()
    }

    #[test]
    fn test_perfect_examinee_always_right() {
        let mut examinee = SimulatedExaminee::new(5, 1.0, 0.0, (1.0, 1.0));
        for _ in 0..20 {
            let answer = examinee.respond(&trial("bed", "ded"));
            assert_eq!(answer.selected_index, 1);
            assert_eq!(answer.reaction_time, 1.0);
        }
    }

    #[test]
    fn test_reaction_times_stay_in_range() {
        let mut examinee = SimulatedExaminee::for_variant(Variant::Strict, 11);
        for _ in 0..50 {
            let answer = examinee.respond(&trial("cat", "bat"));
            assert!((0.8..=2.2).contains(&answer.reaction_time));
        }
    }

    #[test]
    fn test_bd_slips_only_hit_confusable_words() {
        let mut examinee = SimulatedExaminee::new(9, 1.0, 1.0, (1.0, 1.0));
        assert_eq!(examinee.respond(&trial("dog", "bog")).selected_index, 0);
        assert_eq!(examinee.respond(&trial("cat", "bat")).selected_index, 1);
    }
}
