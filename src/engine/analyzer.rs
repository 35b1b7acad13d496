use super::config::ScoringRules;
use super::types::{
    Analysis, Assessment, Difficulty, PromptHints, RiskCategory, RiskScores, TaskLength,
    TrialResponse, Variant,
};

/// Stateless scorer. Every call recomputes from the full history.
#[derive(Debug, Clone)]
pub struct ResponseAnalyzer {
    rules: ScoringRules,
}

impl ResponseAnalyzer {
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    pub fn for_variant(variant: Variant) -> Self {
        Self::new(ScoringRules::for_variant(variant))
    }

    pub fn analyze(&self, responses: &[TrialResponse]) -> Analysis {
        if responses.is_empty() {
            return Analysis::neutral();
        }

        let accuracy = accuracy(responses);
        let (avg_rt, var_rt) = reaction_time_stats(responses);
        let scores = self.score(responses, accuracy, avg_rt, var_rt);

        let (assessment, prompt_hints) = match self.rules.variant {
            Variant::Strict => (self.strict_assessment(&scores), self.strict_hints(&scores)),
            Variant::Generalized => {
                let primary = scores.primary();
                (
                    self.primary_assessment(&scores, primary),
                    primary_hints(primary),
                )
            }
        };

        Analysis {
            accuracy,
            avg_reaction_time: avg_rt,
            variance_reaction_time: var_rt,
            risk_scores: scores,
            assessment,
            prompt_hints,
        }
    }

    pub fn phoneme_errors(&self, responses: &[TrialResponse]) -> usize {
        responses
            .iter()
            .filter(|r| !r.correct)
            .filter(|r| {
                self.rules.confusable_words.is_empty()
                    || self
                        .rules
                        .confusable_words
                        .iter()
                        .any(|w| w.eq_ignore_ascii_case(r.target_word.trim()))
            })
            .count()
    }

    fn score(
        &self,
        responses: &[TrialResponse],
        accuracy: f64,
        avg_rt: f64,
        var_rt: f64,
    ) -> RiskScores {
        let rules = &self.rules;
        let mut scores = RiskScores::default();

        let errors = self.phoneme_errors(responses);
        if errors >= rules.phoneme_error_min {
            scores.phonological +=
                rules.phoneme_error_bonus + rules.phoneme_error_weight * errors as f64;
        }
        if let Some(threshold) = rules.low_accuracy_threshold {
            if accuracy < threshold {
                scores.phonological += rules.low_accuracy_bonus;
            }
        }

        if avg_rt > rules.slow_rt_threshold {
            scores.fluency += rules.slow_rt_bonus;
        }
        // slow but accurate
        if accuracy >= rules.slow_accurate_accuracy && avg_rt > rules.slow_accurate_rt {
            scores.fluency += rules.slow_accurate_bonus;
        }

        if var_rt > rules.variance_threshold {
            scores.attention += rules.variance_bonus;
        }
        if let Some(threshold) = rules.high_variance_threshold {
            if var_rt > threshold {
                scores.attention += rules.high_variance_bonus;
            }
        }

        match rules.score_ceiling {
            Some(ceiling) => scores.clamped(ceiling),
            None => scores,
        }
    }

    fn strict_assessment(&self, scores: &RiskScores) -> Assessment {
        if scores.max() < self.rules.low_risk_threshold {
            return Assessment::NoSignificantIssue;
        }

        let issues: Vec<RiskCategory> = RiskCategory::ALL
            .into_iter()
            .filter(|c| scores.get(*c) >= self.rules.suspect_threshold)
            .collect();

        // Zero issues above the low-risk floor (fluency 0.4 alone) also lands here.
        match issues.as_slice() {
            [single] => Assessment::Suspected(*single),
            _ => Assessment::MultipleIssues,
        }
    }

    fn strict_hints(&self, scores: &RiskScores) -> PromptHints {
        let suspect = self.rules.suspect_threshold;
        PromptHints {
            target_phonemes: if scores.phonological >= suspect {
                ['b', 'd'].into_iter().collect()
            } else {
                Default::default()
            },
            task_length: if scores.attention >= suspect {
                TaskLength::Short
            } else {
                TaskLength::Normal
            },
            difficulty: if scores.fluency >= suspect {
                Difficulty::Easy
            } else {
                Difficulty::Normal
            },
        }
    }

    fn primary_assessment(&self, scores: &RiskScores, primary: Option<RiskCategory>) -> Assessment {
        match primary {
            Some(category) if scores.max() >= self.rules.low_risk_threshold => {
                Assessment::Primary(category)
            }
            _ => Assessment::NoSignificantIssue,
        }
    }
}

fn primary_hints(primary: Option<RiskCategory>) -> PromptHints {
    match primary {
        Some(RiskCategory::Phonological) => PromptHints::with_phonemes(&['b', 'd', 'p', 'q']),
        Some(RiskCategory::Fluency) => PromptHints {
            difficulty: Difficulty::Hard,
            ..Default::default()
        },
        Some(RiskCategory::Attention) => PromptHints {
            difficulty: Difficulty::Variable,
            ..Default::default()
        },
        None => PromptHints::default(),
    }
}

pub fn accuracy(responses: &[TrialResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let correct = responses.iter().filter(|r| r.correct).count();
    correct as f64 / responses.len() as f64
}

/// Mean and population variance of reaction times. Variance is 0 below two samples.
pub fn reaction_time_stats(responses: &[TrialResponse]) -> (f64, f64) {
    if responses.is_empty() {
        return (0.0, 0.0);
    }
    let n = responses.len() as f64;
    let mean = responses.iter().map(|r| r.reaction_time).sum::<f64>() / n;
    if responses.len() < 2 {
        return (mean, 0.0);
    }
    let variance = responses
        .iter()
        .map(|r| (r.reaction_time - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(word: &str, correct: bool, rt: f64) -> TrialResponse {
        TrialResponse::new(word, word, correct, rt)
    }

    #[test]
    fn test_empty_history_is_neutral() {
        for variant in [Variant::Strict, Variant::Generalized] {
            let analysis = ResponseAnalyzer::for_variant(variant).analyze(&[]);
            assert_eq!(analysis, Analysis::neutral());
            assert_eq!(analysis.assessment.label(), "insufficient data");
            assert!(analysis.prompt_hints.target_phonemes.is_empty());
        }
    }

    #[test]
    fn test_population_variance() {
        let responses = vec![response("a", true, 1.0), response("b", true, 3.0)];
        let (mean, var) = reaction_time_stats(&responses);
        assert!((mean - 2.0).abs() < 1e-9);
        assert!((var - 1.0).abs() < 1e-9);

        let (_, single) = reaction_time_stats(&responses[..1]);
        assert_eq!(single, 0.0);
    }

    #[test]
    fn test_strict_only_counts_confusable_words() {
        let analyzer = ResponseAnalyzer::for_variant(Variant::Strict);
        let responses = vec![
            response("bed", false, 1.0),
            response("cat", false, 1.0),
            response("DAD", false, 1.0),
        ];
        assert_eq!(analyzer.phoneme_errors(&responses), 2);
    }

    #[test]
    fn test_generalized_counts_every_error() {
        let analyzer = ResponseAnalyzer::for_variant(Variant::Generalized);
        let responses = vec![response("cat", false, 1.0), response("sun", true, 1.0)];
        assert_eq!(analyzer.phoneme_errors(&responses), 1);
        let analysis = analyzer.analyze(&responses);
        assert!((analysis.risk_scores.phonological - 0.5).abs() < 1e-9);
        assert_eq!(analysis.assessment, Assessment::Primary(RiskCategory::Phonological));
    }

    #[test]
    fn test_generalized_clamps_scores() {
        let analyzer = ResponseAnalyzer::for_variant(Variant::Generalized);
        let responses: Vec<_> = (0..5).map(|_| response("bed", false, 1.0)).collect();
        let analysis = analyzer.analyze(&responses);
        assert_eq!(analysis.risk_scores.phonological, 1.0);
    }

    #[test]
    fn test_strict_lone_fluency_falls_through_to_multiple() {
        let analyzer = ResponseAnalyzer::for_variant(Variant::Strict);
        let responses: Vec<_> = ["cat", "sun", "map", "hat", "pen"]
            .iter()
            .map(|w| response(w, true, 1.7))
            .collect();
        let analysis = analyzer.analyze(&responses);
        assert!((analysis.risk_scores.fluency - 0.4).abs() < 1e-9);
        assert_eq!(analysis.assessment, Assessment::MultipleIssues);
        assert_eq!(analysis.prompt_hints.difficulty, Difficulty::Normal);
    }

    #[test]
    fn test_strict_slow_but_accurate() {
        let analyzer = ResponseAnalyzer::for_variant(Variant::Strict);
        let responses: Vec<_> = ["cat", "sun", "map"]
            .iter()
            .map(|w| response(w, true, 2.0))
            .collect();
        let analysis = analyzer.analyze(&responses);
        assert!((analysis.risk_scores.fluency - 0.7).abs() < 1e-9);
        assert_eq!(analysis.assessment, Assessment::Suspected(RiskCategory::Fluency));
        assert_eq!(analysis.prompt_hints.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_strict_attention_tiers() {
        let analyzer = ResponseAnalyzer::for_variant(Variant::Strict);
        // mean 1.5, variance 1.0
        let responses = vec![response("cat", true, 0.5), response("sun", true, 2.5)];
        let analysis = analyzer.analyze(&responses);
        assert!((analysis.risk_scores.attention - 0.7).abs() < 1e-9);
        assert_eq!(analysis.prompt_hints.task_length, TaskLength::Short);
    }

    #[test]
    fn test_generalized_hints_follow_primary_risk() {
        let analyzer = ResponseAnalyzer::for_variant(Variant::Generalized);
        let slow: Vec<_> = ["cat", "sun"].iter().map(|w| response(w, true, 1.6)).collect();
        let analysis = analyzer.analyze(&slow);
        assert_eq!(analysis.assessment, Assessment::Primary(RiskCategory::Fluency));
        assert_eq!(analysis.prompt_hints.difficulty, Difficulty::Hard);

        let erratic = vec![response("cat", true, 0.2), response("sun", true, 1.8)];
        let analysis = analyzer.analyze(&erratic);
        assert_eq!(analysis.assessment, Assessment::Primary(RiskCategory::Attention));
        assert_eq!(analysis.prompt_hints.difficulty, Difficulty::Variable);
    }
}
