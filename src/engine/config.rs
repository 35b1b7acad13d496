use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::Variant;

pub const SUSPECT_THRESHOLD: f64 = 0.5;
pub const LOW_RISK_THRESHOLD: f64 = 0.35;
pub const DEFAULT_MAX_TRIALS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRules {
    pub variant: Variant,
    pub suspect_threshold: f64,
    pub low_risk_threshold: f64,
    /// Target words whose errors count as phoneme errors; empty counts every error.
    pub confusable_words: Vec<String>,
    pub phoneme_error_min: usize,
    pub phoneme_error_bonus: f64,
    pub phoneme_error_weight: f64,
    pub low_accuracy_threshold: Option<f64>,
    pub low_accuracy_bonus: f64,
    pub slow_rt_threshold: f64,
    pub slow_rt_bonus: f64,
    pub slow_accurate_accuracy: f64,
    pub slow_accurate_rt: f64,
    pub slow_accurate_bonus: f64,
    pub variance_threshold: f64,
    pub variance_bonus: f64,
    pub high_variance_threshold: Option<f64>,
    pub high_variance_bonus: f64,
    pub score_ceiling: Option<f64>,
}

impl ScoringRules {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Strict => Self::strict(),
            Variant::Generalized => Self::generalized(),
        }
    }

    pub fn strict() -> Self {
        Self {
            variant: Variant::Strict,
            suspect_threshold: SUSPECT_THRESHOLD,
            low_risk_threshold: LOW_RISK_THRESHOLD,
            confusable_words: vec!["bed".into(), "bad".into(), "dad".into()],
            phoneme_error_min: 2,
            phoneme_error_bonus: 0.5,
            phoneme_error_weight: 0.0,
            low_accuracy_threshold: Some(0.8),
            low_accuracy_bonus: 0.3,
            slow_rt_threshold: 1.6,
            slow_rt_bonus: 0.4,
            slow_accurate_accuracy: 0.85,
            slow_accurate_rt: 1.8,
            slow_accurate_bonus: 0.3,
            variance_threshold: 0.5,
            variance_bonus: 0.5,
            high_variance_threshold: Some(0.8),
            high_variance_bonus: 0.2,
            score_ceiling: None,
        }
    }

    pub fn generalized() -> Self {
        Self {
            variant: Variant::Generalized,
            suspect_threshold: SUSPECT_THRESHOLD,
            low_risk_threshold: LOW_RISK_THRESHOLD,
            confusable_words: Vec::new(),
            phoneme_error_min: 1,
            phoneme_error_bonus: 0.0,
            phoneme_error_weight: 0.5,
            low_accuracy_threshold: None,
            low_accuracy_bonus: 0.0,
            slow_rt_threshold: 1.5,
            slow_rt_bonus: 0.4,
            slow_accurate_accuracy: 0.9,
            slow_accurate_rt: 1.8,
            slow_accurate_bonus: 0.3,
            variance_threshold: 0.4,
            variance_bonus: 0.5,
            high_variance_threshold: None,
            high_variance_bonus: 0.0,
            score_ceiling: Some(1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistractorStrategy {
    /// Swap every occurrence of the focus letter present in the word.
    ReplaceFocusLetter,
    /// Swap a leading b/d/p/q, otherwise change the final letter.
    LeadingLetter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub min_word_len: usize,
    pub max_word_len: usize,
    pub timeout: Duration,
    pub temperature: Option<f64>,
    pub distractor: DistractorStrategy,
}

impl GenerationConfig {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Strict => Self {
                min_word_len: 3,
                max_word_len: 5,
                timeout: Duration::from_secs(5),
                temperature: None,
                distractor: DistractorStrategy::ReplaceFocusLetter,
            },
            Variant::Generalized => Self {
                min_word_len: 3,
                max_word_len: 5,
                timeout: Duration::from_secs(3),
                temperature: Some(0.8),
                distractor: DistractorStrategy::LeadingLetter,
            },
        }
    }

    pub fn accepts_len(&self, len: usize) -> bool {
        (self.min_word_len..=self.max_word_len).contains(&len)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub variant: Variant,
    pub max_trials: usize,
    pub shuffle_baseline: bool,
}

impl SessionConfig {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Strict => Self {
                variant,
                max_trials: DEFAULT_MAX_TRIALS,
                shuffle_baseline: false,
            },
            Variant::Generalized => Self {
                variant,
                max_trials: DEFAULT_MAX_TRIALS,
                shuffle_baseline: true,
            },
        }
    }

    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials;
        self
    }
}

/// Everything variant-specific the engine needs, bundled.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub scoring: ScoringRules,
    pub generation: GenerationConfig,
    pub session: SessionConfig,
}

impl EngineConfig {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            scoring: ScoringRules::for_variant(variant),
            generation: GenerationConfig::for_variant(variant),
            session: SessionConfig::for_variant(variant),
        }
    }

    pub fn variant(&self) -> Variant {
        self.session.variant
    }
}
