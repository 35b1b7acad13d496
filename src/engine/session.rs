use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::analyzer::ResponseAnalyzer;
use super::baseline::baseline_pairs;
use super::config::{EngineConfig, SessionConfig};
use super::fallback::FallbackPool;
use super::generator::{TrialGenerator, TrialOrigin};
use super::types::{Analysis, ExclusionSet, TrialPair, TrialResponse, Variant};
use crate::services::word_source::WordSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Baseline,
    Adaptive,
    Done,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Adaptive => "adaptive",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NextTrial {
    pub trial: TrialPair,
    pub origin: TrialOrigin,
    pub analysis: Analysis,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum SessionStep {
    Baseline { index: usize, trial: TrialPair },
    Adaptive(NextTrial),
    Done { analysis: Analysis },
}

impl SessionStep {
    pub fn phase(&self) -> SessionPhase {
        match self {
            Self::Baseline { .. } => SessionPhase::Baseline,
            Self::Adaptive(_) => SessionPhase::Adaptive,
            Self::Done { .. } => SessionPhase::Done,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Answer {
    pub selected_index: usize,
    /// Seconds.
    pub reaction_time: f64,
}

/// Whoever answers the trials: a UI, a script, a simulation.
pub trait Examinee {
    fn respond(&mut self, trial: &TrialPair) -> Answer;
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    pub variant: Variant,
    pub responses: Vec<TrialResponse>,
    pub analysis: Analysis,
    pub generated_trials: usize,
    pub fallback_trials: usize,
}

/// Baseline phase, then a bounded adaptive loop. Holds no per-session state:
/// every decision is recomputed from the caller's response history.
pub struct SessionController<S> {
    analyzer: ResponseAnalyzer,
    generator: TrialGenerator<S>,
    config: SessionConfig,
    baseline: Vec<TrialPair>,
}

impl<S: WordSource> SessionController<S> {
    /// A `max_trials` shorter than the baseline is raised to the baseline length.
    pub fn new(
        analyzer: ResponseAnalyzer,
        generator: TrialGenerator<S>,
        mut config: SessionConfig,
        baseline: Vec<TrialPair>,
    ) -> Self {
        if config.max_trials < baseline.len() {
            warn!(
                variant = config.variant.as_str(),
                max_trials = config.max_trials,
                baseline = baseline.len(),
                "max trials below baseline length, raising it"
            );
            config.max_trials = baseline.len();
        }
        Self {
            analyzer,
            generator,
            config,
            baseline,
        }
    }

    pub fn from_config(source: S, config: EngineConfig, pool: FallbackPool) -> Self {
        let variant = config.variant();
        Self::new(
            ResponseAnalyzer::new(config.scoring),
            TrialGenerator::new(source, pool, config.generation),
            config.session,
            baseline_pairs(variant),
        )
    }

    pub fn for_variant(source: S, variant: Variant) -> Self {
        Self::from_config(source, EngineConfig::for_variant(variant), FallbackPool::default())
    }

    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    pub fn max_trials(&self) -> usize {
        self.config.max_trials
    }

    pub fn baseline_len(&self) -> usize {
        self.baseline.len()
    }

    pub fn baseline(&self) -> Vec<TrialPair> {
        (0..self.baseline_len())
            .filter_map(|index| self.baseline_trial(index))
            .collect()
    }

    pub fn baseline_trial(&self, index: usize) -> Option<TrialPair> {
        let pair = self.baseline.get(index)?;
        if self.config.shuffle_baseline && rand::rng().random_bool(0.5) {
            Some(pair.swapped())
        } else {
            Some(pair.clone())
        }
    }

    pub fn analyze(&self, history: &[TrialResponse]) -> Analysis {
        self.analyzer.analyze(history)
    }

    /// Baseline words plus every word already answered.
    pub fn exclusion_set(&self, history: &[TrialResponse]) -> ExclusionSet {
        self.baseline
            .iter()
            .map(|p| p.audio_word.as_str())
            .chain(history.iter().map(|r| r.target_word.as_str()))
            .collect()
    }

    pub fn phase(&self, history: &[TrialResponse], analysis: &Analysis) -> SessionPhase {
        if history.len() < self.baseline_len() {
            SessionPhase::Baseline
        } else if history.len() < self.config.max_trials
            && analysis.assessment.needs_more_trials()
        {
            SessionPhase::Adaptive
        } else {
            SessionPhase::Done
        }
    }

    /// Analyzes the history and produces one more generated trial, unconditionally.
    pub async fn next_trial(&self, history: &[TrialResponse]) -> NextTrial {
        let analysis = self.analyze(history);
        let exclude = self.exclusion_set(history);
        let generated = self.generator.generate(&analysis.prompt_hints, &exclude).await;

        NextTrial {
            trial: generated.trial,
            origin: generated.origin,
            analysis,
        }
    }

    pub async fn step(&self, history: &[TrialResponse]) -> SessionStep {
        if let Some(trial) = self.baseline_trial(history.len()) {
            return SessionStep::Baseline {
                index: history.len(),
                trial,
            };
        }

        let analysis = self.analyze(history);
        match self.phase(history, &analysis) {
            SessionPhase::Adaptive => SessionStep::Adaptive(self.next_trial(history).await),
            _ => SessionStep::Done { analysis },
        }
    }

    pub async fn run<E: Examinee>(&self, examinee: &mut E) -> SessionOutcome {
        let mut responses = Vec::with_capacity(self.config.max_trials);

        for trial in self.baseline() {
            let answer = examinee.respond(&trial);
            responses.push(record(&trial, answer));
        }

        let mut analysis = self.analyze(&responses);
        info!(
            variant = self.variant().as_str(),
            trials = responses.len(),
            assessment = %analysis.assessment,
            "baseline complete"
        );

        let mut generated_trials = 0;
        let mut fallback_trials = 0;

        while responses.len() < self.config.max_trials && analysis.assessment.needs_more_trials() {
            let exclude = self.exclusion_set(&responses);
            let generated = self
                .generator
                .generate(&analysis.prompt_hints, &exclude)
                .await;
            match generated.origin {
                TrialOrigin::Generated => generated_trials += 1,
                TrialOrigin::Fallback => fallback_trials += 1,
            }

            let answer = examinee.respond(&generated.trial);
            responses.push(record(&generated.trial, answer));

            analysis = self.analyze(&responses);
            debug!(
                trial = responses.len(),
                word = %generated.trial.audio_word,
                assessment = %analysis.assessment,
                "adaptive step"
            );
        }

        info!(
            trials = responses.len(),
            generated_trials,
            fallback_trials,
            assessment = %analysis.assessment,
            "session finished"
        );

        SessionOutcome {
            variant: self.variant(),
            responses,
            analysis,
            generated_trials,
            fallback_trials,
        }
    }
}

pub fn record(trial: &TrialPair, answer: Answer) -> TrialResponse {
    let index = answer.selected_index.min(1);
    TrialResponse::new(
        trial.audio_word.clone(),
        trial.options[index].clone(),
        index == trial.correct_index,
        answer.reaction_time,
    )
}
