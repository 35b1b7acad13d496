use rand::Rng;
use serde::Serialize;
use tracing::{debug, warn};

use super::config::{DistractorStrategy, GenerationConfig};
use super::fallback::FallbackPool;
use super::types::{ExclusionSet, Focus, PromptHints, TrialPair, Variant};
use crate::services::word_source::{GenerationError, WordRequest, WordSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialOrigin {
    Generated,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedTrial {
    pub trial: TrialPair,
    pub focus: Focus,
    pub origin: TrialOrigin,
}

/// Turns prompt hints into the next minimal-pair trial.
///
/// Generation never fails from the caller's side: unavailable or unusable
/// generator output degrades to the fallback pool.
pub struct TrialGenerator<S> {
    source: S,
    pool: FallbackPool,
    config: GenerationConfig,
}

impl<S: WordSource> TrialGenerator<S> {
    pub fn new(source: S, pool: FallbackPool, config: GenerationConfig) -> Self {
        Self {
            source,
            pool,
            config,
        }
    }

    pub fn for_variant(source: S, variant: Variant) -> Self {
        Self::new(
            source,
            FallbackPool::default(),
            GenerationConfig::for_variant(variant),
        )
    }

    pub async fn generate_trial(&self, hints: &PromptHints, exclude: &ExclusionSet) -> TrialPair {
        self.generate(hints, exclude).await.trial
    }

    pub async fn generate(&self, hints: &PromptHints, exclude: &ExclusionSet) -> GeneratedTrial {
        let focus = Focus::infer(hints);
        let prompt = build_prompt(focus, hints, exclude, &self.config);

        match self.request_word(&prompt, exclude).await {
            Ok(word) => {
                if exclude.contains(&word) {
                    warn!(%word, %focus, "generated word was already presented, keeping it");
                }
                let distractor = make_distractor(&word, focus, self.config.distractor);
                debug!(%word, %distractor, %focus, "generated trial");
                let trial = shuffled_pair(word, distractor, &mut rand::rng());
                GeneratedTrial {
                    trial,
                    focus,
                    origin: TrialOrigin::Generated,
                }
            }
            Err(e) => {
                warn!(%focus, error = %e, "word generation failed, using fallback pair");
                let trial = self.pool.pick(focus, exclude, &mut rand::rng());
                GeneratedTrial {
                    trial,
                    focus,
                    origin: TrialOrigin::Fallback,
                }
            }
        }
    }

    async fn request_word(
        &self,
        prompt: &str,
        exclude: &ExclusionSet,
    ) -> Result<String, GenerationError> {
        let request = WordRequest {
            prompt,
            excluded: exclude,
            temperature: self.config.temperature,
        };

        let raw = tokio::time::timeout(self.config.timeout, self.source.propose(&request))
            .await
            .map_err(|_| GenerationError::Timeout(self.config.timeout))??;

        sanitize_word(&raw, &self.config)
    }
}

pub fn build_prompt(
    focus: Focus,
    hints: &PromptHints,
    exclude: &ExclusionSet,
    config: &GenerationConfig,
) -> String {
    let letters: Vec<String> = if hints.target_phonemes.is_empty() {
        let (a, b) = focus.letters();
        vec![a.to_string(), b.to_string()]
    } else {
        hints.target_phonemes.iter().map(|c| c.to_string()).collect()
    };

    let mut prompt = format!(
        "Task: Generate ONE simple word for a sound-matching test.\n\
         \n\
         Constraints:\n\
         - Must contain one of these letters: {}\n\
         - Word length: {} to {} letters\n\
         - Child-friendly word\n\
         - Vocabulary difficulty: {}\n\
         - No punctuation\n",
        letters.join(", "),
        config.min_word_len,
        config.max_word_len,
        hints.difficulty.as_str(),
    );

    if !exclude.is_empty() {
        let used: Vec<&str> = exclude.iter().collect();
        prompt.push_str(&format!("- Do NOT use: {}\n", used.join(", ")));
    }

    prompt.push_str("Output ONLY the word.");
    prompt
}

/// Cleans raw generator text down to one lower-case word within the length bound.
///
/// Generators sometimes answer with a sentence, so the last in-range token wins.
pub fn sanitize_word(raw: &str, config: &GenerationConfig) -> Result<String, GenerationError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().all(|c| c.is_ascii_alphabetic()))
        .filter(|token| config.accepts_len(token.chars().count()))
        .last()
        .ok_or_else(|| GenerationError::Invalid(raw.trim().to_string()))
}

pub fn make_distractor(word: &str, focus: Focus, strategy: DistractorStrategy) -> String {
    match strategy {
        DistractorStrategy::ReplaceFocusLetter => {
            let (a, b) = focus.letters();
            if word.contains(a) {
                word.replace(a, &b.to_string())
            } else if word.contains(b) {
                word.replace(b, &a.to_string())
            } else {
                // neither letter present: put the focus letter up front
                let rest: String = word.chars().skip(1).collect();
                format!("{a}{rest}")
            }
        }
        DistractorStrategy::LeadingLetter => {
            let mut chars = word.chars();
            let Some(first) = chars.next() else {
                return "x".to_string();
            };
            let rest: String = chars.collect();
            match first {
                'b' => format!("d{rest}"),
                'd' => format!("b{rest}"),
                'p' => format!("q{rest}"),
                'q' => format!("p{rest}"),
                _ if rest.is_empty() => "x".to_string(),
                _ => {
                    let mut stem: String = word.chars().collect();
                    let last = stem.pop().unwrap_or('z');
                    stem.push(if last == 'z' { 's' } else { 'z' });
                    stem
                }
            }
        }
    }
}

fn shuffled_pair<R: Rng + ?Sized>(word: String, distractor: String, rng: &mut R) -> TrialPair {
    if rng.random_bool(0.5) {
        TrialPair {
            options: [word.clone(), distractor],
            audio_word: word,
            correct_index: 0,
        }
    } else {
        TrialPair {
            options: [distractor, word.clone()],
            audio_word: word,
            correct_index: 1,
        }
    }
}
