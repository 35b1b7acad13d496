use std::collections::BTreeMap;

use rand::seq::IndexedRandom;
use rand::Rng;
use thiserror::Error;

use super::types::{ExclusionSet, Focus, TrialPair};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("fallback pool has no pair for focus {0}")]
    MissingFocus(Focus),
    #[error("fallback pair for {focus} is inconsistent: {word} is not at its correct index")]
    InvalidPair { focus: Focus, word: String },
}

#[derive(Debug, Clone)]
struct FocusEntries {
    primary: TrialPair,
    alternatives: Vec<TrialPair>,
}

impl FocusEntries {
    fn iter(&self) -> impl Iterator<Item = &TrialPair> {
        std::iter::once(&self.primary).chain(self.alternatives.iter())
    }
}

/// Pre-validated minimal pairs per focus, used whenever generation fails.
///
/// A pool always holds at least one valid pair for every [`Focus`], so lookups
/// cannot fail once constructed.
#[derive(Debug, Clone)]
pub struct FallbackPool {
    entries: [FocusEntries; 2],
}

impl FallbackPool {
    pub fn new(pairs: impl IntoIterator<Item = (Focus, TrialPair)>) -> Result<Self, PoolError> {
        let mut grouped: BTreeMap<Focus, Vec<TrialPair>> = BTreeMap::new();
        for (focus, pair) in pairs {
            if !pair.is_valid() {
                return Err(PoolError::InvalidPair {
                    focus,
                    word: pair.audio_word,
                });
            }
            grouped.entry(focus).or_default().push(pair);
        }

        let mut take = |focus: Focus| -> Result<FocusEntries, PoolError> {
            let mut pairs = grouped.remove(&focus).unwrap_or_default().into_iter();
            let primary = pairs.next().ok_or(PoolError::MissingFocus(focus))?;
            Ok(FocusEntries {
                primary,
                alternatives: pairs.collect(),
            })
        };

        Ok(Self {
            entries: [take(Focus::BD)?, take(Focus::PQ)?],
        })
    }

    fn entries(&self, focus: Focus) -> &FocusEntries {
        &self.entries[focus.index()]
    }

    pub fn pairs(&self, focus: Focus) -> Vec<&TrialPair> {
        self.entries(focus).iter().collect()
    }

    /// Picks an unused pair for `focus`, or the focus's primary pair when all are used.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        focus: Focus,
        exclude: &ExclusionSet,
        rng: &mut R,
    ) -> TrialPair {
        let entries = self.entries(focus);
        let unused: Vec<&TrialPair> = entries
            .iter()
            .filter(|p| !exclude.contains(&p.audio_word))
            .collect();

        match unused.choose(rng) {
            Some(pair) => (*pair).clone(),
            None => {
                tracing::warn!(%focus, word = %entries.primary.audio_word, "every fallback word already used");
                entries.primary.clone()
            }
        }
    }
}

fn static_pair(word: &str, options: [&str; 2]) -> TrialPair {
    TrialPair {
        audio_word: word.to_string(),
        correct_index: if options[0] == word { 0 } else { 1 },
        options: options.map(str::to_string),
    }
}

impl Default for FallbackPool {
    fn default() -> Self {
        Self {
            entries: [
                FocusEntries {
                    primary: static_pair("bed", ["bed", "ded"]),
                    alternatives: vec![
                        static_pair("bear", ["bear", "dear"]),
                        static_pair("deal", ["beal", "deal"]),
                        static_pair("bad", ["bad", "dad"]),
                    ],
                },
                FocusEntries {
                    primary: static_pair("pat", ["pat", "qat"]),
                    alternatives: vec![
                        static_pair("pear", ["qear", "pear"]),
                        static_pair("pin", ["pin", "qin"]),
                        static_pair("pot", ["qot", "pot"]),
                    ],
                },
            ],
        }
    }
}
