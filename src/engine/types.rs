use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Screening test: fixed confusable words, multi-issue labels.
    #[default]
    Strict,
    /// Pinpointing test: single primary risk steers the next trial.
    Generalized,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Generalized => "generalized",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" | "test1" => Some(Self::Strict),
            "generalized" | "test2" => Some(Self::Generalized),
            _ => None,
        }
    }
}

/// One recorded trial outcome. Reaction time is in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResponse {
    #[serde(alias = "audio", alias = "text_word", alias = "audio_word")]
    pub target_word: String,
    #[serde(alias = "selected", default)]
    pub selected_word: String,
    pub correct: bool,
    pub reaction_time: f64,
}

impl TrialResponse {
    pub fn new(
        target_word: impl Into<String>,
        selected_word: impl Into<String>,
        correct: bool,
        reaction_time: f64,
    ) -> Self {
        Self {
            target_word: target_word.into(),
            selected_word: selected_word.into(),
            correct,
            reaction_time: reaction_time.max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    Phonological,
    Fluency,
    Attention,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 3] = [Self::Phonological, Self::Fluency, Self::Attention];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phonological => "phonological",
            Self::Fluency => "fluency",
            Self::Attention => "attention",
        }
    }

    /// Descriptive issue name used by the strict labels.
    pub fn issue_label(&self) -> &'static str {
        match self {
            Self::Phonological => "phonological (b/d risk)",
            Self::Fluency => "reading fluency risk",
            Self::Attention => "attention instability",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskScores {
    pub phonological: f64,
    pub fluency: f64,
    pub attention: f64,
}

impl RiskScores {
    pub fn get(&self, category: RiskCategory) -> f64 {
        match category {
            RiskCategory::Phonological => self.phonological,
            RiskCategory::Fluency => self.fluency,
            RiskCategory::Attention => self.attention,
        }
    }

    pub fn max(&self) -> f64 {
        self.phonological.max(self.fluency).max(self.attention)
    }

    /// First category holding the maximum score, `None` when every score is zero.
    pub fn primary(&self) -> Option<RiskCategory> {
        let max = self.max();
        if max <= 0.0 {
            return None;
        }
        RiskCategory::ALL
            .into_iter()
            .find(|category| self.get(*category) == max)
    }

    pub fn clamped(&self, ceiling: f64) -> Self {
        Self {
            phonological: self.phonological.min(ceiling),
            fluency: self.fluency.min(ceiling),
            attention: self.attention.min(ceiling),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskLength {
    Short,
    #[default]
    Normal,
}

impl TaskLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Normal => "normal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Variable,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Variable => "variable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PromptHints {
    #[serde(default)]
    pub target_phonemes: BTreeSet<char>,
    #[serde(default)]
    pub task_length: TaskLength,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl PromptHints {
    pub fn with_phonemes(letters: &[char]) -> Self {
        Self {
            target_phonemes: letters.iter().copied().collect(),
            ..Default::default()
        }
    }
}

/// Confusable letter pair probed by a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Focus {
    #[serde(rename = "b/d")]
    BD,
    #[serde(rename = "p/q")]
    PQ,
}

impl Focus {
    pub const ALL: [Focus; 2] = [Self::BD, Self::PQ];
    pub const DEFAULT: Focus = Self::BD;

    pub fn letters(&self) -> (char, char) {
        match self {
            Self::BD => ('b', 'd'),
            Self::PQ => ('p', 'q'),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::BD => 0,
            Self::PQ => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BD => "b/d",
            Self::PQ => "p/q",
        }
    }

    /// Exact-set match on the hinted letters; anything else maps to the default.
    pub fn infer(hints: &PromptHints) -> Self {
        Self::ALL
            .into_iter()
            .find(|focus| {
                let (a, b) = focus.letters();
                hints.target_phonemes.len() == 2
                    && hints.target_phonemes.contains(&a)
                    && hints.target_phonemes.contains(&b)
            })
            .unwrap_or(Self::DEFAULT)
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPair {
    pub audio_word: String,
    pub options: [String; 2],
    pub correct_index: usize,
}

impl TrialPair {
    /// Builds a pair from a fixed option order; `None` when the word is not an option.
    pub fn new(audio_word: impl Into<String>, options: [String; 2]) -> Option<Self> {
        let audio_word = audio_word.into();
        let correct_index = options.iter().position(|o| *o == audio_word)?;
        Some(Self {
            audio_word,
            options,
            correct_index,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.correct_index < 2 && self.options[self.correct_index] == self.audio_word
    }

    pub fn distractor(&self) -> &str {
        &self.options[1 - self.correct_index.min(1)]
    }

    /// Same pair with options in the opposite order.
    pub fn swapped(&self) -> Self {
        let [first, second] = self.options.clone();
        Self {
            audio_word: self.audio_word.clone(),
            options: [second, first],
            correct_index: 1 - self.correct_index.min(1),
        }
    }
}

/// Words already presented in a session. Membership is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    words: BTreeSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: &str) {
        let word = word.trim().to_lowercase();
        if !word.is_empty() {
            self.words.insert(word);
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a str> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for word in iter {
            set.insert(word);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assessment {
    InsufficientData,
    NoSignificantIssue,
    /// Exactly one category cleared the suspect threshold (strict labels).
    Suspected(RiskCategory),
    MultipleIssues,
    /// Primary-risk label (generalized labels).
    Primary(RiskCategory),
}

impl Assessment {
    pub fn label(&self) -> String {
        match self {
            Self::InsufficientData => "insufficient data".to_string(),
            Self::NoSignificantIssue => "no significant issue detected".to_string(),
            Self::Suspected(category) => format!("suspected {}", category.issue_label()),
            Self::MultipleIssues => "multiple suspected issues detected".to_string(),
            Self::Primary(category) => format!("suspected {}", category.as_str()),
        }
    }

    /// Anything other than a clean result keeps the adaptive loop running.
    pub fn needs_more_trials(&self) -> bool {
        !matches!(self, Self::NoSignificantIssue)
    }
}

impl Serialize for Assessment {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub accuracy: f64,
    pub avg_reaction_time: f64,
    pub variance_reaction_time: f64,
    pub risk_scores: RiskScores,
    pub assessment: Assessment,
    pub prompt_hints: PromptHints,
}

impl Analysis {
    pub fn neutral() -> Self {
        Self {
            accuracy: 0.0,
            avg_reaction_time: 0.0,
            variance_reaction_time: 0.0,
            risk_scores: RiskScores::default(),
            assessment: Assessment::InsufficientData,
            prompt_hints: PromptHints::default(),
        }
    }
}
