use super::types::{TrialPair, Variant};

const STRICT_BASELINE: [(&str, [&str; 2]); 6] = [
    ("bed", ["bed", "ded"]),
    ("dad", ["bad", "dad"]),
    ("bad", ["bad", "dad"]),
    ("pat", ["qat", "pat"]),
    ("dog", ["dog", "bog"]),
    ("bug", ["dug", "bug"]),
];

const GENERALIZED_BASELINE: [(&str, [&str; 2]); 4] = [
    ("bear", ["bear", "dear"]),
    ("dog", ["bog", "dog"]),
    ("pen", ["pen", "qen"]),
    ("bat", ["dat", "bat"]),
];

/// Pre-authored, non-adaptive trials for a variant, in presentation order.
pub fn baseline_pairs(variant: Variant) -> Vec<TrialPair> {
    let table: &[(&str, [&str; 2])] = match variant {
        Variant::Strict => &STRICT_BASELINE,
        Variant::Generalized => &GENERALIZED_BASELINE,
    };

    table
        .iter()
        .map(|(word, options)| TrialPair {
            audio_word: word.to_string(),
            correct_index: if options[0] == *word { 0 } else { 1 },
            options: options.map(str::to_string),
        })
        .collect()
}
