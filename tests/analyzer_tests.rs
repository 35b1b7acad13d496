use minpair_backend::engine::analyzer::ResponseAnalyzer;
use minpair_backend::engine::types::{
    Assessment, Difficulty, RiskCategory, TaskLength, TrialResponse, Variant,
};

mod common;

use common::response;

fn history(words: &[&str], correct: bool, rts: &[f64]) -> Vec<TrialResponse> {
    words
        .iter()
        .zip(rts)
        .map(|(w, rt)| response(w, correct, *rt))
        .collect()
}

#[test]
fn all_correct_and_quick_is_clean() {
    let analyzer = ResponseAnalyzer::for_variant(Variant::Strict);
    let responses = history(
        &["bed", "dad", "bad", "pat", "dog"],
        true,
        &[0.9, 1.0, 0.8, 1.1, 0.9],
    );

    let analysis = analyzer.analyze(&responses);

    assert_eq!(analysis.accuracy, 1.0);
    assert!((analysis.avg_reaction_time - 0.94).abs() < 1e-9);
    assert!((analysis.variance_reaction_time - 0.0104).abs() < 1e-3);
    assert_eq!(analysis.risk_scores.phonological, 0.0);
    assert_eq!(analysis.risk_scores.fluency, 0.0);
    assert_eq!(analysis.risk_scores.attention, 0.0);
    assert_eq!(analysis.assessment, Assessment::NoSignificantIssue);
    assert_eq!(analysis.assessment.label(), "no significant issue detected");
    assert!(analysis.prompt_hints.target_phonemes.is_empty());
    assert_eq!(analysis.prompt_hints.task_length, TaskLength::Normal);
    assert_eq!(analysis.prompt_hints.difficulty, Difficulty::Normal);
}

#[test]
fn repeated_confusable_errors_flag_phonological_risk() {
    let analyzer = ResponseAnalyzer::for_variant(Variant::Strict);
    let responses = history(&["bed", "bed", "bed"], false, &[2.0, 2.1, 1.9]);

    let analysis = analyzer.analyze(&responses);

    assert!(analysis.risk_scores.phonological >= 0.5);
    assert!((analysis.risk_scores.phonological - 0.8).abs() < 1e-9);
    assert!((analysis.risk_scores.fluency - 0.4).abs() < 1e-9);
    assert_eq!(analysis.risk_scores.attention, 0.0);
    assert!(analysis.prompt_hints.target_phonemes.contains(&'b'));
    assert!(analysis.prompt_hints.target_phonemes.contains(&'d'));
    assert_eq!(
        analysis.assessment,
        Assessment::Suspected(RiskCategory::Phonological)
    );
    assert!(analysis.assessment.label().contains("phonological"));
}

#[test]
fn single_confusable_error_is_not_enough_in_strict() {
    let analyzer = ResponseAnalyzer::for_variant(Variant::Strict);
    let mut responses = history(&["dog", "pat", "bug", "cat", "sun"], true, &[1.0; 5]);
    responses.push(response("bed", false, 1.0));

    let analysis = analyzer.analyze(&responses);

    // 5/6 correct keeps accuracy above 0.8 and one error is below the count floor
    assert_eq!(analysis.risk_scores.phonological, 0.0);
    assert_eq!(analysis.assessment, Assessment::NoSignificantIssue);
}

#[test]
fn strict_multiple_issues_when_two_categories_clear_threshold() {
    let analyzer = ResponseAnalyzer::for_variant(Variant::Strict);
    // wrong on confusable words, slow and erratic
    let responses = history(&["bed", "dad", "bad", "bed"], false, &[0.5, 3.5, 0.6, 3.4]);

    let analysis = analyzer.analyze(&responses);

    assert!(analysis.risk_scores.phonological >= 0.5);
    assert!(analysis.risk_scores.attention >= 0.5);
    assert_eq!(analysis.assessment, Assessment::MultipleIssues);
    assert_eq!(analysis.assessment.label(), "multiple suspected issues detected");
    assert_eq!(analysis.prompt_hints.task_length, TaskLength::Short);
}

#[test]
fn generalized_labels_primary_risk_below_suspect_threshold() {
    let analyzer = ResponseAnalyzer::for_variant(Variant::Generalized);
    let responses = history(&["cat", "sun", "map", "hat"], true, &[1.6, 1.6, 1.6, 1.6]);

    let analysis = analyzer.analyze(&responses);

    assert!((analysis.risk_scores.fluency - 0.4).abs() < 1e-9);
    assert_eq!(analysis.assessment.label(), "suspected fluency");
    assert_eq!(analysis.prompt_hints.difficulty, Difficulty::Hard);
}

#[test]
fn generalized_phonological_hints_broaden_letters() {
    let analyzer = ResponseAnalyzer::for_variant(Variant::Generalized);
    let responses = vec![
        response("bear", false, 1.0),
        response("dog", true, 1.0),
        response("pen", true, 1.0),
        response("bat", true, 1.0),
    ];

    let analysis = analyzer.analyze(&responses);

    assert_eq!(analysis.assessment, Assessment::Primary(RiskCategory::Phonological));
    let letters: Vec<char> = analysis.prompt_hints.target_phonemes.iter().copied().collect();
    assert_eq!(letters, vec!['b', 'd', 'p', 'q']);
}

#[test]
fn repeated_calls_do_not_accumulate() {
    let analyzer = ResponseAnalyzer::for_variant(Variant::Generalized);
    let responses = history(&["bed", "dad"], false, &[1.0, 1.2]);

    let first = analyzer.analyze(&responses);
    let second = analyzer.analyze(&responses);

    assert_eq!(first, second);
}

#[test]
fn growing_history_is_rescored_from_scratch() {
    let analyzer = ResponseAnalyzer::for_variant(Variant::Strict);
    let mut responses = history(&["bed", "dad"], false, &[1.0, 1.0]);
    let flagged = analyzer.analyze(&responses);
    assert_eq!(flagged.assessment, Assessment::Suspected(RiskCategory::Phonological));

    for word in ["cat", "sun", "map", "hat", "pen", "top", "fig", "jam"] {
        responses.push(response(word, true, 1.0));
    }
    let analysis = analyzer.analyze(&responses);

    // two confusable errors still count, accuracy recovered to 0.8
    assert!((analysis.risk_scores.phonological - 0.5).abs() < 1e-9);
    assert_eq!(analysis.accuracy, 0.8);
}
