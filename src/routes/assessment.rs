use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::engine::generator::TrialOrigin;
use crate::engine::session::{NextTrial, SessionStep};
use crate::engine::types::{Analysis, PromptHints, RiskScores, TrialPair, TrialResponse, Variant};
use crate::response::{ok, AppError};
use crate::services::word_source::WordSource;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct HistoryBody {
    responses: Vec<TrialResponse>,
}

#[derive(Debug, Serialize)]
struct StatsDto {
    accuracy: f64,
    avg_reaction_time: f64,
    variance_reaction_time: f64,
}

#[derive(Debug, Serialize)]
struct AnalysisDto {
    assessment: String,
    prompt_hints: PromptHints,
    risk_scores: RiskScores,
    stats: StatsDto,
}

impl From<Analysis> for AnalysisDto {
    fn from(analysis: Analysis) -> Self {
        Self {
            assessment: analysis.assessment.label(),
            prompt_hints: analysis.prompt_hints,
            risk_scores: RiskScores {
                phonological: round2(analysis.risk_scores.phonological),
                fluency: round2(analysis.risk_scores.fluency),
                attention: round2(analysis.risk_scores.attention),
            },
            stats: StatsDto {
                accuracy: round2(analysis.accuracy),
                avg_reaction_time: round2(analysis.avg_reaction_time),
                variance_reaction_time: round2(analysis.variance_reaction_time),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct NextTrialDto {
    next_trial: TrialPair,
    origin: TrialOrigin,
    analysis: AnalysisDto,
}

impl From<NextTrial> for NextTrialDto {
    fn from(next: NextTrial) -> Self {
        Self {
            next_trial: next.trial,
            origin: next.origin,
            analysis: next.analysis.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StepDto {
    phase: &'static str,
    trial_number: usize,
    max_trials: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    trial: Option<TrialPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<TrialOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<AnalysisDto>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn parse_history(
    payload: Result<Json<HistoryBody>, JsonRejection>,
) -> Result<Vec<TrialResponse>, AppError> {
    let Json(body) = payload.map_err(|e| {
        AppError::bad_request(format!("missing or malformed 'responses' field: {e}"))
    })?;

    if let Some((index, _)) = body
        .responses
        .iter()
        .enumerate()
        .find(|(_, r)| !r.reaction_time.is_finite() || r.reaction_time < 0.0)
    {
        return Err(AppError::validation(format!(
            "responses[{index}].reaction_time must be a non-negative number"
        )));
    }

    Ok(body.responses)
}

fn baseline<S: WordSource>(state: &AppState<S>, variant: Variant) -> Response {
    ok(state.controller(variant).baseline()).into_response()
}

async fn next_trial<S: WordSource>(
    state: &AppState<S>,
    variant: Variant,
    payload: Result<Json<HistoryBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let history = parse_history(payload)?;
    let next = state.controller(variant).next_trial(&history).await;
    tracing::info!(
        variant = variant.as_str(),
        history = history.len(),
        word = %next.trial.audio_word,
        assessment = %next.analysis.assessment,
        "next trial served"
    );
    Ok(ok(NextTrialDto::from(next)).into_response())
}

pub(super) async fn strict_baseline<S: WordSource + 'static>(
    State(state): State<AppState<S>>,
) -> Response {
    baseline(&state, Variant::Strict)
}

pub(super) async fn strict_next_trial<S: WordSource + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<HistoryBody>, JsonRejection>,
) -> Result<Response, AppError> {
    next_trial(&state, Variant::Strict, payload).await
}

pub(super) async fn generalized_baseline<S: WordSource + 'static>(
    State(state): State<AppState<S>>,
) -> Response {
    baseline(&state, Variant::Generalized)
}

pub(super) async fn generalized_adaptive<S: WordSource + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<HistoryBody>, JsonRejection>,
) -> Result<Response, AppError> {
    next_trial(&state, Variant::Generalized, payload).await
}

pub(super) async fn generalized_step<S: WordSource + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<HistoryBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let history = parse_history(payload)?;
    let controller = state.controller(Variant::Generalized);
    let step = controller.step(&history).await;
    let phase = step.phase().as_str();

    let dto = match step {
        SessionStep::Baseline { index, trial } => StepDto {
            phase,
            trial_number: index + 1,
            max_trials: controller.max_trials(),
            trial: Some(trial),
            origin: None,
            analysis: None,
        },
        SessionStep::Adaptive(next) => StepDto {
            phase,
            trial_number: history.len() + 1,
            max_trials: controller.max_trials(),
            trial: Some(next.trial),
            origin: Some(next.origin),
            analysis: Some(next.analysis.into()),
        },
        SessionStep::Done { analysis } => StepDto {
            phase,
            trial_number: history.len(),
            max_trials: controller.max_trials(),
            trial: None,
            origin: None,
            analysis: Some(analysis.into()),
        },
    };

    Ok(ok(dto).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.94), 0.94);
        assert_eq!(round2(0.0133333), 0.01);
        assert_eq!(round2(1.005_1), 1.01);
    }
}
