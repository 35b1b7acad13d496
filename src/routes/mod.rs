mod assessment;
mod health;

use axum::http::Uri;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;

use crate::response::AppError;
use crate::services::word_source::WordSource;
use crate::state::AppState;

pub fn router<S: WordSource + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health::live::<S>))
        .route("/baseline", get(assessment::strict_baseline::<S>))
        .route("/next-trial", post(assessment::strict_next_trial::<S>))
        .route("/test2/baseline", get(assessment::generalized_baseline::<S>))
        .route("/test2/adaptive", post(assessment::generalized_adaptive::<S>))
        .route("/test2/trial", post(assessment::generalized_step::<S>))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler(uri: Uri) -> impl IntoResponse {
    AppError::not_found(format!("no route for {}", uri.path()))
}
