use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::word_source::WordSource;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LiveResponse {
    status: &'static str,
    service: &'static str,
    start_time: String,
    uptime: u64,
    timestamp: String,
}

pub(super) async fn live<S: WordSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<LiveResponse> {
    let started: DateTime<Utc> = state.started_at_system().into();
    Json(LiveResponse {
        status: "ok",
        service: "minpair-backend",
        start_time: started.to_rfc3339(),
        uptime: state.uptime_seconds(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
