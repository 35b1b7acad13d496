pub mod config;
pub mod engine;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod simulation;
pub mod state;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::services::word_source::{OllamaWordSource, WordSource};
use crate::state::AppState;

/// Full HTTP app over an arbitrary word source.
pub fn app_with_source<S: WordSource + Clone + 'static>(source: S, config: &Config) -> axum::Router {
    routes::router(AppState::new(source, config))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub fn create_app(config: &Config) -> axum::Router {
    app_with_source(OllamaWordSource::new(config.word_source.clone()), config)
}
