use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::engine::fallback::FallbackPool;
use crate::engine::session::SessionController;
use crate::engine::types::Variant;
use crate::services::word_source::WordSource;

/// Shared, read-only handles. Nothing here changes after start-up.
pub struct AppState<S> {
    strict: Arc<SessionController<S>>,
    generalized: Arc<SessionController<S>>,
    started_at: Instant,
    started_at_system: SystemTime,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            strict: Arc::clone(&self.strict),
            generalized: Arc::clone(&self.generalized),
            started_at: self.started_at,
            started_at_system: self.started_at_system,
        }
    }
}

impl<S: WordSource + Clone> AppState<S> {
    pub fn new(source: S, config: &Config) -> Self {
        let strict = SessionController::from_config(
            source.clone(),
            config.engine_config(Variant::Strict),
            FallbackPool::default(),
        );
        let generalized = SessionController::from_config(
            source,
            config.engine_config(Variant::Generalized),
            FallbackPool::default(),
        );
        Self::from_controllers(strict, generalized)
    }
}

impl<S: WordSource> AppState<S> {
    pub fn from_controllers(
        strict: SessionController<S>,
        generalized: SessionController<S>,
    ) -> Self {
        Self {
            strict: Arc::new(strict),
            generalized: Arc::new(generalized),
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
        }
    }

    pub fn controller(&self, variant: Variant) -> &SessionController<S> {
        match variant {
            Variant::Strict => &self.strict,
            Variant::Generalized => &self.generalized,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }
}
