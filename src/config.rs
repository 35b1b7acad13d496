use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::config::{EngineConfig, DEFAULT_MAX_TRIALS};
use crate::engine::types::Variant;
use crate::services::word_source::WordSourceConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Daily rolling log files go here when set.
    pub log_dir: Option<PathBuf>,
    pub word_source: WordSourceConfig,
    pub max_trials: usize,
    /// Replaces the per-variant generation timeout when set.
    pub generation_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(5000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let file_logs = std::env::var("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let log_dir = file_logs.then(|| {
            std::env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./logs"))
        });

        let max_trials = std::env::var("SESSION_MAX_TRIALS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_MAX_TRIALS);

        let generation_timeout = std::env::var("WORD_SOURCE_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis);

        Self {
            host,
            port,
            log_level,
            log_dir,
            word_source: WordSourceConfig::from_env(),
            max_trials,
            generation_timeout,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn engine_config(&self, variant: Variant) -> EngineConfig {
        let mut config = EngineConfig::for_variant(variant);
        config.session.max_trials = self.max_trials;
        if let Some(timeout) = self.generation_timeout {
            config.generation.timeout = timeout;
        }
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5000,
            log_level: "info".to_string(),
            log_dir: None,
            word_source: WordSourceConfig::default(),
            max_trials: DEFAULT_MAX_TRIALS,
            generation_timeout: None,
        }
    }
}
