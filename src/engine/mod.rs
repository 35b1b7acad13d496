pub mod analyzer;
pub mod baseline;
pub mod config;
pub mod fallback;
pub mod generator;
pub mod session;
pub mod types;

pub use analyzer::ResponseAnalyzer;
pub use config::EngineConfig;
pub use fallback::FallbackPool;
pub use generator::TrialGenerator;
pub use session::SessionController;
pub use types::*;
