// Library interface for the pulseparse metrics engine
// The CLI binary and integration tests both build on these modules

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod import;
pub mod index;
pub mod load;
pub mod logging;
pub mod models;
pub mod readiness;
pub mod zones;

// Re-export commonly used types for convenience
pub use config::MetricsConfig;
pub use engine::{AthleteContext, MetricsEngine, MetricsReport};
pub use error::{MetricsError, Result};
pub use index::{TrainingIndexCalculator, TrendAnalysis, TrendDirection};
pub use load::{LoadCalculator, LoadConfig};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::{
    Confidence, DailySample, HeartRateZone, LoadRatio, ReadinessScore, TrainingIndexPoint,
};
pub use readiness::{ReadinessCalculator, ReadinessConfig};
pub use zones::{estimate_max_hr_from_age, ZoneCalculator, ZoneConfig};
