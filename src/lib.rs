pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{EngineError, EngineResult};
pub use models::analytics::MonthlyAnalytics;
pub use models::metrics::{ActivityLogEntry, ActivityType, MonthlyMetrics, QualityMetric};
pub use models::score::{
    MonthProgress, MonthlyScore, ScoreBreakdown, ScoreHistoryEntry, ScoreRequirements, ScoreTier,
};
pub use models::sources::DataSources;
pub use services::cache_service::{CacheKey, EngineCache, InMemoryCache};
pub use services::score_engine::{EngineConfig, ScoreEngine};
