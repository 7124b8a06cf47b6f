pub mod analytics;
pub mod metrics;
pub mod score;
pub mod sources;
