pub mod cache_service;
pub mod metric_aggregator;
pub mod score_calculator;
pub mod score_engine;
pub mod score_validator;
