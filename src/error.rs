use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid month identifier: {0}")]
    InvalidMonthId(String),

    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("data source '{name}' failed: {message}")]
    DataSource { name: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl EngineError {
    pub fn invalid_month_id(month_id: impl Into<String>) -> Self {
        let month_id = month_id.into();
        warn!(target: "engine::month", %month_id, "invalid month identifier");
        EngineError::InvalidMonthId(month_id)
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "engine::validation", %message, details = %details, "validation error with details");
        EngineError::Validation {
            message,
            details: Some(details),
        }
    }

    pub fn data_source(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();
        warn!(target: "engine::sources", source = %name, %message, "data source error");
        EngineError::DataSource { name, message }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "engine::other", %message, "engine error");
        EngineError::Other(message)
    }
}
