use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::balance::BalanceError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set when using MongoDB storage")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("in-memory store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} {1} not found")]
    NotFound(&'static str, String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Balance(#[from] BalanceError),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(..) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Balance(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ServiceError::Store(err) => {
                tracing::error!(error = %err, "storage failure");
                "An internal storage error occurred".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
