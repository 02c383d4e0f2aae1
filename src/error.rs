use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("SECRET_KEY must be at least 32 bytes long")]
    WeakSecretKey,

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(Box::new(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        error!(error = %self, "unhandled request error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Internal Server Error</h1><p>An internal server error occurred.</p>"),
        )
            .into_response()
    }
}
