use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use db::models::ModelError;
use thiserror::Error;
use tracing::error;

/// Error surface of the API. Bodies are plain text; entity payloads
/// only appear on success.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal error")]
    Internal,
}

impl ApiError {
    /// Log a storage failure under its operation tag and hide the
    /// detail from the client.
    pub fn db(operation: &'static str, err: sqlx::Error) -> Self {
        error!(operation, "database failure: {err}");
        ApiError::Internal
    }

    pub fn model(operation: &'static str, err: ModelError) -> Self {
        match err {
            ModelError::NotFound { entity } => ApiError::NotFound(entity),
            ModelError::Referenced { entity, dependents, .. } => ApiError::Conflict(format!(
                "Make sure you removed all {dependents} using this {entity} first."
            )),
            ModelError::Database(err) => Self::db(operation, err),
        }
    }

    pub fn required(field: &str) -> Self {
        ApiError::BadRequest(format!("{field} is required"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
