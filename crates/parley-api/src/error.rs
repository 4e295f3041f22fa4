use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(&'static str),

    /// Registration with an email that is already taken.
    #[error("User already exists")]
    Conflict,

    /// Unknown email or wrong password. One message for both.
    #[error("User email or password is incorrect")]
    InvalidCredentials,

    /// Missing, invalid, expired or superseded session token.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict | ApiError::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Store(_) | ApiError::Internal(_) => {
                error!("Request failed: {}", self);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        ApiError::Validation("Invalid request body")
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!("Rejected query string: {}", rejection.body_text());
        ApiError::Validation("Invalid query string")
    }
}
