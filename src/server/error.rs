use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::debug;
use serde_json::json;

use crate::errors::{AuthError, CatalogError, DataConnectionError};

/// Failures a handler reports to the client
#[derive(Debug)]
pub enum ApiError {
    /// Login failed; the body names the user only
    Unauthorized { user: String },
    /// The payload is neither an entry nor a list of entries
    InvalidInput(String),
    /// No catalog for the requested language
    UnknownLanguage(String),
    /// The store failed; the body is an empty list
    StoreFailure,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownLanguage(_) => StatusCode::NOT_FOUND,
            ApiError::StoreFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthorized(user: &str, cause: AuthError) -> Self {
        debug!("Rejecting request: {}", cause);
        ApiError::Unauthorized {
            user: user.to_string(),
        }
    }
}

impl From<DataConnectionError> for ApiError {
    fn from(error: DataConnectionError) -> Self {
        match error {
            DataConnectionError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            _ => ApiError::StoreFailure,
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::UnsupportedLanguage(lang) => ApiError::UnknownLanguage(lang),
            CatalogError::Load(_) => ApiError::StoreFailure,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Unauthorized { user } => json!({ "user": user }),
            ApiError::InvalidInput(message) => json!({ "error": message }),
            ApiError::UnknownLanguage(lang) => {
                json!({ "error": format!("Unsupported language: {}", lang) })
            }
            ApiError::StoreFailure => json!([]),
        };
        (status, Json(body)).into_response()
    }
}
