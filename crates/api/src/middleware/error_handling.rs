//! # Error Handling Middleware
//!
//! Maps [`MeetError`] onto HTTP status codes and a `{"error": "..."}` JSON
//! body so every endpoint fails the same way.
//!
//! Database and internal failures are logged and answered with a generic
//! message; their details never reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use meetgrid_core::errors::MeetError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use meetgrid_api::middleware::error_handling::AppError;
/// use meetgrid_core::errors::MeetError;
///
/// async fn handler(title: String) -> Result<Json<String>, AppError> {
///     if title.is_empty() {
///         return Err(MeetError::Validation("A meeting name must be provided".into()).into());
///     }
///     Ok(Json(title))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub MeetError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            MeetError::NotFound(_) => StatusCode::NOT_FOUND,
            MeetError::Validation(_) => StatusCode::BAD_REQUEST,
            MeetError::Authentication(_) => StatusCode::UNAUTHORIZED,
            MeetError::Authorization(_) => StatusCode::FORBIDDEN,
            MeetError::Conflict(_) => StatusCode::CONFLICT,
            MeetError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MeetError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self.0 {
            MeetError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                "Internal server error".to_string()
            }
            MeetError::Internal(err) => {
                tracing::error!("Internal error: {}", err);
                "Internal server error".to_string()
            }
            other => {
                if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
                    tracing::warn!("Access rejected: {}", other);
                }
                other.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Allows `?` on `MeetResult` inside handlers.
impl From<MeetError> for AppError {
    fn from(err: MeetError) -> Self {
        AppError(err)
    }
}

/// Storage failures surface as `MeetError::Database`.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(MeetError::Database(err))
    }
}

/// Maps a MeetError to an HTTP response
pub fn map_error(err: MeetError) -> Response {
    AppError(err).into_response()
}
