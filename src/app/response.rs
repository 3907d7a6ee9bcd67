use crate::utils::error::{CourseError, GenerationError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub category: &'static str,
}

/// `CourseError` 的 HTTP 外殼
#[derive(Debug)]
pub struct ApiError(pub CourseError);

impl From<CourseError> for ApiError {
    fn from(err: CourseError) -> Self {
        ApiError(err)
    }
}

pub fn status_for(err: &CourseError) -> StatusCode {
    match err {
        CourseError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CourseError::NotFound { .. } => StatusCode::NOT_FOUND,
        CourseError::AlreadyExists { .. } => StatusCode::CONFLICT,
        CourseError::Generation(GenerationError::Throttled { .. }) => StatusCode::TOO_MANY_REQUESTS,
        CourseError::Generation(GenerationError::MalformedResponse { .. }) => StatusCode::BAD_GATEWAY,
        CourseError::Generation(GenerationError::UpstreamUnavailable { .. }) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        CourseError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self.0,
                self.0.category(),
                self.0.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", self.0.recovery_suggestion());
        } else {
            tracing::warn!("⚠️ Request rejected: {}", self.0);
        }

        let body = ErrorBody {
            error: self.0.user_friendly_message(),
            category: self.0.category().as_str(),
        };
        (status, Json(body)).into_response()
    }
}
