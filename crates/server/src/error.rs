use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use navigator_common::NavigatorError;
use std::fmt;
use tracing::error;

/// HTTP rendering of [`NavigatorError`]
///
/// The body is always `{"error": <user message>}`; the full error is
/// logged for 5xx responses.
#[derive(Debug)]
pub struct ApiError(pub NavigatorError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<NavigatorError> for ApiError {
    fn from(err: NavigatorError) -> Self {
        Self(err)
    }
}

impl From<BlockingError> for ApiError {
    fn from(err: BlockingError) -> Self {
        Self(NavigatorError::internal(format!("blocking task failed: {}", err)))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status.as_u16(), self.0);
        }

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.0.user_message(),
        }))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
