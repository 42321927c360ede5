use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::dispatch::{DispatchError, DISPATCH_FAILED_MESSAGE};
use crate::notification::StoreError;
use crate::notifier::NotifierError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

impl From<NotifierError> for AppError {
    fn from(err: NotifierError) -> Self {
        match err {
            NotifierError::Auth(e) => AppError::Auth(e),
            NotifierError::Store(e) => AppError::Store(e),
            NotifierError::Dispatch(e) => AppError::Dispatch(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

fn masked(detail: String, public: &str) -> String {
    if is_production() {
        public.to_string()
    } else {
        detail
    }
}

impl AppError {
    /// Machine-readable error code returned to clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "UNAUTHORIZED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Store(StoreError::Invalid(_)) => "VALIDATION_ERROR",
            AppError::Store(_) => "STORE_ERROR",
            AppError::Dispatch(DispatchError::UnknownTemplate(_)) => "UNKNOWN_TEMPLATE",
            AppError::Dispatch(DispatchError::MissingTemplate) => "VALIDATION_ERROR",
            AppError::Dispatch(DispatchError::NoRecipients) => "NO_RECIPIENTS",
            AppError::Dispatch(_) => "DISPATCH_FAILED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::Invalid(_)) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Dispatch(DispatchError::MissingTemplate) => StatusCode::BAD_REQUEST,
            AppError::Dispatch(DispatchError::UnknownTemplate(_))
            | AppError::Dispatch(DispatchError::NoRecipients) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Dispatch(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let log_message = self.to_string();

        let client_message = match &self {
            AppError::Auth(e) => e.to_string(),
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Store(StoreError::Invalid(e)) => e.to_string(),
            AppError::Store(e) => masked(e.to_string(), "Service temporarily unavailable"),
            AppError::Dispatch(DispatchError::UnknownTemplate(name)) => {
                format!("Unknown template: {}", name)
            }
            AppError::Dispatch(DispatchError::MissingTemplate) => "template is required".to_string(),
            AppError::Dispatch(_) => DISPATCH_FAILED_MESSAGE.to_string(),
        };

        // Always log the detailed error server-side
        if status.is_server_error() {
            tracing::error!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        } else {
            tracing::warn!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DirectoryError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Auth(AuthError::AuthenticationRequired).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Dispatch(DispatchError::UnknownTemplate("x".into())).code(),
            "UNKNOWN_TEMPLATE"
        );
        assert_eq!(
            AppError::Store(StoreError::Database(sqlx::Error::PoolClosed)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Dispatch(DispatchError::Directory(DirectoryError::InvalidTable(
                "x y".into()
            )))
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_dispatch_failure_uses_flash_message() {
        let err = AppError::Dispatch(DispatchError::Store(StoreError::Database(
            sqlx::Error::PoolClosed,
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "DISPATCH_FAILED");
        assert_eq!(json["error"]["message"], DISPATCH_FAILED_MESSAGE);
    }
}
