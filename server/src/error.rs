//! The single error type handlers return, and its HTTP rendering.
//!
//! # Design
//! Handlers return `Result<_, ApplicationError>`. Every failure, whether a
//! failed input check, a missing todo, a store fault or an extractor
//! rejection, becomes an `ApplicationError` before it leaves a handler, and
//! its `IntoResponse` impl is the one place a failure turns into a status
//! code and a `{"message"}` body.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use todo_core::StoreError;

pub const INTERNAL_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input (400).
    Validation,
    /// Valid input, no matching todo (404).
    NotFound,
    /// Store or infrastructure failure (500).
    Internal,
}

impl ErrorKind {
    fn from_status(status: u16) -> Self {
        match status {
            400 => Self::Validation,
            404 => Self::NotFound,
            _ => Self::Internal,
        }
    }
}

/// A failure with the message and status the client will see.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApplicationError {
    kind: ErrorKind,
    message: String,
    status_code: u16,
    /// Server-side detail, logged but never sent to the client.
    detail: Option<String>,
}

/// `{status, message}` view of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

impl ApplicationError {
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            kind: ErrorKind::from_status(status_code),
            message: message.into(),
            status_code,
            detail: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message, 400)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, 404)
    }

    /// An internal failure. The client only ever sees the generic message.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::new(INTERNAL_MESSAGE, 500)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status_code,
            message: self.message.clone(),
        }
    }
}

impl From<StoreError> for ApplicationError {
    fn from(err: StoreError) -> Self {
        if err.is_validation() {
            return Self::validation(err.to_string());
        }
        Self::internal(err.to_string())
    }
}

impl From<QueryRejection> for ApplicationError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApplicationError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code)
            .ok()
            .filter(|status| status.is_client_error() || status.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if self.message.is_empty() || status.is_server_error() {
            INTERNAL_MESSAGE
        } else {
            self.message.as_str()
        };

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                detail = self.detail.as_deref().unwrap_or(&self.message),
                "request failed"
            );
        } else {
            tracing::debug!(status = status.as_u16(), reason = message, "request rejected");
        }

        (status, Json(MessageBody { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    async fn render(err: ApplicationError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    #[case(400, ErrorKind::Validation)]
    #[case(404, ErrorKind::NotFound)]
    #[case(500, ErrorKind::Internal)]
    #[case(503, ErrorKind::Internal)]
    fn kind_follows_status(#[case] status: u16, #[case] kind: ErrorKind) {
        assert_eq!(ApplicationError::new("boom", status).kind(), kind);
    }

    #[test]
    fn to_body_exposes_status_and_message() {
        let err = ApplicationError::not_found("Todo not found");
        assert_eq!(
            err.to_body(),
            ErrorBody {
                status: 404,
                message: "Todo not found".to_string(),
            }
        );
        assert_eq!(err.to_string(), "Todo not found");
    }

    #[tokio::test]
    async fn client_error_keeps_its_message() {
        let (status, body) = render(ApplicationError::validation("Title is required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "message": "Title is required" }));
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        let err = ApplicationError::from(StoreError::Closed);
        assert_eq!(err.status_code(), 500);

        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "message": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn bogus_status_defaults_to_500() {
        let (status, body) = render(ApplicationError::new("", 200)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
    }

    #[test]
    fn store_validation_is_a_client_error() {
        let err = ApplicationError::from(StoreError::validation("description", "too long"));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "too long");
    }
}
