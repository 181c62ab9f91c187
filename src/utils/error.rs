use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hubspot::HubSpotError;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    HubSpot(HubSpotError),
    ConfigError(String),
    ValidationError(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::HubSpot(err) => write!(f, "{}", err),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<HubSpotError> for AppError {
    fn from(err: HubSpotError) -> Self {
        AppError::HubSpot(err)
    }
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::HubSpot(err) => err.kind(),
            AppError::ConfigError(_) => "config_error",
            AppError::ValidationError(_) => "validation_error",
            AppError::InternalError(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::HubSpot(HubSpotError::Store(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::HubSpot(HubSpotError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            // Falhas do fluxo são sempre 400 para o frontend
            AppError::HubSpot(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::from(HubSpotError::StateMismatch).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::from(HubSpotError::InvalidToken).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(HubSpotError::store("down")).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::ConfigError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_kind_and_message_pass_through() {
        let err = AppError::from(HubSpotError::NoCredentials);
        assert_eq!(err.kind(), "no_credentials");
        assert_eq!(err.to_string(), "No credentials found.");
    }

    #[tokio::test]
    async fn test_into_response_body() {
        let response = AppError::from(HubSpotError::InsufficientScope).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["kind"], "insufficient_scope");
        assert_eq!(body["status"], 400);
    }
}
