//! API error responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use ironwall_rule_engine::RuleEngineError;

/// Error returned by API handlers.
///
/// Rendered as `{"detail": "<message>"}` so dashboard clients can show the
/// message verbatim.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// 422 with the given message.
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<RuleEngineError> for ApiError {
    fn from(err: RuleEngineError) -> Self {
        if err.is_client_error() {
            Self::unprocessable(err.to_string())
        } else {
            tracing::error!(error = %err, "engine error while handling request");
            Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: err.to_string(),
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_422() {
        let err: ApiError = RuleEngineError::validation("port", "bad").into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.detail(), "invalid port: bad");
    }

    #[test]
    fn capacity_maps_to_422() {
        let err: ApiError = RuleEngineError::Capacity { limit: 3 }.into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn rule_load_maps_to_500() {
        let err: ApiError = RuleEngineError::RuleLoad {
            path: "rules.toml".to_owned(),
            reason: "gone".to_owned(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
