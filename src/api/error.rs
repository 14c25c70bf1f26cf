//! API error handling.
//!
//! Every failure leaves the router as one of two JSON shapes: `{message}` for
//! not-found and internal errors, or `{errors:[{field, message}]}` for input
//! the client can correct.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::application::ServiceError;
use crate::domain::{FieldError, ValidationError};

const TASK_NOT_FOUND: &str = "Task not found";
const INTERNAL_SERVER_ERROR: &str = "Internal server error";

// =============================================================================
// Error Body
// =============================================================================

/// JSON body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    /// Field-level validation errors.
    Validation {
        /// One entry per failing field.
        errors: Vec<FieldError>,
    },
    /// A single message.
    Message {
        /// Human-readable message.
        message: String,
    },
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error body.
    pub body: ErrorBody,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, body: ErrorBody) -> Self {
        Self { status, body }
    }

    /// Creates a 400 Bad Request response for validation errors.
    #[must_use]
    pub const fn validation_error(errors: Vec<FieldError>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorBody::Validation { errors })
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            ErrorBody::Message {
                message: message.into(),
            },
        )
    }

    /// Creates a 500 Internal Server Error response with the generic body.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::Message {
                message: INTERNAL_SERVER_ERROR.to_string(),
            },
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        Self::validation_error(error.errors)
    }
}

impl From<ServiceError> for ApiErrorResponse {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Validation(validation) => validation.into(),
            ServiceError::NotFound => Self::not_found(TASK_NOT_FOUND),
            // Details are logged, never returned.
            ServiceError::Unexpected(error) => {
                tracing::error!(%error, "Internal error");
                Self::internal_error()
            }
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(%rejection, "Rejected request body");
        Self::validation_error(vec![FieldError::new("body", rejection.body_text())])
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::RepositoryError;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn test_not_found_from_service_error() {
        let response = ApiErrorResponse::from(ServiceError::NotFound);

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(
            serde_json::to_value(&response.body).unwrap(),
            json!({ "message": "Task not found" })
        );
    }

    #[rstest]
    fn test_validation_from_service_error() {
        let error = ServiceError::Validation(ValidationError::single("title", "Title is required"));
        let response = ApiErrorResponse::from(error);

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(&response.body).unwrap(),
            json!({ "errors": [{ "field": "title", "message": "Title is required" }] })
        );
    }

    #[rstest]
    fn test_unexpected_does_not_leak_details() {
        let error = ServiceError::Unexpected(RepositoryError::DatabaseError(
            "password authentication failed for user \"admin\"".to_string(),
        ));
        let response = ApiErrorResponse::from(error);

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.body,
            ErrorBody::Message {
                message: "Internal server error".to_string()
            }
        );
    }

    #[rstest]
    fn test_error_body_deserializes_both_shapes() {
        let message: ErrorBody = serde_json::from_value(json!({ "message": "Nope" })).unwrap();
        assert!(matches!(message, ErrorBody::Message { .. }));

        let errors: ErrorBody =
            serde_json::from_value(json!({ "errors": [{ "field": "title", "message": "x" }] }))
                .unwrap();
        assert!(matches!(errors, ErrorBody::Validation { .. }));
    }
}
