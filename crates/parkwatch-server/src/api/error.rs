//! API error types and response handling.
//!
//! This module provides a unified error type for all API handlers
//! with automatic conversion to appropriate HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parkwatch_core::{Locale, MessageCatalog, ParkingError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type.
///
/// Each variant maps to a specific HTTP status code and produces a
/// consistent JSON error response.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// 400 Bad Request - Invalid input from client.
    BadRequest {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 404 Not Found - No open session for the plate.
    NotFound {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 409 Conflict - The plate is already parked.
    Conflict {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
        /// The plate involved.
        plate: String,
    },

    /// 500 Internal Server Error - Unexpected server-side error.
    InternalError {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
        /// Optional details (not exposed to client in production).
        details: Option<String>,
    },
}

/// Standard JSON error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "session_not_found",
    "message": "No parked vehicle was found with that plate.",
    "details": null
}))]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "duplicate_open_session").
    #[schema(example = "session_not_found")]
    pub error: String,

    /// Human-readable, localized error message.
    #[schema(example = "No parked vehicle was found with that plate.")]
    pub message: String,

    /// Optional additional details for debugging.
    #[schema(nullable)]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Convert a core error, rendering its message in `locale`.
    #[must_use]
    pub fn localized(err: &ParkingError, catalog: &MessageCatalog, locale: Locale) -> Self {
        let error_code = err.error_code().to_ascii_lowercase();
        let message = err.localized(catalog, locale);

        match err {
            ParkingError::InvalidPlate { .. } | ParkingError::InvalidVehicleType { .. } => {
                Self::BadRequest {
                    error_code,
                    message,
                }
            }
            ParkingError::SessionNotFound { .. } => Self::NotFound {
                error_code,
                message,
            },
            ParkingError::DuplicateOpenSession { plate } => Self::Conflict {
                error_code,
                message,
                plate: plate.clone(),
            },
            ParkingError::Store(_) | ParkingError::Config(_) => Self::InternalError {
                error_code,
                message: "The parking service failed to complete the operation".to_string(),
                details: Some(err.to_string()),
            },
        }
    }

    /// HTTP status this error is reported with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_response = match self {
            Self::BadRequest {
                error_code,
                message,
            }
            | Self::NotFound {
                error_code,
                message,
            } => ErrorResponse {
                error: error_code,
                message,
                details: None,
            },

            Self::Conflict {
                error_code,
                message,
                plate,
            } => ErrorResponse {
                error: error_code,
                message,
                details: Some(serde_json::json!({ "plate": plate })),
            },

            Self::InternalError {
                error_code,
                message,
                details,
            } => {
                // Log internal errors
                tracing::error!(
                    error_code = %error_code,
                    message = %message,
                    details = ?details,
                    "Internal server error"
                );

                ErrorResponse {
                    error: error_code,
                    message,
                    details: details.map(|d| serde_json::json!(d)),
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest { message, .. } => write!(f, "Bad Request: {message}"),
            Self::NotFound { message, .. } => write!(f, "Not Found: {message}"),
            Self::Conflict { message, .. } => write!(f, "Conflict: {message}"),
            Self::InternalError { message, .. } => {
                write!(f, "Internal Error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Convert from parkwatch_core errors using the default locale.
impl From<ParkingError> for ApiError {
    fn from(err: ParkingError) -> Self {
        Self::localized(&err, &MessageCatalog::default(), Locale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkwatch_core::StoreError;

    #[test]
    fn test_bad_request_error() {
        let err = ApiError::BadRequest {
            error_code: "test_error".to_string(),
            message: "Test message".to_string(),
        };
        assert!(err.to_string().contains("Bad Request"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse {
            error: "test_error".to_string(),
            message: "Test message".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test_error"));
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err = ParkingError::DuplicateOpenSession {
            plate: "ABC-123".into(),
        };
        let api = ApiError::localized(&err, &MessageCatalog::default(), Locale::En);
        assert_eq!(api.status(), StatusCode::CONFLICT);
        assert!(matches!(
            api,
            ApiError::Conflict { ref error_code, ref plate, .. }
                if error_code == "duplicate_open_session" && plate == "ABC-123"
        ));
    }

    #[test]
    fn test_store_failure_maps_to_internal_error() {
        let api: ApiError = ParkingError::Store(StoreError::Poisoned).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_message_is_localized() {
        let err = ParkingError::SessionNotFound {
            plate: "X-1".into(),
        };
        let catalog = MessageCatalog::default();
        let es = ApiError::localized(&err, &catalog, Locale::Es);
        let en = ApiError::localized(&err, &catalog, Locale::En);
        assert_ne!(es.to_string(), en.to_string());
        assert_eq!(en.status(), StatusCode::NOT_FOUND);
    }
}
