// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::api::version::VersionError;
use crate::network::NetworkError;
use crate::policy::PolicyError;

/// HTTP API error with compute-style fault bodies
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 406 Not Acceptable (unsupported microversion)
    NotAcceptable(String),

    // 410 Gone (decommissioned operations)
    Gone(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::NotAcceptable(_) => 406,
            ApiError::Gone(_) => 410,
            ApiError::InternalServerError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::NotAcceptable(msg) => msg,
            ApiError::Gone(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Fault name used as the top-level key of the error body
    pub fn fault_name(&self) -> &'static str {
        fault_name_for(self.status_code())
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let fault = self.fault_name();
        json!({
            fault: {
                "code": self.status_code(),
                "message": self.message()
            }
        })
    }
}

/// Fault names per status code; anything unlisted is a generic compute fault
pub fn fault_name_for(status: u16) -> &'static str {
    match status {
        400 => "badRequest",
        401 => "unauthorized",
        403 => "forbidden",
        404 => "itemNotFound",
        405 => "badMethod",
        406 => "notAcceptable",
        409 => "conflictingRequest",
        413 | 429 => "overLimit",
        415 => "badMediaType",
        501 => "notImplemented",
        503 => "serviceUnavailable",
        _ => "computeFault",
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn not_acceptable(message: impl Into<String>) -> Self {
        ApiError::NotAcceptable(message.into())
    }

    pub fn gone() -> Self {
        ApiError::Gone("This resource is no longer available.".to_string())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// Replacement for errors a route does not declare
    pub fn unexpected() -> Self {
        ApiError::internal_server_error(
            "Unexpected API Error. Please report this at your provider and attach the request id if possible.",
        )
    }
}

// Convert other error types to ApiError
impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::NotAuthorized(_) => ApiError::forbidden(err.to_string()),
            PolicyError::InvalidRule { .. } | PolicyError::Load(_) => {
                tracing::error!("Policy error: {}", err);
                ApiError::internal_server_error("Policy configuration error")
            }
        }
    }
}

impl From<VersionError> for ApiError {
    fn from(err: VersionError) -> Self {
        match err {
            VersionError::Invalid(_) => ApiError::bad_request(err.to_string()),
            VersionError::Unsupported(_) => ApiError::not_acceptable(err.to_string()),
        }
    }
}

impl From<NetworkError> for ApiError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::NotFound(_) => ApiError::not_found("Network not found"),
            NetworkError::Unauthorized(msg) => {
                tracing::warn!("Network service rejected credentials: {}", msg);
                ApiError::unauthorized("Network service rejected the request credentials")
            }
            NetworkError::Http { status, ref body } => {
                // Don't expose upstream bodies to clients
                tracing::error!("Network service returned {}: {}", status, body);
                ApiError::internal_server_error("Network service request failed")
            }
            NetworkError::Transport(msg) => {
                tracing::error!("Network service unreachable: {}", msg);
                ApiError::internal_server_error("Network service unavailable")
            }
            NetworkError::Decode(msg) => {
                tracing::error!("Network service response could not be decoded: {}", msg);
                ApiError::internal_server_error("Network service request failed")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
