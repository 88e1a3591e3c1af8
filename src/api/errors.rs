// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// JSON error object returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
}

/// Request-level error taxonomy.
///
/// Client input problems map to 4xx, processing problems to 5xx. Every
/// failure is terminal for the request; no partial results are returned.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Malformed request envelope (missing multipart field, bad form data).
    InvalidRequest(String),
    /// Upload bytes are not a decodable image.
    InvalidImage(String),
    /// Model inference failed.
    Inference(String),
    /// Annotation or response encoding failed.
    Processing(String),
    /// The learned model is not loaded.
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ApiError::Inference(_) | ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::InvalidImage(_) => "invalid_image",
            ApiError::Inference(_) => "inference_error",
            ApiError::Processing(_) => "processing_error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            ApiError::InvalidRequest(msg)
            | ApiError::InvalidImage(msg)
            | ApiError::Inference(msg)
            | ApiError::Processing(msg)
            | ApiError::ServiceUnavailable(msg) => msg.clone(),
        };
        ErrorResponse {
            error_type: self.error_type().to_string(),
            message,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            ApiError::Inference(msg) => write!(f, "Inference error: {}", msg),
            ApiError::Processing(msg) => write!(f, "Processing error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        assert_eq!(
            ApiError::InvalidRequest("No image provided".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidImage("bad bytes".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_processing_errors_map_to_500() {
        assert_eq!(
            ApiError::Inference("shape".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Processing("encode".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unavailable_maps_to_503() {
        assert_eq!(
            ApiError::ServiceUnavailable("model not loaded".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ApiError::InvalidImage("Error decoding image".into()).to_response();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error_type"], "invalid_image");
        assert_eq!(json["message"], "Error decoding image");
    }
}
