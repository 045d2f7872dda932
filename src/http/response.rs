//! Response shaping.
//!
//! # Responsibilities
//! - Render pipeline rejections as the JSON error envelope
//! - Map each rejection to its fixed status code
//!
//! # Design Decisions
//! - The body only ever carries the public code and message
//! - Error responses are never cached

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::security::DeliveryError;

/// `{ "success": false, "error": { "code": ..., "message": ... } }`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: &'static str,
}

impl From<&DeliveryError> for ErrorEnvelope {
    fn from(err: &DeliveryError) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: err.code(),
                message: err.message(),
            },
        }
    }
}

impl IntoResponse for DeliveryError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(ErrorEnvelope::from(&self))).into_response();
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}
