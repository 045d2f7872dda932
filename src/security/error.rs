//! Error taxonomy for asset delivery.
//!
//! Every stage of the pipeline either passes the request through or ends it
//! with one of these variants. Each variant maps to exactly one documented
//! HTTP response; the `reason` carried by [`DeliveryError::InvalidPath`] is for
//! logs only and never reaches the client.

use axum::http::StatusCode;
use thiserror::Error;

/// Terminal rejection of an asset request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// Traversal signature, decode failure, or sandbox escape.
    #[error("invalid file path ({reason})")]
    InvalidPath { reason: &'static str },

    /// Final path segment is a hidden file.
    #[error("dotfile access denied")]
    DotfileAccessDenied,

    /// Absent, vanished, unreadable, or not a regular file.
    #[error("file not found")]
    FileNotFound,
}

impl DeliveryError {
    pub fn invalid(reason: &'static str) -> Self {
        Self::InvalidPath { reason }
    }

    /// Machine-readable error code sent to the client.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "INVALID_PATH",
            Self::DotfileAccessDenied => "DOTFILE_ACCESS_DENIED",
            Self::FileNotFound => "FILE_NOT_FOUND",
        }
    }

    /// Client-facing message. Deliberately independent of `reason`.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "Invalid file path",
            Self::DotfileAccessDenied => "Access to dotfiles is not allowed",
            Self::FileNotFound => "File not found",
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPath { .. } => StatusCode::BAD_REQUEST,
            Self::DotfileAccessDenied => StatusCode::FORBIDDEN,
            Self::FileNotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Internal reason for logs and metrics labels.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidPath { reason } => reason,
            Self::DotfileAccessDenied => "dotfile",
            Self::FileNotFound => "not_found",
        }
    }
}
