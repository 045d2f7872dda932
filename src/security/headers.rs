//! Content policy and security response headers.
//!
//! # Responsibilities
//! - Classify a file extension as inline or attachment
//! - Pick the `Content-Type` for the served file
//! - Build the fixed security header set for successful responses
//!
//! # Design Decisions
//! - Unknown types default to attachment; only listed media and JSON render inline
//! - Active content (`.svg`, `.html`) is never inline
//! - Classification is a pure function of the lower-cased extension

use axum::http::{header, HeaderMap, HeaderValue};

pub const NOSNIFF: &str = "nosniff";
pub const FRAME_OPTIONS: &str = "SAMEORIGIN";
pub const CONTENT_SECURITY_POLICY: &str =
    "default-src 'none'; img-src 'self'; media-src 'self'; style-src 'unsafe-inline'; sandbox";

const INLINE_EXTENSIONS: &[&str] = &[
    // images
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".avif", ".bmp", ".ico",
    // video
    ".mp4", ".webm", ".ogv", ".mov", ".m4v",
    // audio
    ".mp3", ".wav", ".ogg", ".oga", ".m4a", ".aac", ".flac", ".opus",
    // documents
    ".json",
];

/// How the browser should present the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

/// Lower-cased extension including the leading dot, or empty.
///
/// A leading dot alone does not start an extension.
pub fn extension(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name[idx..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

pub fn classify(file_name: &str) -> Disposition {
    let ext = extension(file_name);
    if INLINE_EXTENSIONS.contains(&ext.as_str()) {
        Disposition::Inline
    } else {
        Disposition::Attachment
    }
}

/// Header policy applied to every delivered asset.
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    cache_control: HeaderValue,
}

impl ContentPolicy {
    pub fn new(cache_max_age_secs: u64) -> Self {
        let cache_control = HeaderValue::from_str(&format!("public, max-age={cache_max_age_secs}"))
            .unwrap_or(HeaderValue::from_static("public, max-age=86400"));
        Self { cache_control }
    }

    /// Disposition plus the full header set for `file_name`.
    pub fn headers_for(&self, file_name: &str) -> (Disposition, HeaderMap) {
        let disposition = classify(file_name);
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();

        let mut headers = HeaderMap::with_capacity(6);
        headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static(NOSNIFF));
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static(FRAME_OPTIONS));
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        );
        headers.insert(header::CACHE_CONTROL, self.cache_control.clone());
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static(disposition.as_str()),
        );
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_str(mime.essence_str())
                .unwrap_or(HeaderValue::from_static("application/octet-stream")),
        );

        (disposition, headers)
    }
}

impl Default for ContentPolicy {
    fn default() -> Self {
        Self::new(86_400)
    }
}
