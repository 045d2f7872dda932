//! HTTP handler that streams assets through the pipeline.
//!
//! # Responsibilities
//! - Recover both the raw and the framework-extracted request path
//! - Run the pipeline and render rejections as JSON
//! - Open the resolved file and stream it with the policy headers
//!
//! # Design Decisions
//! - The raw path comes from the request URI untouched; the extracted path
//!   is whatever axum's `Path` decoding produced (or nothing, if it failed)
//! - A file that vanishes between resolution and open is a 404, never a 500
//! - The file handle lives inside the body stream and closes when the
//!   stream finishes or the client goes away

use std::time::Instant;

use axum::{
    body::Body,
    extract::{rejection::PathRejection, OriginalUri, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::delivery::pipeline::{ClassifiedAsset, Rejection, Stage};
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::{DeliveryError, RequestPath};

/// `GET|HEAD {prefix}/{*path}`
pub async fn serve_asset(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    extracted: Result<Path<String>, PathRejection>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let raw = raw_relative_path(uri.path(), &state.mount_prefix);
    let normalized = extracted.ok().map(|Path(p)| p);
    let request = RequestPath::new(raw, normalized);

    tracing::debug!(request_id = %request_id, path = %request.raw, "Serving asset");

    let asset = match state.pipeline.evaluate(&request).await {
        Ok(asset) => asset,
        Err(rejection) => return reject(&request_id, &request, rejection, start),
    };

    match open(asset).await {
        Ok((response, len)) => {
            tracing::info!(
                request_id = %request_id,
                path = %request.raw,
                bytes = len,
                stage = Stage::Delivered.as_str(),
                "Asset delivered"
            );
            metrics::record_delivered(len, start);
            response
        }
        Err(error) => reject(
            &request_id,
            &request,
            Rejection {
                error,
                stage: Stage::Classified,
            },
            start,
        ),
    }
}

/// Any route that is not an asset or health check.
pub async fn fallback() -> Response {
    DeliveryError::FileNotFound.into_response()
}

/// Path below the mount prefix, exactly as it appeared on the wire.
fn raw_relative_path<'a>(path: &'a str, prefix: &str) -> &'a str {
    let rest = path.strip_prefix(prefix).unwrap_or(path);
    rest.strip_prefix('/').unwrap_or(rest)
}

async fn open(asset: ClassifiedAsset) -> Result<(Response, u64), DeliveryError> {
    let file = tokio::fs::File::open(asset.path.as_path()).await.map_err(|e| {
        tracing::debug!(error_kind = ?e.kind(), "Open failed after resolution");
        DeliveryError::FileNotFound
    })?;
    let len = file
        .metadata()
        .await
        .map_err(|_| DeliveryError::FileNotFound)?
        .len();

    let mut headers = asset.headers;
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));

    let body = Body::from_stream(ReaderStream::new(file));
    Ok(((StatusCode::OK, headers, body).into_response(), len))
}

fn reject(request_id: &str, request: &RequestPath, rejection: Rejection, start: Instant) -> Response {
    let error = rejection.error;
    match error {
        DeliveryError::InvalidPath { reason } => tracing::warn!(
            security_event = "path_rejected",
            request_id = %request_id,
            path = %request.raw,
            signature = reason,
            stage = rejection.stage.as_str(),
            "Blocked asset request"
        ),
        _ => tracing::info!(
            request_id = %request_id,
            path = %request.raw,
            code = error.code(),
            stage = rejection.stage.as_str(),
            "Asset request rejected"
        ),
    }
    metrics::record_rejection(&error, start);
    error.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_relative_path() {
        assert_eq!(raw_relative_path("/uploads/a/b.png", "/uploads"), "a/b.png");
        assert_eq!(
            raw_relative_path("/uploads/../../etc/passwd", "/uploads"),
            "../../etc/passwd"
        );
        assert_eq!(raw_relative_path("/uploads//x", "/uploads"), "/x");
        assert_eq!(raw_relative_path("/media/x.png", "/media"), "x.png");
    }
}
