//! Asset delivery pipeline.
//!
//! # Stages
//! ```text
//! Start → PathChecked → DotfileChecked → Sandboxed → Classified → Delivered
//!   │          │               │              │            │
//!   └──────────┴───────────────┴──────────────┴────────────┴──▶ Rejected(code)
//! ```
//!
//! # Design Decisions
//! - Stages run in a fixed order, so precedence is always
//!   traversal > dotfile > not-found > success
//! - The pipeline owns no mutable state; one instance serves all requests
//! - Only `Delivered` is reached outside this module (by the handler, once
//!   the file is open)

use axum::http::HeaderMap;

use crate::security::{
    dotfile, limits, normalize, ContentPolicy, DeliveryError, Disposition, RequestPath,
    ResolvedPath, StaticRoot, TraversalDetector,
};

/// Per-request progress through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    PathChecked,
    DotfileChecked,
    Sandboxed,
    Classified,
    Delivered,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::PathChecked => "path_checked",
            Self::DotfileChecked => "dotfile_checked",
            Self::Sandboxed => "sandboxed",
            Self::Classified => "classified",
            Self::Delivered => "delivered",
        }
    }
}

/// A rejection together with the last stage the request passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub error: DeliveryError,
    pub stage: Stage,
}

/// An asset that passed every check and is ready to stream.
#[derive(Debug, Clone)]
pub struct ClassifiedAsset {
    pub path: ResolvedPath,
    pub disposition: Disposition,
    pub headers: HeaderMap,
}

/// Immutable pipeline shared by all requests.
#[derive(Debug, Clone)]
pub struct AssetPipeline {
    root: StaticRoot,
    detector: TraversalDetector,
    policy: ContentPolicy,
    max_path_length: usize,
}

impl AssetPipeline {
    pub fn new(
        root: StaticRoot,
        detector: TraversalDetector,
        policy: ContentPolicy,
        max_path_length: usize,
    ) -> Self {
        Self {
            root,
            detector,
            policy,
            max_path_length,
        }
    }

    pub fn root(&self) -> &StaticRoot {
        &self.root
    }

    /// Run every check up to `Classified`.
    pub async fn evaluate(&self, request: &RequestPath) -> Result<ClassifiedAsset, Rejection> {
        let mut stage = Stage::Start;
        let reject = |error: DeliveryError, stage: Stage| Rejection { error, stage };

        // Start → PathChecked
        limits::check_path_length(&request.raw, self.max_path_length).map_err(|e| reject(e, stage))?;
        let normalized = normalize::normalize(request).map_err(|e| reject(e, stage))?;
        self.detector
            .scan(&normalized.forms)
            .map_err(|e| reject(e, stage))?;
        stage = Stage::PathChecked;

        // PathChecked → DotfileChecked
        dotfile::check(&normalized.relative).map_err(|e| reject(e, stage))?;
        stage = Stage::DotfileChecked;

        // DotfileChecked → Sandboxed
        let resolved = self
            .root
            .resolve(&normalized.relative)
            .await
            .map_err(|e| reject(e, stage))?;
        stage = Stage::Sandboxed;

        // Sandboxed → Classified
        let (disposition, headers) = self.policy.headers_for(resolved.file_name());
        tracing::trace!(
            from = stage.as_str(),
            to = Stage::Classified.as_str(),
            disposition = disposition.as_str(),
            "Asset classified"
        );

        Ok(ClassifiedAsset {
            path: resolved,
            disposition,
            headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::limits::DEFAULT_MAX_PATH_LENGTH;
    use std::fs;
    use tempfile::TempDir;

    fn pipeline() -> (TempDir, AssetPipeline) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("photo.jpg"), b"jpeg").unwrap();
        fs::write(dir.path().join("report.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join(".env"), b"SECRET=1").unwrap();
        let root = StaticRoot::new(dir.path()).unwrap();
        let pipeline = AssetPipeline::new(
            root,
            TraversalDetector::new().unwrap(),
            ContentPolicy::default(),
            DEFAULT_MAX_PATH_LENGTH,
        );
        (dir, pipeline)
    }

    async fn code_for(p: &AssetPipeline, raw: &str) -> &'static str {
        match p.evaluate(&RequestPath::from_raw(raw)).await {
            Ok(_) => "OK",
            Err(rejection) => rejection.error.code(),
        }
    }

    #[tokio::test]
    async fn test_inline_and_attachment() {
        let (_dir, p) = pipeline();
        let photo = p.evaluate(&RequestPath::from_raw("photo.jpg")).await.unwrap();
        assert_eq!(photo.disposition, Disposition::Inline);

        let report = p.evaluate(&RequestPath::from_raw("report.pdf")).await.unwrap();
        assert_eq!(report.disposition, Disposition::Attachment);
    }

    #[tokio::test]
    async fn test_traversal_variants() {
        let (_dir, p) = pipeline();
        for raw in [
            "../../../etc/passwd",
            "..%2F..%2F..%2Fetc%2Fpasswd",
            "%2e%2e/%2e%2e/etc/passwd",
            "%252e%252e/%252e%252e/etc/passwd",
            "..\\..\\windows\\win.ini",
            "a/b/..",
            "photo.jpg/..",
            "~root/.ssh/id_rsa",
        ] {
            assert_eq!(code_for(&p, raw).await, "INVALID_PATH", "{raw}");
        }
    }

    #[tokio::test]
    async fn test_precedence() {
        let (_dir, p) = pipeline();
        // traversal wins over dotfile
        let rejection = p
            .evaluate(&RequestPath::from_raw("../.env"))
            .await
            .unwrap_err();
        assert_eq!(rejection.error.code(), "INVALID_PATH");
        assert_eq!(rejection.stage, Stage::Start);

        // dotfile wins over not-found
        let rejection = p
            .evaluate(&RequestPath::from_raw(".missing-secret"))
            .await
            .unwrap_err();
        assert_eq!(rejection.error, DeliveryError::DotfileAccessDenied);
        assert_eq!(rejection.stage, Stage::PathChecked);

        let rejection = p
            .evaluate(&RequestPath::from_raw("missing.png"))
            .await
            .unwrap_err();
        assert_eq!(rejection.error, DeliveryError::FileNotFound);
        assert_eq!(rejection.stage, Stage::DotfileChecked);
    }

    #[tokio::test]
    async fn test_existing_dotfile_denied() {
        let (_dir, p) = pipeline();
        assert_eq!(code_for(&p, ".env").await, "DOTFILE_ACCESS_DENIED");
        assert_eq!(code_for(&p, "%2Eenv").await, "DOTFILE_ACCESS_DENIED");
    }

    #[tokio::test]
    async fn test_overlong_path_rejected() {
        let (_dir, p) = pipeline();
        let raw = format!("{}.png", "a".repeat(DEFAULT_MAX_PATH_LENGTH));
        assert_eq!(code_for(&p, &raw).await, "INVALID_PATH");
    }

    #[tokio::test]
    async fn test_repeated_evaluation_is_stable() {
        let (_dir, p) = pipeline();
        for raw in ["photo.jpg", ".env", "../x", "missing.png"] {
            assert_eq!(code_for(&p, raw).await, code_for(&p, raw).await, "{raw}");
        }
    }
}
