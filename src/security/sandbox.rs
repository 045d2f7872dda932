//! Sandbox resolution against the static root.
//!
//! # Responsibilities
//! - Join a relative request path onto [`StaticRoot`]
//! - Canonicalize the result (symlinks, `.`) off the async executor
//! - Verify the canonical path is the root or a descendant of it
//! - Confirm the target is a regular file
//!
//! # Design Decisions
//! - Prefix check is component-wise (`Path::starts_with`), so `/data` never
//!   contains `/database`
//! - This check runs on every request regardless of earlier stages; all
//!   reads happen on the path it returns
//! - OS errors collapse to `FileNotFound` and are only logged
//! - A path ending in `/` or `/.` names a directory; if it lands on a
//!   regular file it is `FileNotFound`

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::error::DeliveryError;

/// Error building the static root at startup.
#[derive(Debug, Error)]
pub enum StaticRootError {
    #[error("static root is empty")]
    Empty,

    #[error("static root must be absolute: {}", .0.display())]
    Relative(PathBuf),

    #[error("static root {} is unavailable: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("static root is not a directory: {}", .0.display())]
    NotDirectory(PathBuf),
}

/// Absolute, canonical directory that all assets are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRoot {
    path: Arc<Path>,
}

impl StaticRoot {
    /// Canonicalize and validate the configured root.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StaticRootError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StaticRootError::Empty);
        }
        if !path.is_absolute() {
            return Err(StaticRootError::Relative(path.to_path_buf()));
        }

        let canonical = dunce::canonicalize(path).map_err(|source| StaticRootError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;
        if !canonical.is_dir() {
            return Err(StaticRootError::NotDirectory(canonical));
        }

        Ok(Self {
            path: Arc::from(canonical),
        })
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Whether `candidate` is the root itself or strictly beneath it.
    pub fn contains(&self, candidate: &Path) -> bool {
        candidate.starts_with(&self.path)
    }

    /// Lexically join `relative` onto the root without touching the disk.
    ///
    /// Empty and `.` segments are dropped. Anything that is not a plain name
    /// is rejected.
    pub fn join(&self, relative: &str) -> Result<PathBuf, DeliveryError> {
        let mut joined = self.path.to_path_buf();
        for segment in relative.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            }
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) => joined.push(part),
                _ => return Err(DeliveryError::invalid("non_normal_component")),
            }
        }
        Ok(joined)
    }

    /// Resolve `relative` to an existing regular file inside the root.
    pub async fn resolve(&self, relative: &str) -> Result<ResolvedPath, DeliveryError> {
        let candidate = self.join(relative)?;

        let canonical = match canonicalize(candidate).await {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(error_kind = ?e.kind(), "Canonicalization failed");
                return Err(DeliveryError::FileNotFound);
            }
        };

        if !self.contains(&canonical) {
            tracing::warn!(
                security_event = "sandbox_escape",
                root = %self.path.display(),
                "Resolved path escapes static root"
            );
            return Err(DeliveryError::invalid("sandbox_escape"));
        }

        match tokio::fs::metadata(&canonical).await {
            Ok(meta) if meta.is_file() && !names_directory(relative) => {
                Ok(ResolvedPath { path: canonical })
            }
            Ok(_) => Err(DeliveryError::FileNotFound),
            Err(e) => {
                tracing::debug!(error_kind = ?e.kind(), "Metadata lookup failed");
                Err(DeliveryError::FileNotFound)
            }
        }
    }
}

/// Canonical path of a regular file proven to live inside the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// File name of the resolved target, used for content classification.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Trailing separator or trailing `.` segment.
fn names_directory(relative: &str) -> bool {
    relative.ends_with('/') || relative == "." || relative.ends_with("/.")
}

async fn canonicalize(path: PathBuf) -> io::Result<PathBuf> {
    tokio::task::spawn_blocking(move || dunce::canonicalize(path))
        .await
        .map_err(io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, StaticRoot) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("photo.jpg"), b"jpeg").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/clip.mp4"), b"mp4").unwrap();
        let root = StaticRoot::new(dir.path()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_root_must_be_absolute_and_present() {
        assert!(matches!(StaticRoot::new(""), Err(StaticRootError::Empty)));
        assert!(matches!(
            StaticRoot::new("relative/uploads"),
            Err(StaticRootError::Relative(_))
        ));

        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            StaticRoot::new(&missing),
            Err(StaticRootError::Unavailable { .. })
        ));

        let file = dir.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            StaticRoot::new(&file),
            Err(StaticRootError::NotDirectory(_))
        ));
    }

    #[test]
    fn test_contains_is_component_wise() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        fs::create_dir(dir.path().join("database")).unwrap();
        let root = StaticRoot::new(dir.path().join("data")).unwrap();

        let sibling = root.as_path().parent().unwrap().join("database/secret");
        assert!(!root.contains(&sibling));
        assert!(root.contains(root.as_path()));
        assert!(root.contains(&root.as_path().join("file.png")));
    }

    #[test]
    fn test_join_skips_empty_and_current_segments() {
        let (_dir, root) = fixture();
        let joined = root.join("/nested//./clip.mp4").unwrap();
        assert_eq!(joined, root.as_path().join("nested").join("clip.mp4"));
    }

    #[test]
    fn test_join_rejects_parent_segments() {
        let (_dir, root) = fixture();
        assert_eq!(
            root.join("nested/../../etc/passwd"),
            Err(DeliveryError::invalid("non_normal_component"))
        );
    }

    #[tokio::test]
    async fn test_resolve_existing_file() {
        let (_dir, root) = fixture();
        let resolved = root.resolve("nested/clip.mp4").await.unwrap();
        assert!(root.contains(resolved.as_path()));
        assert_eq!(resolved.file_name(), "clip.mp4");
    }

    #[tokio::test]
    async fn test_resolve_missing_and_directories_are_not_found() {
        let (_dir, root) = fixture();
        assert_eq!(root.resolve("missing.png").await, Err(DeliveryError::FileNotFound));
        assert_eq!(root.resolve("nested").await, Err(DeliveryError::FileNotFound));
        assert_eq!(root.resolve("").await, Err(DeliveryError::FileNotFound));
    }

    #[tokio::test]
    async fn test_trailing_separator_on_file_is_not_found() {
        let (_dir, root) = fixture();
        for relative in ["photo.jpg/", "photo.jpg/.", "photo.jpg//", "nested/clip.mp4/./"] {
            assert_eq!(
                root.resolve(relative).await,
                Err(DeliveryError::FileNotFound),
                "{relative}"
            );
        }
        assert!(root.resolve("nested//clip.mp4").await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_rejected() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), b"secret").unwrap();

        let (dir, root) = fixture();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), dir.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();

        assert_eq!(
            root.resolve("link.txt").await,
            Err(DeliveryError::invalid("sandbox_escape"))
        );
        assert_eq!(
            root.resolve("escape/secret.txt").await,
            Err(DeliveryError::invalid("sandbox_escape"))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_inside_root_is_followed() {
        let (dir, root) = fixture();
        std::os::unix::fs::symlink(dir.path().join("photo.jpg"), dir.path().join("alias.jpg"))
            .unwrap();
        let resolved = root.resolve("alias.jpg").await.unwrap();
        assert_eq!(resolved.file_name(), "photo.jpg");
    }
}
