//! Hidden-file guard.
//!
//! Runs after traversal detection, so `.` and `..` never reach it as a
//! meaningful basename; they are still excluded here to keep the guard
//! self-contained.

use super::error::DeliveryError;

/// Last `/`-separated segment that names something, skipping empty and
/// `.` segments the sandbox join would drop.
pub fn basename(path: &str) -> &str {
    path.rsplit('/')
        .find(|s| !s.is_empty() && *s != ".")
        .unwrap_or("")
}

/// Whether a single path segment names a hidden file.
pub fn is_dotfile(segment: &str) -> bool {
    segment.len() > 1 && segment.starts_with('.') && segment != ".."
}

/// Reject when the final path segment is a dotfile.
pub fn check(path: &str) -> Result<(), DeliveryError> {
    let name = basename(path);
    if is_dotfile(name) {
        tracing::debug!(segment = %name, "Dotfile request blocked");
        return Err(DeliveryError::DotfileAccessDenied);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("a/b/c.png"), "c.png");
        assert_eq!(basename("c.png"), "c.png");
        assert_eq!(basename("a/b/"), "b");
        assert_eq!(basename("a/b/./"), "b");
        assert_eq!(basename(".env//."), ".env");
        assert_eq!(basename(""), "");
        assert_eq!(basename("./"), "");
    }

    #[test]
    fn test_dotfiles_rejected() {
        for path in [
            ".env",
            ".htaccess",
            "config/.git",
            "a/b/.DS_Store",
            ".x",
            ".env/",
            ".env/.",
            ".env//",
            "config/.git/./",
        ] {
            assert_eq!(check(path), Err(DeliveryError::DotfileAccessDenied), "{path}");
        }
    }

    #[test]
    fn test_non_dotfiles_pass() {
        for path in ["photo.jpg", "a/.hidden/photo.jpg", "a/b.", ".", "..", "dir/", ""] {
            assert!(check(path).is_ok(), "{path}");
        }
    }
}
