//! Request path limits.
//!
//! # Responsibilities
//! - Bound the raw path length before any decoding work happens
//!
//! # Design Decisions
//! - Overlong paths are reported as `InvalidPath`, like every other
//!   malformed path, so the response set stays fixed

use super::error::DeliveryError;

/// Default upper bound on the raw relative path, in bytes.
pub const DEFAULT_MAX_PATH_LENGTH: usize = 1024;

pub fn check_path_length(raw: &str, max: usize) -> Result<(), DeliveryError> {
    if raw.len() > max {
        tracing::debug!(length = raw.len(), max, "Request path too long");
        return Err(DeliveryError::invalid("path_too_long"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_length_boundary() {
        let at_limit = "a".repeat(16);
        assert!(check_path_length(&at_limit, 16).is_ok());

        let over = "a".repeat(17);
        assert_eq!(
            check_path_length(&over, 16),
            Err(DeliveryError::invalid("path_too_long"))
        );
    }
}
