//! Request path normalization.
//!
//! # Responsibilities
//! - Collect every representation of the request path we can obtain
//! - Percent-decode each representation exactly once
//! - Treat malformed escapes and non-UTF-8 results as violations
//!
//! # Design Decisions
//! - The raw URI path and the framework-extracted path are both kept, since
//!   either layer may normalize some attack forms and not others
//! - Decoding is never recursive; double encoding is caught by signatures
//!   on the pre-decode strings instead

use percent_encoding::percent_decode_str;

use super::error::DeliveryError;

/// The path portion of a request, below the mount prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    /// Exactly as received on the wire, possibly percent-encoded.
    pub raw: String,
    /// As produced by the framework's path extractor. `None` when the
    /// framework refused to extract it.
    pub normalized: Option<String>,
}

impl RequestPath {
    pub fn new(raw: impl Into<String>, normalized: Option<String>) -> Self {
        Self {
            raw: raw.into(),
            normalized,
        }
    }

    /// Build from a raw path alone, deriving the normalized form by decoding.
    /// Used where no framework extractor sits in front of the pipeline.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = percent_decode_str(&raw)
            .decode_utf8()
            .ok()
            .map(|s| s.into_owned());
        Self { raw, normalized }
    }
}

/// Output of normalization: every form to scan, plus the path to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    /// Distinct forms in inspection order: raw, normalized, decoded raw,
    /// decoded normalized.
    pub forms: Vec<String>,
    /// The single-decoded raw path, used for dotfile and sandbox checks.
    pub relative: String,
}

/// Produce the ordered, de-duplicated set of forms for `path`.
pub fn normalize(path: &RequestPath) -> Result<NormalizedPath, DeliveryError> {
    let normalized = path
        .normalized
        .as_deref()
        .ok_or(DeliveryError::invalid("framework_rejected"))?;

    let decoded_raw = decode_once(&path.raw)?;
    let decoded_normalized = decode_once(normalized)?;

    let mut forms: Vec<String> = Vec::with_capacity(4);
    for form in [
        path.raw.as_str(),
        normalized,
        decoded_raw.as_str(),
        decoded_normalized.as_str(),
    ] {
        if !forms.iter().any(|f| f == form) {
            forms.push(form.to_string());
        }
    }

    Ok(NormalizedPath {
        forms,
        relative: decoded_raw,
    })
}

/// Percent-decode a string a single time.
pub fn decode_once(input: &str) -> Result<String, DeliveryError> {
    if has_malformed_escape(input) {
        return Err(DeliveryError::invalid("malformed_escape"));
    }
    percent_decode_str(input)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| DeliveryError::invalid("invalid_utf8"))
}

/// `%` not followed by two hex digits.
fn has_malformed_escape(input: &str) -> bool {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return true;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_has_single_form() {
        let path = RequestPath::from_raw("images/photo.jpg");
        let normalized = normalize(&path).unwrap();
        assert_eq!(normalized.forms, vec!["images/photo.jpg".to_string()]);
        assert_eq!(normalized.relative, "images/photo.jpg");
    }

    #[test]
    fn test_encoded_path_yields_raw_and_decoded() {
        let path = RequestPath::from_raw("..%2F..%2Fetc%2Fpasswd");
        let normalized = normalize(&path).unwrap();
        assert_eq!(normalized.forms[0], "..%2F..%2Fetc%2Fpasswd");
        assert!(normalized.forms.contains(&"../../etc/passwd".to_string()));
        assert_eq!(normalized.relative, "../../etc/passwd");
    }

    #[test]
    fn test_double_encoding_decoded_once_per_form() {
        // raw: %252e%252e, framework: %2e%2e, decoded framework: ..
        let path = RequestPath::new("%252e%252e/x", Some("%2e%2e/x".to_string()));
        let normalized = normalize(&path).unwrap();
        assert_eq!(
            normalized.forms,
            vec![
                "%252e%252e/x".to_string(),
                "%2e%2e/x".to_string(),
                "../x".to_string(),
            ]
        );
        assert_eq!(normalized.relative, "%2e%2e/x");
    }

    #[test]
    fn test_malformed_escape_is_rejected() {
        for raw in ["bad%zzname.png", "trailing%", "short%2"] {
            let err = decode_once(raw).unwrap_err();
            assert_eq!(err, DeliveryError::invalid("malformed_escape"), "{raw}");
        }
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = decode_once("%c0%ae%c0%ae").unwrap_err();
        assert_eq!(err, DeliveryError::invalid("invalid_utf8"));
    }

    #[test]
    fn test_missing_framework_form_is_rejected() {
        let path = RequestPath::new("photo.jpg", None);
        assert_eq!(
            normalize(&path).unwrap_err(),
            DeliveryError::invalid("framework_rejected")
        );
    }

    #[test]
    fn test_utf8_filenames_survive() {
        let path = RequestPath::from_raw("caf%C3%A9.png");
        let normalized = normalize(&path).unwrap();
        assert_eq!(normalized.relative, "café.png");
    }
}
