//! Traversal signature detection.
//!
//! # Responsibilities
//! - Scan every path form for traversal and escape signatures
//! - Report the first matching signature name (for logs only)
//!
//! # Design Decisions
//! - Signatures are data: extend [`SIGNATURES`], not the control flow
//! - All patterns are case-insensitive and compiled once into a `RegexSet`
//! - Encoded fragments are matched on pre-decode forms too, so a form that
//!   would only become dangerous after a second decode is still rejected

use regex::{RegexSet, RegexSetBuilder};

use super::error::DeliveryError;

/// A named traversal pattern.
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub name: &'static str,
    pub pattern: &'static str,
}

/// Signatures checked against every path form. Any match rejects.
pub const SIGNATURES: &[Signature] = &[
    Signature { name: "parent_reference", pattern: r"\.\." },
    Signature { name: "home_directory", pattern: r"~" },
    Signature { name: "nul_byte", pattern: r"\x00" },
    Signature { name: "reserved_char", pattern: r#"[<>:"|?*\\]"# },
    Signature { name: "encoded_dot", pattern: r"%2e(?:\.|%2e)|\.%2e" },
    Signature { name: "encoded_backslash", pattern: r"%5c" },
    Signature { name: "encoded_nul", pattern: r"%00" },
    Signature { name: "double_encoding", pattern: r"%25[0-9a-f]{2}" },
    Signature { name: "overlong_utf8", pattern: r"%c0%ae|%c0%af|%c1%9c|%e0%80%ae" },
];

/// Compiled signature table.
#[derive(Debug, Clone)]
pub struct TraversalDetector {
    set: RegexSet,
    signatures: &'static [Signature],
}

impl TraversalDetector {
    /// Compile the built-in signature table.
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_signatures(SIGNATURES)
    }

    pub fn with_signatures(signatures: &'static [Signature]) -> Result<Self, regex::Error> {
        let set = RegexSetBuilder::new(signatures.iter().map(|s| s.pattern))
            .case_insensitive(true)
            .build()?;
        Ok(Self { set, signatures })
    }

    /// Name of the first signature matching `form`, if any.
    pub fn first_match(&self, form: &str) -> Option<&'static str> {
        self.set
            .matches(form)
            .iter()
            .next()
            .map(|idx| self.signatures[idx].name)
    }

    /// Scan all forms; the first hit is a terminal `InvalidPath`.
    pub fn scan<S: AsRef<str>>(&self, forms: &[S]) -> Result<(), DeliveryError> {
        for form in forms {
            if let Some(name) = self.first_match(form.as_ref()) {
                return Err(DeliveryError::invalid(name));
            }
        }
        Ok(())
    }
}
