#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the unified `PayloadError` enum returned by every path, extraction
//! and resolution operation.

use derive_more::{Display, From};
use std::fmt;

/// The Global Error Enum.
///
/// Every variant is a plain value: none of them signal a broken invariant,
/// and none are retried or recovered internally.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum PayloadError {
    /// The field path expression is empty or contains an empty segment.
    #[from(ignore)]
    #[display("'{path}' is not a valid field path: {reason}")]
    MalformedPath {
        /// The expression as supplied by the caller.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The payload bytes cannot be interpreted by any applicable handler.
    #[from(ignore)]
    #[display("Cannot parse payload as {format}: {message}")]
    UnparsablePayload {
        /// The format(s) that were attempted (e.g. "JSON").
        format: String,
        /// The underlying parser message.
        message: String,
    },

    /// A subsection could not be written back in the payload's format.
    #[from(ignore)]
    #[display("Cannot write subsection as {format}: {message}")]
    UnwritableSubsection {
        /// The output format (e.g. "XML").
        format: String,
        /// The underlying writer message.
        message: String,
    },

    /// The path matches nothing in an otherwise valid payload.
    #[from(ignore)]
    #[display("{_0} does not identify a section of the payload")]
    PathNotFound(String),

    /// The path matches only an empty array.
    #[from(ignore)]
    #[display("{_0} identifies an empty section of the payload")]
    EmptySection(String),

    /// Merging found structural divergence not covered by an optional declaration.
    #[display("The following non-optional uncommon paths were found: {_0}")]
    UncommonStructure(UncommonPaths),
}

impl PayloadError {
    /// Builds an `UnparsablePayload` error from any displayable parser failure.
    pub(crate) fn unparsable(format: impl Into<String>, cause: impl fmt::Display) -> Self {
        PayloadError::UnparsablePayload {
            format: format.into(),
            message: cause.to_string(),
        }
    }

    /// Builds an `UnwritableSubsection` error from a serializer failure.
    pub(crate) fn unwritable(format: impl Into<String>, cause: impl fmt::Display) -> Self {
        PayloadError::UnwritableSubsection {
            format: format.into(),
            message: cause.to_string(),
        }
    }

    /// The field paths this error is about, in the order they were found.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            PayloadError::MalformedPath { path, .. } => vec![path.as_str()],
            PayloadError::UnparsablePayload { .. } | PayloadError::UnwritableSubsection { .. } => {
                Vec::new()
            }
            PayloadError::PathNotFound(path) | PayloadError::EmptySection(path) => {
                vec![path.as_str()]
            }
            PayloadError::UncommonStructure(uncommon) => {
                uncommon.iter().map(String::as_str).collect()
            }
        }
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for PayloadError {}

/// Ordered list of fully qualified paths that diverge across merged elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UncommonPaths(Vec<String>);

impl UncommonPaths {
    /// Wraps paths already sorted in discovery order.
    pub fn new(paths: Vec<String>) -> Self {
        UncommonPaths(paths)
    }

    /// Returns `true` when no uncommon path was found.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the paths in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for UncommonPaths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Helper type alias for Result using PayloadError.
pub type PayloadResult<T> = Result<T, PayloadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncommon_conversion() {
        let uncommon = UncommonPaths::new(vec!["a.[].b.d".into()]);
        let err: PayloadError = uncommon.into();
        assert!(matches!(err, PayloadError::UncommonStructure(_)));
        assert_eq!(
            err.to_string(),
            "The following non-optional uncommon paths were found: [a.[].b.d]"
        );
    }

    #[test]
    fn test_section_messages() {
        assert_eq!(
            PayloadError::PathNotFound("a.c".into()).to_string(),
            "a.c does not identify a section of the payload"
        );
        assert_eq!(
            PayloadError::EmptySection("a".into()).to_string(),
            "a identifies an empty section of the payload"
        );
    }

    #[test]
    fn test_paths_listing() {
        let err = PayloadError::UncommonStructure(UncommonPaths::new(vec![
            "*.d".into(),
            "*.d.e".into(),
        ]));
        assert_eq!(err.paths(), vec!["*.d", "*.d.e"]);

        let err = PayloadError::unparsable("XML", "no root element");
        assert!(err.paths().is_empty());
        assert_eq!(err.to_string(), "Cannot parse payload as XML: no root element");

        let err = PayloadError::unwritable("JSON", "io failure");
        assert!(err.paths().is_empty());
        assert_eq!(err.to_string(), "Cannot write subsection as JSON: io failure");
    }
}
