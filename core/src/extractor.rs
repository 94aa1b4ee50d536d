#![deny(missing_docs)]

//! # Subsection Extraction
//!
//! Cuts the part of a payload a field path designates and serializes it in
//! the payload's own format and formatting style.
//!
//! When the path fans out (through `[]` or `*`), or ends on a non-empty array,
//! the matched nodes are merged into one representative node. Structure that
//! differs between them must be covered by an optional descriptor, otherwise
//! extraction fails listing every uncommon path.

use crate::content::{self, ParsedContent};
use crate::descriptor::{FieldDescriptor, OptionalFields, PathDescriptor};
use crate::error::{PayloadError, PayloadResult, UncommonPaths};
use crate::matcher::{match_branches, Branch, Match};
use crate::merge::merge_candidates;
use crate::path::{FieldPath, Segment};
use crate::tree::Node;
use tracing::debug;

/// Extracts the subsection identified by one field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsectionExtractor {
    path: FieldPath,
    subsection_id: String,
}

impl SubsectionExtractor {
    /// Creates an extractor for `path`.
    ///
    /// Fails with `MalformedPath` if the expression is invalid.
    pub fn new(path: &str) -> PayloadResult<Self> {
        let path = FieldPath::parse(path)?;
        let subsection_id = default_subsection_id(&path);
        Ok(SubsectionExtractor {
            path,
            subsection_id,
        })
    }

    /// Overrides the identifier snippet writers use to name the subsection.
    pub fn with_subsection_id(mut self, subsection_id: impl Into<String>) -> Self {
        self.subsection_id = subsection_id.into();
        self
    }

    /// Identifier of the subsection; defaults to the path without array markers.
    pub fn subsection_id(&self) -> &str {
        &self.subsection_id
    }

    /// The field path being extracted.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Extracts the subsection without any optional declarations.
    pub fn extract(&self, payload: &[u8], media_type: Option<&str>) -> PayloadResult<Vec<u8>> {
        self.extract_with_descriptors::<FieldDescriptor>(payload, media_type, &[])
    }

    /// Extracts the subsection, tolerating divergence covered by `descriptors`.
    ///
    /// Descriptor paths are relative to the subsection: `d` covers `a.[].b.d`
    /// when extracting `a.[].b`.
    pub fn extract_with_descriptors<D: PathDescriptor>(
        &self,
        payload: &[u8],
        media_type: Option<&str>,
        descriptors: &[D],
    ) -> PayloadResult<Vec<u8>> {
        let optional = OptionalFields::from_descriptors(descriptors)?;
        let content = content::for_content(payload, media_type)?;
        let (subsection, name) = self.subsection(&content, &optional)?;
        content.serialize(&subsection, name.as_deref())
    }

    /// Locates and merges the subsection; returns it with its element name.
    fn subsection(
        &self,
        content: &ParsedContent,
        optional: &OptionalFields,
    ) -> PayloadResult<(Node, Option<String>)> {
        let branches = match_branches(content.tree(), &self.path);
        let first = branches
            .iter()
            .find_map(|branch| match branch {
                Branch::Present(m) => Some(m),
                Branch::Absent(_) => None,
            })
            .ok_or_else(|| PayloadError::PathNotFound(self.path.to_string()))?;
        debug!(
            path = %self.path,
            branches = branches.len(),
            first = %first.location,
            style = ?content.style(),
            "extracting subsection"
        );

        let candidates: Vec<Option<&Node>> = match branches.as_slice() {
            [Branch::Present(Match { node, .. })] if node.is_empty_array() => {
                return Err(PayloadError::EmptySection(self.path.to_string()));
            }
            [Branch::Present(Match { node, .. })] => match node {
                Node::Array(items) => items.iter().map(Some).collect(),
                node => vec![Some(*node)],
            },
            _ => branches.iter().map(Branch::node).collect(),
        };

        let name = first.location.last_key().map(str::to_string);
        Ok((self.merge(&candidates, optional)?, name))
    }

    fn merge(
        &self,
        candidates: &[Option<&Node>],
        optional: &OptionalFields,
    ) -> PayloadResult<Node> {
        if let [Some(only)] = candidates {
            return Ok((*only).clone());
        }

        let merged = merge_candidates(candidates)
            .ok_or_else(|| PayloadError::PathNotFound(self.path.to_string()))?;

        let uncommon = UncommonPaths::new(
            merged
                .divergent
                .iter()
                .filter(|relative| !optional.covers(relative))
                .map(|relative| self.path.join(relative).to_string())
                .collect(),
        );

        if !uncommon.is_empty() {
            debug!(path = %self.path, %uncommon, "uncommon paths found");
            return Err(uncommon.into());
        }
        Ok(merged.node)
    }
}

fn default_subsection_id(path: &FieldPath) -> String {
    let kept: Vec<Segment> = path
        .segments()
        .iter()
        .filter(|s| **s != Segment::Array)
        .cloned()
        .collect();
    crate::path::display_segments(&kept)
}

/// Extracts the subsection of `payload` identified by `path`.
///
/// Convenience wrapper around `SubsectionExtractor`.
pub fn extract_subsection<D: PathDescriptor>(
    payload: &[u8],
    media_type: Option<&str>,
    path: &str,
    descriptors: &[D],
) -> PayloadResult<Vec<u8>> {
    SubsectionExtractor::new(path)?.extract_with_descriptors(payload, media_type, descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: Option<&str> = Some("application/json");

    fn extract(payload: &str, path: &str) -> PayloadResult<serde_json::Value> {
        let bytes = SubsectionExtractor::new(path)?.extract(payload.as_bytes(), JSON)?;
        Ok(serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_single_match_taken_as_is() {
        let value = extract(r#"{"a":{"b":{"c":5}}}"#, "a.b").unwrap();
        assert_eq!(value, serde_json::json!({"c": 5}));
    }

    #[test]
    fn test_single_element_array_collapses() {
        let via_marker = extract(r#"{"a":[{"b":5}]}"#, "a.[]").unwrap();
        let via_array = extract(r#"{"a":[{"b":5}]}"#, "a").unwrap();
        assert_eq!(via_marker, serde_json::json!({"b": 5}));
        assert_eq!(via_array, via_marker);
    }

    #[test]
    fn test_terminal_array_is_merged() {
        let value = extract(r#"{"a":[{"b":5},{"b":4}]}"#, "a").unwrap();
        assert_eq!(value, serde_json::json!({"b": 5}));
    }

    #[test]
    fn test_empty_and_missing_sections() {
        let err = extract(r#"{"a":[]}"#, "a").unwrap_err();
        assert_eq!(err, PayloadError::EmptySection("a".into()));

        let err = extract(r#"{"a":{"b":{"c":5}}}"#, "a.c").unwrap_err();
        assert_eq!(err.to_string(), "a.c does not identify a section of the payload");
    }

    #[test]
    fn test_malformed_path() {
        let err = SubsectionExtractor::new("a..b").unwrap_err();
        assert!(matches!(err, PayloadError::MalformedPath { .. }));
    }

    #[test]
    fn test_subsection_id() {
        let extractor = SubsectionExtractor::new("a.[].b").unwrap();
        assert_eq!(extractor.subsection_id(), "a.b");
        let renamed = extractor.with_subsection_id("items");
        assert_eq!(renamed.subsection_id(), "items");
        assert_eq!(renamed.path().to_string(), "a.[].b");
    }

    #[test]
    fn test_optional_wildcard_descriptor_covers_divergence() {
        let payload = br#"{"a":[{"b":{"x":{"id":1}}},{"b":{"x":{"id":2,"ref":"r"}}}]}"#;
        let bytes = extract_subsection(
            payload,
            JSON,
            "a.[].b",
            &[FieldDescriptor::new("*.ref").optional()],
        )
        .unwrap();
        assert_eq!(bytes, br#"{"x":{"id":1}}"#);
    }
}
