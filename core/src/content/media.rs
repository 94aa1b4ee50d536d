#![deny(missing_docs)]

//! # Media Types
//!
//! Minimal media type parsing used to pick a content handler. Parameters such
//! as `charset` are ignored; structured syntax suffixes (`+json`, `+xml`) are
//! honoured.

use crate::content::ContentKind;
use regex::Regex;
use std::sync::OnceLock;

/// A parsed `type/subtype[+suffix]` media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    /// Top-level type, e.g. `application`.
    pub top_level: String,
    /// Subtype without suffix, e.g. `hal` for `application/hal+json`.
    pub subtype: String,
    /// Structured syntax suffix, e.g. `json`.
    pub suffix: Option<String>,
}

impl MediaType {
    /// Parses a media type string, lower-casing it.
    ///
    /// Returns `None` when the string is not of the form `type/subtype`.
    pub fn parse(raw: &str) -> Option<MediaType> {
        static MEDIA_RE: OnceLock<Regex> = OnceLock::new();
        let media_re = MEDIA_RE.get_or_init(|| {
            Regex::new(r"^\s*([a-z0-9!#$&^_.-]+)/([a-z0-9!#$&^_.-]+)(?:\+([a-z0-9!#$&^_.-]+))?\s*(?:;.*)?$")
                .expect("Invalid regex")
        });

        let lowered = raw.to_ascii_lowercase();
        let caps = media_re.captures(&lowered)?;
        Some(MediaType {
            top_level: caps[1].to_string(),
            subtype: caps[2].to_string(),
            suffix: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }

    /// The content kind this media type declares, if it declares one.
    ///
    /// `application/json`, `text/json` and `*/*+json` map to JSON;
    /// `application/xml`, `text/xml` and `*/*+xml` map to XML. Anything else
    /// is ambiguous.
    pub fn content_kind(&self) -> Option<ContentKind> {
        let syntax = self.suffix.as_deref().unwrap_or(&self.subtype);
        match syntax {
            "json" => Some(ContentKind::Json),
            "xml" => Some(ContentKind::Xml),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_types() {
        let json = MediaType::parse("application/json").unwrap();
        assert_eq!(json.content_kind(), Some(ContentKind::Json));

        let xml = MediaType::parse("text/xml").unwrap();
        assert_eq!(xml.content_kind(), Some(ContentKind::Xml));
    }

    #[test]
    fn test_suffix_and_parameters() {
        let hal = MediaType::parse("application/hal+json;charset=UTF-8").unwrap();
        assert_eq!(hal.subtype, "hal");
        assert_eq!(hal.suffix.as_deref(), Some("json"));
        assert_eq!(hal.content_kind(), Some(ContentKind::Json));

        let atom = MediaType::parse("Application/Atom+XML").unwrap();
        assert_eq!(atom.content_kind(), Some(ContentKind::Xml));
    }

    #[test]
    fn test_ambiguous_and_invalid() {
        let text = MediaType::parse("text/plain").unwrap();
        assert_eq!(text.content_kind(), None);
        assert!(MediaType::parse("json").is_none());
        assert!(MediaType::parse("").is_none());
    }
}
