#![deny(missing_docs)]

//! # Content Handlers
//!
//! Turns raw payload bytes into a content tree and back.
//! A handler is picked from the declared media type; when the media type is
//! absent or does not name JSON or XML, the payload is sniffed and each
//! plausible format is tried in turn.

use crate::error::{PayloadError, PayloadResult};
use crate::tree::Node;
use std::fmt;
use tracing::debug;

/// JSON handler.
pub mod json;

/// Media type parsing.
pub mod media;

/// XML handler.
pub mod xml;

pub use json::JsonContentHandler;
pub use media::MediaType;
pub use xml::XmlContentHandler;

/// The payload formats the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// JSON.
    Json,
    /// XML.
    Xml,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Json => write!(f, "JSON"),
            ContentKind::Xml => write!(f, "XML"),
        }
    }
}

/// Indentation unit detected from a pretty-printed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    /// The indent byte (space or tab).
    pub ch: u8,
    /// How many of `ch` make one level.
    pub width: usize,
}

impl Default for Indent {
    fn default() -> Self {
        Indent { ch: b' ', width: 2 }
    }
}

/// Whether a document was written compactly or pretty-printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormattingStyle {
    /// No insignificant line breaks.
    Compact,
    /// One element per line, indented.
    Pretty(Indent),
}

impl FormattingStyle {
    /// Detects the style of `payload`.
    ///
    /// Any line break inside the trimmed document marks it as pretty printed
    /// (raw line breaks cannot occur inside JSON strings). The indent unit is
    /// taken from the first indented line.
    pub fn detect(payload: &[u8]) -> FormattingStyle {
        let trimmed = trim_ascii(payload);
        if !trimmed.contains(&b'\n') {
            return FormattingStyle::Compact;
        }

        let indent = trimmed
            .split(|b| *b == b'\n')
            .skip(1)
            .find_map(|line| {
                let ch = *line.first()?;
                if ch != b' ' && ch != b'\t' {
                    return None;
                }
                let width = line.iter().take_while(|b| **b == ch).count();
                Some(Indent { ch, width })
            })
            .unwrap_or_default();

        FormattingStyle::Pretty(indent)
    }
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Parses and serializes one payload format.
pub trait ContentHandler {
    /// The format this handler implements.
    fn kind(&self) -> ContentKind;

    /// Parses `payload` into a content tree.
    ///
    /// Fails with `UnparsablePayload` when the bytes are not valid for this format.
    fn parse(&self, payload: &[u8]) -> PayloadResult<Node>;

    /// Serializes `node` in the given style.
    ///
    /// `name` is the key the node was found under; formats that need a named
    /// root (XML) use it, others ignore it.
    fn serialize(
        &self,
        node: &Node,
        name: Option<&str>,
        style: FormattingStyle,
    ) -> PayloadResult<Vec<u8>>;

    /// Detects the formatting style of a source document.
    fn detect_style(&self, payload: &[u8]) -> FormattingStyle {
        FormattingStyle::detect(payload)
    }
}

/// A payload parsed by the handler that accepted it.
pub struct ParsedContent {
    handler: Box<dyn ContentHandler>,
    tree: Node,
    style: FormattingStyle,
}

impl ParsedContent {
    /// Which format the payload was parsed as.
    pub fn content_kind(&self) -> ContentKind {
        self.handler.kind()
    }

    /// The parsed tree.
    pub fn tree(&self) -> &Node {
        &self.tree
    }

    /// The formatting style of the original payload.
    pub fn style(&self) -> FormattingStyle {
        self.style
    }

    /// Serializes `node` with the same handler and style as the original payload.
    pub fn serialize(&self, node: &Node, name: Option<&str>) -> PayloadResult<Vec<u8>> {
        self.handler.serialize(node, name, self.style)
    }

    /// Consumes the content, returning the tree.
    pub fn into_tree(self) -> Node {
        self.tree
    }
}

fn handler_for(kind: ContentKind) -> Box<dyn ContentHandler> {
    match kind {
        ContentKind::Json => Box::new(JsonContentHandler),
        ContentKind::Xml => Box::new(XmlContentHandler),
    }
}

/// Orders candidate formats by the first significant byte of the payload.
fn sniff(payload: &[u8]) -> [ContentKind; 2] {
    match trim_ascii(payload).first() {
        Some(b'<') => [ContentKind::Xml, ContentKind::Json],
        _ => [ContentKind::Json, ContentKind::Xml],
    }
}

/// Parses `payload` with the handler selected for `media_type`.
///
/// A media type declaring JSON or XML is binding. Otherwise the payload is
/// sniffed and every format is tried, most plausible first. Fails with
/// `UnparsablePayload` if no handler can interpret the bytes.
pub fn for_content(payload: &[u8], media_type: Option<&str>) -> PayloadResult<ParsedContent> {
    let declared = media_type
        .and_then(MediaType::parse)
        .and_then(|m| m.content_kind());

    if let Some(kind) = declared {
        debug!(media_type = ?media_type, %kind, "content kind declared by media type");
        let handler = handler_for(kind);
        let tree = handler.parse(payload)?;
        let style = handler.detect_style(payload);
        return Ok(ParsedContent {
            handler,
            tree,
            style,
        });
    }

    let mut failures = Vec::new();
    for kind in sniff(payload) {
        let handler = handler_for(kind);
        match handler.parse(payload) {
            Ok(tree) => {
                debug!(media_type = ?media_type, %kind, "content kind sniffed");
                let style = handler.detect_style(payload);
                return Ok(ParsedContent {
                    handler,
                    tree,
                    style,
                });
            }
            Err(err) => failures.push(err.to_string()),
        }
    }

    Err(PayloadError::unparsable("JSON or XML", failures.join("; ")))
}
