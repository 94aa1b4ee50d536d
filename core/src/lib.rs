#![deny(missing_docs)]

//! # Payload Paths Core
//!
//! Field path resolution over JSON and XML payloads: extracting the
//! subsection a path designates, and resolving a single type per path even
//! when the path crosses arrays whose elements differ.

/// Shared error types.
pub mod error;

/// Field path grammar.
pub mod path;

/// Format-neutral content tree.
pub mod tree;

/// Path matching over content trees.
pub mod matcher;

/// JSON / XML parsing and serialization.
pub mod content;

/// Field descriptors and optional declarations.
pub mod descriptor;

/// Structural merge of array elements.
pub mod merge;

/// Subsection extraction.
pub mod extractor;

/// Field type resolution.
pub mod resolver;

pub use content::{
    for_content, ContentHandler, ContentKind, FormattingStyle, Indent, JsonContentHandler,
    MediaType, ParsedContent, XmlContentHandler,
};
pub use descriptor::{FieldDescriptor, OptionalFields, PathDescriptor};
pub use error::{PayloadError, PayloadResult, UncommonPaths};
pub use extractor::{extract_subsection, SubsectionExtractor};
pub use matcher::{match_positions, Location, Match, Step};
pub use merge::{merge_candidates, Merged};
pub use path::{FieldPath, Segment};
pub use resolver::{FieldType, FieldTypeResolver, TypeMap};
pub use tree::{Leaf, Node, NodeKind};
