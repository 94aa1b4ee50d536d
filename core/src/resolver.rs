#![deny(missing_docs)]

//! # Field Type Resolution
//!
//! Determines the single type a field path has across every position it
//! matches. Positions reached through arrays may disagree; disagreement is
//! reported as `FieldType::Varies` rather than as an error, except that
//! absence and `null` are forgiven for fields declared optional.

use crate::content::{self, ContentKind};
use crate::descriptor::{FieldDescriptor, OptionalFields, PathDescriptor};
use crate::error::{PayloadError, PayloadResult};
use crate::matcher::match_branches;
use crate::path::{FieldPath, Segment};
use crate::tree::{Node, NodeKind};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// The resolved type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// An array.
    Array,
    /// A boolean.
    Boolean,
    /// An object.
    Object,
    /// A number.
    Number,
    /// Null.
    Null,
    /// A string.
    String,
    /// Different positions hold different types.
    Varies,
}

impl From<NodeKind> for FieldType {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Object => FieldType::Object,
            NodeKind::Array => FieldType::Array,
            NodeKind::String => FieldType::String,
            NodeKind::Number => FieldType::Number,
            NodeKind::Boolean => FieldType::Boolean,
            NodeKind::Null => FieldType::Null,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Array => "array",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Number => "number",
            FieldType::Null => "null",
            FieldType::String => "string",
            FieldType::Varies => "varies",
        };
        write!(f, "{}", name)
    }
}

/// Field path (canonical form) to resolved type, in discovery order.
pub type TypeMap = IndexMap<String, FieldType>;

/// Resolves field types against one parsed payload.
#[derive(Debug, Clone)]
pub struct FieldTypeResolver {
    content_kind: ContentKind,
    tree: Node,
    optional: OptionalFields,
}

impl FieldTypeResolver {
    /// Parses `payload` with no optional declarations.
    pub fn for_content(payload: &[u8], media_type: Option<&str>) -> PayloadResult<Self> {
        Self::for_content_with_descriptors::<FieldDescriptor>(payload, media_type, &[])
    }

    /// Parses `payload`, remembering which of `descriptors` are optional.
    ///
    /// Descriptor paths are absolute. Fails with `UnparsablePayload` when no
    /// handler accepts the content.
    pub fn for_content_with_descriptors<D: PathDescriptor>(
        payload: &[u8],
        media_type: Option<&str>,
        descriptors: &[D],
    ) -> PayloadResult<Self> {
        let optional = OptionalFields::from_descriptors(descriptors)?;
        let content = content::for_content(payload, media_type)?;
        Ok(FieldTypeResolver {
            content_kind: content.content_kind(),
            tree: content.into_tree(),
            optional,
        })
    }

    /// Whether the payload was parsed as JSON or XML.
    pub fn content_kind(&self) -> ContentKind {
        self.content_kind
    }

    /// Resolves the type at `path`.
    ///
    /// Fails with `PathNotFound` if the path matches nothing.
    pub fn resolve_type(&self, path: &str) -> PayloadResult<FieldType> {
        let path = FieldPath::parse(path)?;
        self.resolve_path(&path, false)
    }

    /// Resolves a descriptor's path, honouring its own optional flag.
    pub fn resolve_field<D: PathDescriptor>(&self, descriptor: &D) -> PayloadResult<FieldType> {
        let path = FieldPath::parse(descriptor.path())?;
        self.resolve_path(&path, descriptor.is_optional())
    }

    /// Resolves every distinct field path of the document.
    ///
    /// Array positions are generalized to `[]`, so all elements of an array
    /// contribute to the same entry.
    pub fn resolve_all(&self) -> PayloadResult<TypeMap> {
        let mut paths: IndexSet<Vec<Segment>> = IndexSet::new();
        self.tree.walk(&mut |path: &[Segment], _: &Node| {
            if !path.is_empty() {
                paths.insert(path.to_vec());
            }
        });

        let mut types = TypeMap::new();
        for segments in paths {
            let path = FieldPath::from_segments(segments);
            let resolved = self.resolve_path(&path, false)?;
            types.insert(path.to_string(), resolved);
        }
        Ok(types)
    }

    fn resolve_path(&self, path: &FieldPath, declared_optional: bool) -> PayloadResult<FieldType> {
        let optional = declared_optional || self.optional.covers(path.segments());

        let mut observed = Observed::default();
        for branch in match_branches(&self.tree, path) {
            match branch.node() {
                Some(node) => {
                    observed.kinds.insert(node.kind());
                }
                None => observed.absent = true,
            }
        }

        if observed.kinds.is_empty() {
            return Err(PayloadError::PathNotFound(path.to_string()));
        }

        let resolved = observed.coalesce(optional);
        debug!(path = %path, optional, %resolved, "resolved field type");
        Ok(resolved)
    }
}

/// Kinds seen at the positions of one path.
#[derive(Default)]
struct Observed {
    kinds: IndexSet<NodeKind>,
    absent: bool,
}

impl Observed {
    fn coalesce(mut self, optional: bool) -> FieldType {
        if self.absent && !optional {
            return FieldType::Varies;
        }
        if optional && self.kinds.len() > 1 {
            self.kinds.shift_remove(&NodeKind::Null);
        }
        match self.kinds.iter().next() {
            Some(kind) if self.kinds.len() == 1 => FieldType::from(*kind),
            _ => FieldType::Varies,
        }
    }
}
