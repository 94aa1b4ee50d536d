#![deny(missing_docs)]

//! # Field Descriptors
//!
//! The engine only needs two things from a documented field: its path and
//! whether it is optional. Richer descriptor types owned by documentation
//! layers implement `PathDescriptor` to plug in.

use crate::error::PayloadResult;
use crate::path::{FieldPath, Segment};
use serde::{Deserialize, Serialize};

/// Read-only view of a documented field.
pub trait PathDescriptor {
    /// The field path expression.
    fn path(&self) -> &str;

    /// Whether the field may be absent.
    fn is_optional(&self) -> bool;
}

impl<T: PathDescriptor + ?Sized> PathDescriptor for &T {
    fn path(&self) -> &str {
        (**self).path()
    }

    fn is_optional(&self) -> bool {
        (**self).is_optional()
    }
}

/// A minimal owned descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// The field path expression.
    pub path: String,
    /// Whether the field may be absent.
    #[serde(default)]
    pub optional: bool,
}

impl FieldDescriptor {
    /// A required field at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        FieldDescriptor {
            path: path.into(),
            optional: false,
        }
    }

    /// Marks the field as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl PathDescriptor for FieldDescriptor {
    fn path(&self) -> &str {
        &self.path
    }

    fn is_optional(&self) -> bool {
        self.optional
    }
}

/// The parsed paths of every optional descriptor.
#[derive(Debug, Clone, Default)]
pub struct OptionalFields {
    paths: Vec<FieldPath>,
}

impl OptionalFields {
    /// Collects the optional descriptors. Fails if one has a malformed path.
    pub fn from_descriptors<D: PathDescriptor>(descriptors: &[D]) -> PayloadResult<Self> {
        let paths = descriptors
            .iter()
            .filter(|d| d.is_optional())
            .map(|d| FieldPath::parse(d.path()))
            .collect::<PayloadResult<Vec<_>>>()?;
        Ok(OptionalFields { paths })
    }

    /// Whether `path` is declared optional, directly or through an ancestor.
    ///
    /// A `*` segment in a declaration matches any key.
    pub fn covers(&self, path: &[Segment]) -> bool {
        self.paths.iter().any(|declared| {
            let declared = declared.segments();
            declared.len() <= path.len()
                && declared.iter().zip(path).all(|(d, p)| {
                    d == p || (*d == Segment::Wildcard && matches!(p, Segment::Key(_)))
                })
        })
    }
}
