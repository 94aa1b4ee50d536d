#![deny(missing_docs)]

//! # Content Tree
//!
//! Format-neutral representation of a parsed payload. Handlers produce it,
//! the matcher, merger and resolver consume it. Trees are never mutated after
//! parsing; extraction builds new nodes.

use crate::path::Segment;
use indexmap::IndexMap;
use serde_json::Number;
use std::fmt;

/// A node of a parsed payload.
///
/// Equality is structural: objects compare key-wise, arrays index-wise.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Ordered key to node mapping.
    Object(IndexMap<String, Node>),
    /// Ordered sequence of nodes.
    Array(Vec<Node>),
    /// A scalar or null.
    Leaf(Leaf),
}

/// A scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    /// A string.
    String(String),
    /// A number, kept in its parsed JSON representation.
    Number(Number),
    /// A boolean.
    Boolean(bool),
    /// Null (or an empty XML element).
    Null,
}

/// The concrete shape of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An object.
    Object,
    /// An array.
    Array,
    /// A string leaf.
    String,
    /// A number leaf.
    Number,
    /// A boolean leaf.
    Boolean,
    /// A null leaf.
    Null,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Null => "null",
        };
        write!(f, "{}", name)
    }
}

impl Node {
    /// The shape of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Object(_) => NodeKind::Object,
            Node::Array(_) => NodeKind::Array,
            Node::Leaf(Leaf::String(_)) => NodeKind::String,
            Node::Leaf(Leaf::Number(_)) => NodeKind::Number,
            Node::Leaf(Leaf::Boolean(_)) => NodeKind::Boolean,
            Node::Leaf(Leaf::Null) => NodeKind::Null,
        }
    }

    /// Looks up a key if this node is an object.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Object(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Returns `true` for an array with no elements.
    pub fn is_empty_array(&self) -> bool {
        matches!(self, Node::Array(items) if items.is_empty())
    }

    /// Convenience constructor for a string leaf.
    pub fn string(value: impl Into<String>) -> Node {
        Node::Leaf(Leaf::String(value.into()))
    }

    /// Visits this node and every descendant with its path relative to `self`.
    ///
    /// Array elements are reported under the `[]` segment, so elements of the
    /// same array share a path. Parents are visited before their children.
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&[Segment], &Node),
    {
        let mut at = Vec::new();
        walk_from(self, &mut at, visit);
    }
}

fn walk_from<F>(node: &Node, at: &mut Vec<Segment>, visit: &mut F)
where
    F: FnMut(&[Segment], &Node),
{
    visit(at.as_slice(), node);
    match node {
        Node::Object(entries) => {
            for (key, child) in entries {
                at.push(Segment::Key(key.clone()));
                walk_from(child, at, visit);
                at.pop();
            }
        }
        Node::Array(items) => {
            for item in items {
                at.push(Segment::Array);
                walk_from(item, at, visit);
                at.pop();
            }
        }
        Node::Leaf(_) => {}
    }
}
