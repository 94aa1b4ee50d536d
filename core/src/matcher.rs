#![deny(missing_docs)]

//! # Path Matching
//!
//! Resolves a `FieldPath` against a content tree. Wildcards and array markers
//! fan out into one branch per key or element; shape mismatches prune the
//! branch silently. The caller decides whether zero matches is an error.

use crate::path::{FieldPath, Segment};
use crate::tree::Node;
use std::fmt;

/// One concrete step taken while matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// An object key.
    Key(String),
    /// An array index.
    Index(usize),
}

/// The concrete route from the root to a matched position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location(Vec<Step>);

impl Location {
    /// The innermost object key on this route, if any.
    pub fn last_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|step| match step {
            Step::Key(key) => Some(key.as_str()),
            Step::Index(_) => None,
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            match step {
                Step::Key(key) if i == 0 => write!(f, "{}", key)?,
                Step::Key(key) => write!(f, ".{}", key)?,
                Step::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// A node the path resolved to, with the route that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    /// Concrete location (wildcards and markers replaced by keys and indices).
    pub location: Location,
    /// The matched node.
    pub node: &'a Node,
}

/// Outcome of one traversal branch.
///
/// A branch is `Absent` when a literal key is missing from an object that was
/// reached through a wildcard or array expansion: the sibling branches found
/// the field, this one did not.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Branch<'a> {
    Present(Match<'a>),
    Absent(Location),
}

impl<'a> Branch<'a> {
    pub(crate) fn node(&self) -> Option<&'a Node> {
        match self {
            Branch::Present(m) => Some(m.node),
            Branch::Absent(_) => None,
        }
    }
}

/// Returns every node `path` resolves to, in document order.
pub fn match_positions<'a>(tree: &'a Node, path: &FieldPath) -> Vec<Match<'a>> {
    match_branches(tree, path)
        .into_iter()
        .filter_map(|branch| match branch {
            Branch::Present(m) => Some(m),
            Branch::Absent(_) => None,
        })
        .collect()
}

/// Like `match_positions`, but keeps absent branches.
pub(crate) fn match_branches<'a>(tree: &'a Node, path: &FieldPath) -> Vec<Branch<'a>> {
    let mut branches = Vec::new();
    descend(tree, path.segments(), &mut Vec::new(), false, &mut branches);
    branches
}

fn descend<'a>(
    node: &'a Node,
    remaining: &[Segment],
    at: &mut Vec<Step>,
    expanded: bool,
    out: &mut Vec<Branch<'a>>,
) {
    let Some((segment, rest)) = remaining.split_first() else {
        out.push(Branch::Present(Match {
            location: Location(at.clone()),
            node,
        }));
        return;
    };

    match (segment, node) {
        (Segment::Key(key), Node::Object(entries)) => match entries.get(key) {
            Some(child) => {
                at.push(Step::Key(key.clone()));
                descend(child, rest, at, expanded, out);
                at.pop();
            }
            None if expanded => {
                let mut location = at.clone();
                location.push(Step::Key(key.clone()));
                out.push(Branch::Absent(Location(location)));
            }
            None => {}
        },
        (Segment::Wildcard, Node::Object(entries)) => {
            for (key, child) in entries {
                at.push(Step::Key(key.clone()));
                descend(child, rest, at, true, out);
                at.pop();
            }
        }
        (Segment::Array, Node::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                at.push(Step::Index(index));
                descend(item, rest, at, true, out);
                at.pop();
            }
        }
        // Shape mismatch: prune.
        _ => {}
    }
}
