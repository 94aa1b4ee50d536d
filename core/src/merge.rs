#![deny(missing_docs)]

//! # Structural Merge
//!
//! Folds several candidate nodes (the elements an array marker or wildcard
//! expanded to) into one representative node, recording every relative path
//! whose presence or shape is not shared by all candidates.
//!
//! Rules:
//! - objects merge key-wise; a key missing from some candidates is divergent
//!   and left out of the result
//! - arrays merge element-wise when all have the same length
//! - leaves take the first candidate's value (comparison is structural only)
//! - a divergent node reports itself and all of its descendants
//!
//! Divergences are accumulated, never short-circuited; deciding which of them
//! are acceptable is up to the caller.

use crate::path::Segment;
use crate::tree::Node;
use indexmap::{IndexMap, IndexSet};
use tracing::trace;

/// Result of merging a set of candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    /// The representative node.
    pub node: Node,
    /// Relative paths that diverge, in discovery order, without duplicates.
    pub divergent: Vec<Vec<Segment>>,
}

/// Merges `candidates`, where `None` marks a candidate that lacks the field.
///
/// Returns `None` if every candidate is absent. When some are absent the root
/// itself is divergent, and the present ones are still merged.
pub fn merge_candidates(candidates: &[Option<&Node>]) -> Option<Merged> {
    let present: Vec<&Node> = candidates.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }

    let mut merger = Merger::default();
    let mut at = Vec::new();
    if present.len() < candidates.len() {
        merger.diverge_all(&present, &at);
    }
    let node = merger.merge_present(&present, &mut at);

    Some(Merged {
        node,
        divergent: merger.divergent.into_iter().collect(),
    })
}

#[derive(Default)]
struct Merger {
    divergent: IndexSet<Vec<Segment>>,
}

impl Merger {
    fn merge(&mut self, candidates: &[Option<&Node>], at: &mut Vec<Segment>) -> Option<Node> {
        let present: Vec<&Node> = candidates.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }
        if present.len() < candidates.len() {
            self.diverge_all(&present, at);
            return None;
        }
        Some(self.merge_present(&present, at))
    }

    /// `present` is never empty.
    fn merge_present(&mut self, present: &[&Node], at: &mut Vec<Segment>) -> Node {
        let first = present[0];

        if let Some(objects) = all_objects(present) {
            let keys: IndexSet<&String> = objects.iter().flat_map(|o| o.keys()).collect();
            let mut merged = IndexMap::new();
            for key in keys {
                let children: Vec<Option<&Node>> = objects.iter().map(|o| o.get(key)).collect();
                at.push(Segment::Key(key.clone()));
                if let Some(child) = self.merge(&children, at) {
                    merged.insert(key.clone(), child);
                }
                at.pop();
            }
            return Node::Object(merged);
        }

        if let Some(arrays) = all_arrays(present) {
            let len = arrays[0].len();
            if arrays.iter().all(|a| a.len() == len) {
                let mut merged = Vec::with_capacity(len);
                at.push(Segment::Array);
                for index in 0..len {
                    let elements: Vec<&Node> = arrays.iter().map(|a| &a[index]).collect();
                    merged.push(self.merge_present(&elements, at));
                }
                at.pop();
                return Node::Array(merged);
            }
            self.diverge_here(at);
            return first.clone();
        }

        if present.iter().all(|n| matches!(n, Node::Leaf(_))) {
            return first.clone();
        }

        // Mixed shapes.
        self.diverge_all(present, at);
        first.clone()
    }

    fn diverge_here(&mut self, at: &[Segment]) {
        if self.divergent.insert(at.to_vec()) {
            trace!(path = %crate::path::display_segments(at), "divergent path");
        }
    }

    /// Records `at` and every path below it in any of `nodes`.
    fn diverge_all(&mut self, nodes: &[&Node], at: &[Segment]) {
        for node in nodes {
            node.walk(&mut |relative: &[Segment], _: &Node| {
                let mut path = at.to_vec();
                path.extend_from_slice(relative);
                self.diverge_here(&path);
            });
        }
    }
}

fn all_objects<'a>(nodes: &[&'a Node]) -> Option<Vec<&'a IndexMap<String, Node>>> {
    nodes
        .iter()
        .map(|&n| match n {
            Node::Object(entries) => Some(entries),
            _ => None,
        })
        .collect()
}

fn all_arrays<'a>(nodes: &[&'a Node]) -> Option<Vec<&'a Vec<Node>>> {
    nodes
        .iter()
        .map(|&n| match n {
            Node::Array(items) => Some(items),
            _ => None,
        })
        .collect()
}
