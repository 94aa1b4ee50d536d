#![deny(missing_docs)]

//! # Field Paths
//!
//! Parses dotted field path expressions such as `a.[].b` or `*.d` into an
//! immutable sequence of segments.
//!
//! Grammar:
//! - segments are separated by `.`
//! - `*` matches any single key at that level
//! - `[]` descends into every element of an array
//! - `items[]` is shorthand for `items.[]`

use crate::error::{PayloadError, PayloadResult};
use std::fmt;
use std::str::FromStr;

const WILDCARD: &str = "*";
const ARRAY: &str = "[]";

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A literal object key.
    Key(String),
    /// `*`: any key of an object.
    Wildcard,
    /// `[]`: every element of an array.
    Array,
}

impl Segment {
    /// Whether this segment can expand to more than one position.
    pub fn is_expanding(&self) -> bool {
        !matches!(self, Segment::Key(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{}", key),
            Segment::Wildcard => write!(f, "{}", WILDCARD),
            Segment::Array => write!(f, "{}", ARRAY),
        }
    }
}

/// A parsed field path, root first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Parses a dotted expression.
    ///
    /// Fails with `MalformedPath` if the expression is empty or any segment
    /// between dots is empty (e.g. `a..b`).
    pub fn parse(expression: &str) -> PayloadResult<Self> {
        if expression.is_empty() {
            return Err(malformed(expression, "the expression is empty"));
        }

        let mut segments = Vec::new();
        for (index, token) in expression.split('.').enumerate() {
            if token.is_empty() {
                return Err(malformed(
                    expression,
                    &format!("segment {} is empty", index + 1),
                ));
            }
            push_token(&mut segments, token);
        }

        Ok(FieldPath { segments })
    }

    /// Builds a path from already-validated segments.
    pub(crate) fn from_segments(segments: Vec<Segment>) -> Self {
        FieldPath { segments }
    }

    /// The segments, root first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// A path is precise when it can match at most one position.
    pub fn is_precise(&self) -> bool {
        self.segments.iter().all(|s| !s.is_expanding())
    }

    /// Returns a new path with `relative` appended.
    pub fn join(&self, relative: &[Segment]) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.extend_from_slice(relative);
        FieldPath { segments }
    }
}

/// Splits `items[]` / `items[][]` into a key followed by array markers.
fn push_token(segments: &mut Vec<Segment>, token: &str) {
    let mut stem = token;
    let mut arrays = 0;
    while stem.len() > ARRAY.len() && stem.ends_with(ARRAY) {
        stem = &stem[..stem.len() - ARRAY.len()];
        arrays += 1;
    }

    segments.push(match stem {
        WILDCARD => Segment::Wildcard,
        ARRAY => Segment::Array,
        key => Segment::Key(key.to_string()),
    });
    segments.extend(std::iter::repeat(Segment::Array).take(arrays));
}

fn malformed(expression: &str, reason: &str) -> PayloadError {
    PayloadError::MalformedPath {
        path: expression.to_string(),
        reason: reason.to_string(),
    }
}

/// Renders segments in canonical dotted form.
pub(crate) fn display_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(Segment::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", display_segments(&self.segments))
    }
}

impl FromStr for FieldPath {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}
