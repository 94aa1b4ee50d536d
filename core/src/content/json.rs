#![deny(missing_docs)]

//! # JSON Content
//!
//! Bridges `serde_json::Value` (with `preserve_order`) and the content tree.
//!
//! Numbers keep their source text (`arbitrary_precision`), so values wider
//! than 64 bits survive extraction unchanged. Only the first JSON value of a
//! payload is read; anything after it is ignored.

use crate::content::{ContentHandler, ContentKind, FormattingStyle};
use crate::error::{PayloadError, PayloadResult};
use crate::tree::{Leaf, Node};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fmt;

/// Handler for `application/json` and `+json` payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonContentHandler;

impl ContentHandler for JsonContentHandler {
    fn kind(&self) -> ContentKind {
        ContentKind::Json
    }

    fn parse(&self, payload: &[u8]) -> PayloadResult<Node> {
        let value = serde_json::Deserializer::from_slice(payload)
            .into_iter::<Value>()
            .next()
            .ok_or_else(|| json_error("no JSON value found"))?
            .map_err(json_error)?;
        Ok(Node::from(value))
    }

    fn serialize(
        &self,
        node: &Node,
        _name: Option<&str>,
        style: FormattingStyle,
    ) -> PayloadResult<Vec<u8>> {
        let value = Value::from(node);
        let written = match style {
            FormattingStyle::Compact => serde_json::to_vec(&value),
            FormattingStyle::Pretty(indent) => {
                to_vec_indented(&value, &vec![indent.ch; indent.width])
            }
        };
        written.map_err(|e| PayloadError::unwritable(ContentKind::Json.to_string(), e))
    }
}

fn to_vec_indented(value: &Value, unit: &[u8]) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(unit);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

fn json_error(cause: impl fmt::Display) -> PayloadError {
    PayloadError::unparsable(ContentKind::Json.to_string(), cause)
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(entries) => Node::Object(
                entries
                    .into_iter()
                    .map(|(key, child)| (key, Node::from(child)))
                    .collect(),
            ),
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::String(s) => Node::Leaf(Leaf::String(s)),
            Value::Number(n) => Node::Leaf(Leaf::Number(n)),
            Value::Bool(b) => Node::Leaf(Leaf::Boolean(b)),
            Value::Null => Node::Leaf(Leaf::Null),
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, child) in entries {
                    map.insert(key.clone(), Value::from(child));
                }
                Value::Object(map)
            }
            Node::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            Node::Leaf(Leaf::String(s)) => Value::String(s.clone()),
            Node::Leaf(Leaf::Number(n)) => Value::Number(n.clone()),
            Node::Leaf(Leaf::Boolean(b)) => Value::Bool(*b),
            Node::Leaf(Leaf::Null) => Value::Null,
        }
    }
}
