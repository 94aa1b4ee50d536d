#![deny(missing_docs)]

//! # XML Content
//!
//! Maps simple XML payloads onto the same object shape JSON produces:
//!
//! - the root element becomes a single-key object
//! - attributes become `@name` keys
//! - child elements become keys, repeated siblings become an array
//! - text next to attributes or children is kept under `#text`
//! - a text-only element is a string leaf, an empty element is null
//!
//! Namespaces and mixed content are not interpreted.

use crate::content::{ContentHandler, ContentKind, FormattingStyle};
use crate::error::{PayloadError, PayloadResult};
use crate::tree::{Leaf, Node};
use indexmap::map::Entry;
use indexmap::IndexMap;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fmt;

const ATTRIBUTE_PREFIX: char = '@';
const TEXT_KEY: &str = "#text";

/// Handler for `application/xml`, `text/xml` and `+xml` payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlContentHandler;

impl ContentHandler for XmlContentHandler {
    fn kind(&self) -> ContentKind {
        ContentKind::Xml
    }

    fn parse(&self, payload: &[u8]) -> PayloadResult<Node> {
        let source = std::str::from_utf8(payload).map_err(xml_error)?;
        let mut reader = Reader::from_str(source);
        reader.trim_text(true);

        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<(String, Node)> = None;

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(start) => open.push(Element::open(&start)?),
                Event::Empty(start) => {
                    let element = Element::open(&start)?;
                    close(element, &mut open, &mut root)?;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| xml_error("closing tag without an open element"))?;
                    close(element, &mut open, &mut root)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(xml_error)?;
                    append_text(&mut open, &text)?;
                }
                Event::CData(data) => {
                    let text = String::from_utf8(data.into_inner().into_owned()).map_err(xml_error)?;
                    append_text(&mut open, &text)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype.
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(xml_error(format!("element '{}' is not closed", unclosed.name)));
        }
        let (name, node) = root.ok_or_else(|| xml_error("no root element"))?;

        let mut document = IndexMap::new();
        document.insert(name, node);
        Ok(Node::Object(document))
    }

    fn serialize(
        &self,
        node: &Node,
        name: Option<&str>,
        style: FormattingStyle,
    ) -> PayloadResult<Vec<u8>> {
        let mut writer = match style {
            FormattingStyle::Compact => Writer::new(Vec::new()),
            FormattingStyle::Pretty(indent) => {
                Writer::new_with_indent(Vec::new(), indent.ch, indent.width)
            }
        };

        match name {
            Some(name) if !is_synthetic_key(name) => write_element(&mut writer, name, node)?,
            // Attribute values and element text have no element of their own.
            _ => write_fragment(&mut writer, node)?,
        }
        Ok(writer.into_inner())
    }
}

/// An element whose end tag has not been read yet.
struct Element {
    name: String,
    attributes: IndexMap<String, Node>,
    children: IndexMap<String, Node>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> PayloadResult<Element> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(xml_error)?
            .to_string();

        let mut attributes = IndexMap::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(xml_error)?;
            let key = std::str::from_utf8(attribute.key.as_ref()).map_err(xml_error)?;
            let value = attribute.unescape_value().map_err(xml_error)?;
            attributes.insert(
                format!("{}{}", ATTRIBUTE_PREFIX, key),
                Node::string(value.into_owned()),
            );
        }

        Ok(Element {
            name,
            attributes,
            children: IndexMap::new(),
            text: String::new(),
        })
    }

    /// Children never parse to arrays themselves, so an array here always
    /// means the name was repeated.
    fn add_child(&mut self, name: String, node: Node) {
        match self.children.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(node);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Node::Array(items) => items.push(node),
                existing => {
                    let first = std::mem::replace(existing, Node::Array(Vec::new()));
                    *existing = Node::Array(vec![first, node]);
                }
            },
        }
    }

    fn finish(self) -> (String, Node) {
        if self.attributes.is_empty() && self.children.is_empty() {
            let leaf = if self.text.is_empty() {
                Leaf::Null
            } else {
                Leaf::String(self.text)
            };
            return (self.name, Node::Leaf(leaf));
        }

        let mut entries = self.attributes;
        entries.extend(self.children);
        if !self.text.is_empty() {
            entries.insert(TEXT_KEY.to_string(), Node::string(self.text));
        }
        (self.name, Node::Object(entries))
    }
}

fn close(
    element: Element,
    open: &mut [Element],
    root: &mut Option<(String, Node)>,
) -> PayloadResult<()> {
    let (name, node) = element.finish();
    match open.last_mut() {
        Some(parent) => parent.add_child(name, node),
        None if root.is_none() => *root = Some((name, node)),
        None => {
            return Err(xml_error(format!(
                "more than one root element ('{}')",
                name
            )))
        }
    }
    Ok(())
}

fn append_text(open: &mut [Element], text: &str) -> PayloadResult<()> {
    match open.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None => Err(xml_error(format!(
            "text outside the root element: '{}'",
            text.trim()
        ))),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, node: &Node) -> PayloadResult<()> {
    match node {
        Node::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        Node::Leaf(Leaf::Null) => emit(writer, Event::Empty(BytesStart::new(name))),
        Node::Leaf(leaf) => {
            emit(writer, Event::Start(BytesStart::new(name)))?;
            emit(writer, Event::Text(BytesText::new(&leaf_text(leaf))))?;
            emit(writer, Event::End(BytesEnd::new(name)))
        }
        Node::Object(entries) => {
            let mut start = BytesStart::new(name);
            let mut text = None;
            let mut children = Vec::new();

            for (key, child) in entries {
                match (key.strip_prefix(ATTRIBUTE_PREFIX), child) {
                    (Some(attribute), Node::Leaf(leaf)) => {
                        start.push_attribute((attribute, leaf_text(leaf).as_str()));
                    }
                    (_, Node::Leaf(leaf)) if key == TEXT_KEY => text = Some(leaf_text(leaf)),
                    _ => children.push((key, child)),
                }
            }

            if text.is_none() && children.is_empty() {
                return emit(writer, Event::Empty(start));
            }

            emit(writer, Event::Start(start))?;
            if let Some(text) = text {
                emit(writer, Event::Text(BytesText::new(&text)))?;
            }
            for (key, child) in children {
                write_element(writer, key, child)?;
            }
            emit(writer, Event::End(BytesEnd::new(name)))
        }
    }
}

/// Writes a node that has no element name of its own.
fn write_fragment(writer: &mut Writer<Vec<u8>>, node: &Node) -> PayloadResult<()> {
    match node {
        Node::Object(entries) => {
            for (key, child) in entries {
                write_element(writer, key, child)?;
            }
            Ok(())
        }
        Node::Array(items) => {
            for item in items {
                write_fragment(writer, item)?;
            }
            Ok(())
        }
        Node::Leaf(leaf) => emit(writer, Event::Text(BytesText::new(&leaf_text(leaf)))),
    }
}

/// Keys the parser invents for attributes and text; never element names.
fn is_synthetic_key(key: &str) -> bool {
    key.starts_with(ATTRIBUTE_PREFIX) || key == TEXT_KEY
}

fn leaf_text(leaf: &Leaf) -> String {
    match leaf {
        Leaf::String(s) => s.clone(),
        Leaf::Number(n) => n.to_string(),
        Leaf::Boolean(b) => b.to_string(),
        Leaf::Null => String::new(),
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> PayloadResult<()> {
    writer
        .write_event(event)
        .map_err(|e| PayloadError::unwritable(ContentKind::Xml.to_string(), e))
}

fn xml_error(cause: impl fmt::Display) -> PayloadError {
    PayloadError::unparsable(ContentKind::Xml.to_string(), cause)
}
