//! Forward-only XML cursor
//!
//! Thin layer over `quick_xml::NsReader` that resolves namespaces eagerly,
//! attaches a [`Position`] to every start tag and attribute, and tracks
//! nesting depth. Comments, processing instructions and whitespace-only text
//! are skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::{ParseError, Position};
use crate::extension::RawElement;

/// Attribute of a start tag
#[derive(Debug, Clone)]
pub(crate) struct XmlAttribute {
    pub(crate) namespace: Option<String>,
    pub(crate) name: String,
    pub(crate) value: String,
    pub(crate) position: Position,
}

/// Start tag with resolved names
#[derive(Debug, Clone)]
pub(crate) struct StartElement {
    pub(crate) namespace: Option<String>,
    pub(crate) name: String,
    pub(crate) attributes: Vec<XmlAttribute>,
    pub(crate) position: Position,
}

#[derive(Debug)]
pub(crate) enum Node {
    Start(StartElement),
    End,
    Text(String, Position),
    Eof,
}

pub(crate) struct XmlCursor<'a> {
    reader: NsReader<&'a [u8]>,
    source: &'a str,
    depth: usize,
    max_depth: usize,
}

impl<'a> XmlCursor<'a> {
    pub(crate) fn new(source: &'a str, max_depth: usize) -> Self {
        let mut reader = NsReader::from_str(source);
        reader.trim_text(true);
        reader.expand_empty_elements(true);
        Self {
            reader,
            source,
            depth: 0,
            max_depth,
        }
    }

    fn locate(&self, offset: usize) -> Position {
        Position::locate(self.source, offset)
    }

    fn here(&self) -> Position {
        self.locate(self.reader.buffer_position())
    }

    pub(crate) fn next_node(&mut self) -> Result<Node, ParseError> {
        loop {
            let before = self.reader.buffer_position();
            let read = self
                .reader
                .read_resolved_event()
                .map(|(resolved, event)| (owned_namespace(&resolved), event));
            let (namespace, event) = match read {
                Ok(read) => read,
                Err(err) => return Err(ParseError::xml(err.to_string(), self.here())),
            };
            let end = self.reader.buffer_position();

            match event {
                Event::Start(start) => {
                    let offset = self.source[before..end]
                        .find('<')
                        .map_or(before, |i| before + i);
                    let position = self.locate(offset);
                    let namespace = namespace
                        .map_err(|prefix| unbound_prefix(&prefix, position))?;
                    self.depth += 1;
                    if self.depth > self.max_depth {
                        return Err(ParseError::xml(
                            format!("element nesting exceeds {}", self.max_depth),
                            position,
                        ));
                    }
                    let element = self.start_element(&start, namespace, offset, end, position)?;
                    return Ok(Node::Start(element));
                }
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(Node::End);
                }
                Event::Text(text) => {
                    let position = self.locate(before);
                    let text = text
                        .unescape()
                        .map_err(|err| ParseError::xml(err.to_string(), position))?;
                    if text.trim().is_empty() {
                        continue;
                    }
                    return Ok(Node::Text(text.trim().to_string(), position));
                }
                Event::CData(data) => {
                    let position = self.locate(before);
                    let text = String::from_utf8(data.into_inner().into_owned())
                        .map_err(|err| ParseError::xml(err.to_string(), position))?;
                    return Ok(Node::Text(text, position));
                }
                Event::Eof => return Ok(Node::Eof),
                // Comment, Decl, PI, DocType; Empty never occurs with expansion on
                _ => {}
            }
        }
    }

    fn start_element(
        &self,
        start: &BytesStart<'_>,
        namespace: Option<String>,
        offset: usize,
        end: usize,
        position: Position,
    ) -> Result<StartElement, ParseError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let raw_tag = &self.source[offset..end.max(offset)];
        let mut offsets = attribute_offsets(raw_tag).into_iter();
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|err| ParseError::xml(err.to_string(), position))?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let attr_position = offsets
                .by_ref()
                .find(|(raw_key, _)| raw_key.as_bytes() == key)
                .map_or(position, |(_, i)| self.locate(offset + i));

            let (resolved, local) = self.reader.resolve_attribute(attr.key);
            let attr_namespace =
                owned_namespace(&resolved).map_err(|p| unbound_prefix(&p, attr_position))?;
            let value = attr
                .unescape_value()
                .map_err(|err| ParseError::xml(err.to_string(), attr_position))?
                .into_owned();

            attributes.push(XmlAttribute {
                namespace: attr_namespace,
                name: String::from_utf8_lossy(local.as_ref()).into_owned(),
                value,
                position: attr_position,
            });
        }

        Ok(StartElement {
            namespace,
            name,
            attributes,
            position,
        })
    }

    /// First start tag of the document
    pub(crate) fn root(&mut self) -> Result<StartElement, ParseError> {
        match self.next_node()? {
            Node::Start(start) => Ok(start),
            Node::Text(_, position) => Err(ParseError::xml("text before root element", position)),
            Node::End | Node::Eof => Err(ParseError::xml("document has no root element", self.here())),
        }
    }

    /// Next child start tag, `None` once the parent's end tag is consumed
    pub(crate) fn next_child(&mut self) -> Result<Option<StartElement>, ParseError> {
        match self.next_node()? {
            Node::Start(start) => Ok(Some(start)),
            Node::End => Ok(None),
            Node::Text(_, position) => Err(ParseError::xml("unexpected text content", position)),
            Node::Eof => Err(ParseError::xml("unexpected end of document", self.here())),
        }
    }

    /// Consume the end tag of an element that must have no children
    pub(crate) fn expect_end(&mut self) -> Result<(), ParseError> {
        match self.next_child()? {
            None => Ok(()),
            Some(child) => Err(ParseError::unexpected_element(child.name, child.position)),
        }
    }

    /// Require that nothing but trailing markup follows the root
    pub(crate) fn finish(&mut self) -> Result<(), ParseError> {
        match self.next_node()? {
            Node::Eof => Ok(()),
            Node::Start(start) => Err(ParseError::unexpected_element(start.name, start.position)),
            Node::Text(_, position) => Err(ParseError::xml("text after root element", position)),
            Node::End => Err(ParseError::xml("unbalanced end tag", self.here())),
        }
    }

    /// Read the rest of `start`'s subtree into a [`RawElement`]
    pub(crate) fn capture(&mut self, start: StartElement) -> Result<RawElement, ParseError> {
        let mut element = RawElement {
            namespace: start.namespace,
            name: start.name,
            attributes: start
                .attributes
                .into_iter()
                .map(|attr| (attr.name, attr.value))
                .collect(),
            children: Vec::new(),
            text: String::new(),
            position: start.position,
        };
        loop {
            match self.next_node()? {
                Node::Start(child) => element.children.push(self.capture(child)?),
                Node::Text(text, _) => {
                    if !element.text.is_empty() {
                        element.text.push(' ');
                    }
                    element.text.push_str(&text);
                }
                Node::End => return Ok(element),
                Node::Eof => {
                    return Err(ParseError::xml("unexpected end of document", self.here()))
                }
            }
        }
    }
}

/// Name and byte offset of every attribute in a raw start tag, in order
///
/// Expects markup quick-xml has already accepted; values are skipped whole
/// so names inside them are never matched.
fn attribute_offsets(tag: &str) -> Vec<(&str, usize)> {
    let bytes = tag.as_bytes();
    let mut offsets = Vec::new();
    let mut i = bytes
        .iter()
        .position(u8::is_ascii_whitespace)
        .unwrap_or(bytes.len());

    loop {
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        let start = i;
        while bytes
            .get(i)
            .is_some_and(|b| !b.is_ascii_whitespace() && !matches!(*b, b'=' | b'/' | b'>'))
        {
            i += 1;
        }
        if i == start {
            break;
        }
        offsets.push((&tag[start..i], start));

        while bytes.get(i).is_some_and(|b| *b != b'"' && *b != b'\'') {
            i += 1;
        }
        let Some(&quote) = bytes.get(i) else { break };
        i += 1;
        while bytes.get(i).is_some_and(|b| *b != quote) {
            i += 1;
        }
        i += 1;
    }
    offsets
}

/// `Ok(None)` for unbound, `Err(prefix)` for an undeclared prefix
fn owned_namespace(resolved: &ResolveResult<'_>) -> Result<Option<String>, String> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(String::from_utf8_lossy(prefix).into_owned()),
    }
}

fn unbound_prefix(prefix: &str, position: Position) -> ParseError {
    ParseError::xml(format!("undeclared namespace prefix '{prefix}'"), position)
}
