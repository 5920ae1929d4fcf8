//! Element parser
//!
//! One recursive-descent routine per element kind, all following the same
//! discipline:
//!
//! 1. Scan attributes against the element's [`ElementSpec`]: namespaced or
//!    gated-out attributes are unexpected, and the required set must be
//!    empty afterwards.
//! 2. Declare the resource name in its scope's name set.
//! 3. Scan children against the same spec: unknown or gated-out children are
//!    unexpected, at-most-once children may not repeat, required children
//!    must be seen.
//! 4. Push one operation into the scope's bucket.
//!
//! Routines live in `impl ElementParser` blocks split by element family.

mod document;
mod filter;
mod formatters;
mod handlers;
mod loggers;

use logconf_model::{AttributeMap, ModelValue, OperationList};

use crate::codec::{scalar_definition, AttributeCodec, AttributeDefinition, CodecError};
use crate::config::ParserConfig;
use crate::cursor::{StartElement, XmlAttribute, XmlCursor};
use crate::error::ParseError;
use crate::schema::SchemaVersion;
use crate::vocabulary::{Attribute, Element, ElementSpec, Occurs};

/// Outcome of a successful parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Version of the root element's namespace
    pub version: SchemaVersion,
    /// Operations in emission order
    pub operations: OperationList,
}

/// Parse a document into its operation list
///
/// # Errors
/// Returns the first [`ParseError`]; no partial result is produced
pub fn parse(source: &str, config: &ParserConfig) -> Result<OperationList, ParseError> {
    parse_document(source, config).map(|document| document.operations)
}

/// Parse a document, also reporting the detected schema version
///
/// # Errors
/// Returns the first [`ParseError`]; no partial result is produced
pub fn parse_document(source: &str, config: &ParserConfig) -> Result<ParsedDocument, ParseError> {
    ElementParser {
        cursor: XmlCursor::new(source, config.max_depth),
        config,
    }
    .document()
}

struct ElementParser<'a> {
    cursor: XmlCursor<'a>,
    config: &'a ParserConfig,
}

/// Attributes that passed the legality scan
struct Attributes(Vec<(Attribute, XmlAttribute)>);

impl Attributes {
    fn get(&self, attribute: Attribute) -> Option<&XmlAttribute> {
        self.0
            .iter()
            .find(|(a, _)| *a == attribute)
            .map(|(_, xml)| xml)
    }

    fn require(&self, attribute: Attribute, start: &StartElement) -> Result<&XmlAttribute, ParseError> {
        self.get(attribute)
            .ok_or_else(|| ParseError::MissingRequiredAttributes {
                element: start.name.clone(),
                attributes: vec![attribute.local_name().to_string()],
                position: start.position,
            })
    }

    fn iter(&self) -> impl Iterator<Item = &(Attribute, XmlAttribute)> {
        self.0.iter()
    }
}

fn scan_attributes(
    start: &StartElement,
    spec: &ElementSpec,
    version: SchemaVersion,
) -> Result<Attributes, ParseError> {
    let mut scanned = Vec::with_capacity(start.attributes.len());
    for attr in &start.attributes {
        let attribute = Attribute::for_name(&attr.name);
        if attr.namespace.is_some() || spec.attribute(attribute, version).is_none() {
            return Err(unexpected_attribute(start, attr));
        }
        scanned.push((attribute, attr.clone()));
    }

    let missing: Vec<String> = spec
        .required_attributes(version)
        .filter(|required| !scanned.iter().any(|(seen, _)| seen == required))
        .map(|a| a.local_name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ParseError::MissingRequiredAttributes {
            element: start.name.clone(),
            attributes: missing,
            position: start.position,
        });
    }
    Ok(Attributes(scanned))
}

impl ElementParser<'_> {
    /// Walk the children of `parent`, enforcing its child rules
    fn children<F>(
        &mut self,
        parent: &StartElement,
        spec: &ElementSpec,
        version: SchemaVersion,
        mut visit: F,
    ) -> Result<(), ParseError>
    where
        F: FnMut(&mut Self, Element, StartElement) -> Result<(), ParseError>,
    {
        let mut seen: Vec<Element> = Vec::new();
        while let Some(child) = self.cursor.next_child()? {
            same_namespace(parent, &child)?;
            let element = Element::for_name(&child.name);
            let Some(rule) = spec.child(element, version) else {
                return Err(unexpected_element(&child));
            };
            if rule.occurs != Occurs::Repeated && seen.contains(&element) {
                return Err(ParseError::DuplicateElement {
                    element: child.name,
                    position: child.position,
                });
            }
            seen.push(element);
            visit(self, element, child)?;
        }

        let missing: Vec<String> = spec
            .required_children(version)
            .filter(|required| !seen.contains(required))
            .map(|e| e.local_name().to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ParseError::MissingRequiredElements {
                element: parent.name.clone(),
                elements: missing,
                position: parent.position,
            })
        }
    }

    /// Read a single-attribute leaf element and its end tag
    fn leaf(&mut self, start: StartElement) -> Result<XmlAttribute, ParseError> {
        let expected = Element::for_name(&start.name).leaf_attribute();
        let mut found = None;
        for attr in &start.attributes {
            if attr.namespace.is_some() || Attribute::for_name(&attr.name) != expected {
                return Err(unexpected_attribute(&start, attr));
            }
            found = Some(attr.clone());
        }
        let attr = found.ok_or_else(|| ParseError::MissingRequiredAttributes {
            element: start.name.clone(),
            attributes: vec![expected.local_name().to_string()],
            position: start.position,
        })?;
        self.cursor.expect_end()?;
        Ok(attr)
    }
}

/// Nested children must stay in their parent's namespace
fn same_namespace(parent: &StartElement, child: &StartElement) -> Result<(), ParseError> {
    if child.namespace == parent.namespace {
        Ok(())
    } else {
        Err(unexpected_element(child))
    }
}

fn unexpected_element(start: &StartElement) -> ParseError {
    ParseError::unexpected_element(start.name.clone(), start.position)
}

fn unexpected_attribute(start: &StartElement, attr: &XmlAttribute) -> ParseError {
    ParseError::UnexpectedAttribute {
        element: start.name.clone(),
        attribute: attr.name.clone(),
        position: attr.position,
    }
}

fn decode(definition: &AttributeDefinition, attr: &XmlAttribute) -> Result<ModelValue, ParseError> {
    definition.decode(&attr.value).map_err(|err| match err {
        CodecError::Invalid(message) => ParseError::Validation {
            attribute: definition.name.to_string(),
            value: attr.value.clone(),
            message,
            position: attr.position,
        },
        CodecError::Render(err) => ParseError::Validation {
            attribute: definition.name.to_string(),
            value: attr.value.clone(),
            message: err.to_string(),
            position: attr.position,
        },
        CodecError::Grammar(source) => ParseError::Grammar {
            source,
            position: attr.position,
        },
    })
}

/// Decode every attribute that maps onto a model attribute
fn decode_scalars(attributes: &Attributes, values: &mut AttributeMap) -> Result<(), ParseError> {
    for (attribute, xml) in attributes.iter() {
        if let Some(definition) = scalar_definition(*attribute) {
            values.insert(definition.name.to_string(), decode(definition, xml)?);
        }
    }
    Ok(())
}
