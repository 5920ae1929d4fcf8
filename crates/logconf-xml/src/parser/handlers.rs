//! Handler elements and the child fields shared with loggers

use logconf_model::{AttributeMap, ModelValue, Operation, PropertyMap, ResourceType, ScopeBuilder};
use tracing::debug;

use super::{
    decode, decode_scalars, scan_attributes, unexpected_element, ElementParser,
};
use crate::codec::{definitions as defs, file_value, leaf_definition};
use crate::cursor::StartElement;
use crate::error::ParseError;
use crate::schema::SchemaVersion;
use crate::vocabulary::{
    Attribute, Element, ElementSpec, FILE, HANDLER_FORMATTER, HANDLER_PATTERN_FORMATTER,
    HANDLER_REFS, PROPERTIES, PROPERTY, SYSLOG_FORMATTER,
};

/// Resource type created by a handler element
fn handler_resource(element: Element) -> Option<ResourceType> {
    Some(match element {
        Element::ConsoleHandler => ResourceType::ConsoleHandler,
        Element::FileHandler => ResourceType::FileHandler,
        Element::CustomHandler => ResourceType::CustomHandler,
        Element::PeriodicRotatingFileHandler => ResourceType::PeriodicRotatingFileHandler,
        Element::PeriodicSizeRotatingFileHandler => ResourceType::PeriodicSizeRotatingFileHandler,
        Element::SizeRotatingFileHandler => ResourceType::SizeRotatingFileHandler,
        Element::AsyncHandler => ResourceType::AsyncHandler,
        Element::SyslogHandler => ResourceType::SyslogHandler,
        _ => return None,
    })
}

impl ElementParser<'_> {
    /// Any handler kind; legality comes entirely from `spec`
    pub(super) fn handler(
        &mut self,
        spec: &'static ElementSpec,
        start: StartElement,
        version: SchemaVersion,
        scope: &mut ScopeBuilder,
    ) -> Result<(), ParseError> {
        let Some(resource) = handler_resource(spec.element) else {
            return Err(unexpected_element(&start));
        };
        let attributes = scan_attributes(&start, spec, version)?;
        let name = attributes.require(Attribute::Name, &start)?;
        scope
            .declare(resource, &name.value)
            .map_err(|err| ParseError::from_model(err, name.position))?;

        let mut values = AttributeMap::new();
        decode_scalars(&attributes, &mut values)?;
        self.children(&start, spec, version, |parser, element, child| {
            parser.field(spec.element, element, child, version, &mut values)
        })?;

        let address = scope.resource_address(resource, &name.value);
        debug!(address = %address, attributes = values.len(), "parsed handler");
        scope
            .push(Operation::new(address, values))
            .map_err(|err| ParseError::from_model(err, start.position))
    }

    /// One child of a handler or logger, stored under its model attribute
    pub(super) fn field(
        &mut self,
        owner: Element,
        element: Element,
        child: StartElement,
        version: SchemaVersion,
        values: &mut AttributeMap,
    ) -> Result<(), ParseError> {
        let (name, value) = match element {
            Element::Filter => (defs::FILTER_SPEC.name, self.legacy_filter(child, version)?),
            Element::Formatter if owner == Element::SyslogHandler => {
                (defs::SYSLOG_FORMAT.name, self.syslog_formatter(child, version)?)
            }
            Element::Formatter => self.handler_formatter(child, version)?,
            Element::File => (defs::FILE.name, self.file(child, version)?),
            Element::Properties => (defs::PROPERTIES.name, self.properties(child, version)?),
            Element::Handlers => (defs::HANDLERS.name, self.handler_refs(child, version)?),
            Element::Subhandlers => (defs::SUBHANDLERS.name, self.handler_refs(child, version)?),
            leaf => {
                let Some(definition) = leaf_definition(leaf) else {
                    return Err(unexpected_element(&child));
                };
                let attr = self.leaf(child)?;
                (definition.name, decode(definition, &attr)?)
            }
        };
        values.insert(name.to_string(), value);
        Ok(())
    }

    /// `formatter` of a handler: an inline pattern or a named reference
    fn handler_formatter(
        &mut self,
        start: StartElement,
        version: SchemaVersion,
    ) -> Result<(&'static str, ModelValue), ParseError> {
        scan_attributes(&start, &HANDLER_FORMATTER, version)?;
        let mut defined: Option<(&'static str, ModelValue)> = None;
        self.children(&start, &HANDLER_FORMATTER, version, |parser, element, child| {
            if defined.is_some() {
                return Err(unexpected_element(&child));
            }
            defined = Some(match element {
                Element::PatternFormatter => {
                    let attributes = scan_attributes(&child, &HANDLER_PATTERN_FORMATTER, version)?;
                    let pattern = decode(&defs::FORMATTER, attributes.require(Attribute::Pattern, &child)?)?;
                    parser.cursor.expect_end()?;
                    (defs::FORMATTER.name, pattern)
                }
                Element::NamedFormatter => {
                    let attr = parser.leaf(child)?;
                    (defs::NAMED_FORMATTER.name, decode(&defs::NAMED_FORMATTER, &attr)?)
                }
                _ => return Err(unexpected_element(&child)),
            });
            Ok(())
        })?;
        defined.ok_or_else(|| ParseError::MissingRequiredElements {
            element: start.name.clone(),
            elements: vec![
                Element::PatternFormatter.local_name().to_string(),
                Element::NamedFormatter.local_name().to_string(),
            ],
            position: start.position,
        })
    }

    /// `formatter` of a syslog handler, holding `syslog-format`
    fn syslog_formatter(
        &mut self,
        start: StartElement,
        version: SchemaVersion,
    ) -> Result<ModelValue, ParseError> {
        scan_attributes(&start, &SYSLOG_FORMATTER, version)?;
        let mut format = None;
        self.children(&start, &SYSLOG_FORMATTER, version, |parser, _, child| {
            let attr = parser.leaf(child)?;
            format = Some(decode(&defs::SYSLOG_FORMAT, &attr)?);
            Ok(())
        })?;
        format.ok_or_else(|| ParseError::MissingRequiredElements {
            element: start.name.clone(),
            elements: vec![Element::SyslogFormat.local_name().to_string()],
            position: start.position,
        })
    }

    fn file(&mut self, start: StartElement, version: SchemaVersion) -> Result<ModelValue, ParseError> {
        let attributes = scan_attributes(&start, &FILE, version)?;
        let path = attributes.require(Attribute::Path, &start)?.value.clone();
        let relative_to = attributes
            .get(Attribute::RelativeTo)
            .map(|attr| attr.value.clone());
        self.cursor.expect_end()?;
        Ok(file_value(path, relative_to))
    }

    /// `properties` list; names must be unique within the list
    pub(super) fn properties(
        &mut self,
        start: StartElement,
        version: SchemaVersion,
    ) -> Result<ModelValue, ParseError> {
        scan_attributes(&start, &PROPERTIES, version)?;
        let mut map = PropertyMap::new();
        self.children(&start, &PROPERTIES, version, |parser, _, child| {
            let attributes = scan_attributes(&child, &PROPERTY, version)?;
            let name = attributes.require(Attribute::Name, &child)?;
            if map.contains_key(&name.value) {
                return Err(ParseError::DuplicateName {
                    category: Element::Property.local_name().to_string(),
                    name: name.value.clone(),
                    position: name.position,
                });
            }
            let value = attributes.get(Attribute::Value).map(|attr| attr.value.clone());
            map.insert(name.value.clone(), value);
            parser.cursor.expect_end()
        })?;
        Ok(ModelValue::Properties(map))
    }

    /// `handlers` or `subhandlers`: bare name references
    fn handler_refs(
        &mut self,
        start: StartElement,
        version: SchemaVersion,
    ) -> Result<ModelValue, ParseError> {
        scan_attributes(&start, &HANDLER_REFS, version)?;
        let mut names = Vec::new();
        self.children(&start, &HANDLER_REFS, version, |parser, _, child| {
            names.push(parser.leaf(child)?.value);
            Ok(())
        })?;
        Ok(ModelValue::List(names))
    }
}
