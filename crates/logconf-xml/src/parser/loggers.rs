//! Logger and root-logger elements

use logconf_model::{AttributeMap, Operation, ResourceType, ScopeBuilder};
use tracing::debug;

use super::{decode_scalars, scan_attributes, unexpected_element, ElementParser};
use crate::cursor::StartElement;
use crate::error::ParseError;
use crate::schema::SchemaVersion;
use crate::vocabulary::{Attribute, Element, LOGGER, ROOT_LOGGER};

impl ElementParser<'_> {
    pub(super) fn logger(
        &mut self,
        start: StartElement,
        version: SchemaVersion,
        scope: &mut ScopeBuilder,
    ) -> Result<(), ParseError> {
        let attributes = scan_attributes(&start, &LOGGER, version)?;
        let category = attributes.require(Attribute::Category, &start)?;
        scope
            .declare(ResourceType::Logger, &category.value)
            .map_err(|err| ParseError::from_model(err, category.position))?;

        let mut values = AttributeMap::new();
        decode_scalars(&attributes, &mut values)?;
        self.children(&start, &LOGGER, version, |parser, element, child| {
            parser.field(Element::Logger, element, child, version, &mut values)
        })?;

        let address = scope.resource_address(ResourceType::Logger, &category.value);
        debug!(address = %address, "parsed logger");
        scope
            .push(Operation::new(address, values))
            .map_err(|err| ParseError::from_model(err, start.position))
    }

    /// At most one per scope; a second one is an unexpected element
    pub(super) fn root_logger(
        &mut self,
        start: StartElement,
        version: SchemaVersion,
        scope: &mut ScopeBuilder,
    ) -> Result<(), ParseError> {
        if scope.has_root_logger() {
            return Err(unexpected_element(&start));
        }
        scan_attributes(&start, &ROOT_LOGGER, version)?;

        let mut values = AttributeMap::new();
        self.children(&start, &ROOT_LOGGER, version, |parser, element, child| {
            parser.field(Element::RootLogger, element, child, version, &mut values)
        })?;

        let address = scope.root_logger_address();
        debug!(address = %address, "parsed root logger");
        scope
            .push(Operation::new(address, values))
            .map_err(|err| ParseError::from_model(err, start.position))
    }
}
