//! Named formatter definitions

use logconf_model::{AttributeMap, Operation, ResourceType, ScopeBuilder};
use tracing::debug;

use super::{decode_scalars, scan_attributes, unexpected_element, ElementParser};
use crate::codec::definitions as defs;
use crate::cursor::StartElement;
use crate::error::ParseError;
use crate::schema::SchemaVersion;
use crate::vocabulary::{Attribute, Element, CUSTOM_FORMATTER, FORMATTER, PATTERN_FORMATTER};

impl ElementParser<'_> {
    /// `formatter name=` holding exactly one of `pattern-formatter` or
    /// `custom-formatter`
    pub(super) fn formatter(
        &mut self,
        start: StartElement,
        version: SchemaVersion,
        scope: &mut ScopeBuilder,
    ) -> Result<(), ParseError> {
        let attributes = scan_attributes(&start, &FORMATTER, version)?;
        let name = attributes.require(Attribute::Name, &start)?;
        // Both kinds share one name scope
        scope
            .declare(ResourceType::PatternFormatter, &name.value)
            .map_err(|err| ParseError::from_model(err, name.position))?;

        let mut defined: Option<(ResourceType, AttributeMap)> = None;
        self.children(&start, &FORMATTER, version, |parser, element, child| {
            if defined.is_some() {
                return Err(unexpected_element(&child));
            }
            defined = Some(match element {
                Element::PatternFormatter => {
                    let attributes = scan_attributes(&child, &PATTERN_FORMATTER, version)?;
                    let mut values = AttributeMap::new();
                    decode_scalars(&attributes, &mut values)?;
                    parser.cursor.expect_end()?;
                    (ResourceType::PatternFormatter, values)
                }
                Element::CustomFormatter => {
                    let attributes = scan_attributes(&child, &CUSTOM_FORMATTER, version)?;
                    let mut values = AttributeMap::new();
                    decode_scalars(&attributes, &mut values)?;
                    parser.children(&child, &CUSTOM_FORMATTER, version, |parser, _, properties| {
                        let value = parser.properties(properties, version)?;
                        values.insert(defs::PROPERTIES.name.to_string(), value);
                        Ok(())
                    })?;
                    (ResourceType::CustomFormatter, values)
                }
                _ => return Err(unexpected_element(&child)),
            });
            Ok(())
        })?;

        let Some((resource, values)) = defined else {
            return Err(ParseError::MissingRequiredElements {
                element: start.name.clone(),
                elements: vec![
                    Element::PatternFormatter.local_name().to_string(),
                    Element::CustomFormatter.local_name().to_string(),
                ],
                position: start.position,
            });
        };
        let address = scope.resource_address(resource, &name.value);
        debug!(address = %address, "parsed formatter");
        scope
            .push(Operation::new(address, values))
            .map_err(|err| ParseError::from_model(err, start.position))
    }
}
