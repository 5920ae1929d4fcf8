//! Legacy nested filter form
//!
//! Until 1.1 a filter was written as nested elements. The tree is built as a
//! [`FilterExpression`] and stored in its rendered `filter-spec` form, so
//! documents of every version produce the same operations.

use logconf_filter::{is_level_name, render, FilterExpression};
use logconf_model::ModelValue;
use tracing::warn;

use super::{decode, same_namespace, scan_attributes, unexpected_element, ElementParser};
use crate::codec::{definitions as defs, AttributeDefinition};
use crate::cursor::{StartElement, XmlAttribute};
use crate::error::ParseError;
use crate::schema::SchemaVersion;
use crate::vocabulary::{Attribute, Element, ElementSpec, LEGACY_FILTER_ELEMENT, LEVEL_RANGE, REPLACE};

/// Combinators and leaves without attributes
static BARE: ElementSpec = ElementSpec {
    element: Element::Filter,
    attributes: &[],
    children: &[],
};

impl ElementParser<'_> {
    /// `filter` wrapper holding exactly one expression
    pub(super) fn legacy_filter(
        &mut self,
        start: StartElement,
        version: SchemaVersion,
    ) -> Result<ModelValue, ParseError> {
        warn!(
            version = %version,
            line = start.position.line,
            "nested filter element is deprecated, converting to filter-spec"
        );
        scan_attributes(&start, &LEGACY_FILTER_ELEMENT, version)?;
        let expression = self.single_operand(&start, version)?;
        let text = render(&expression).map_err(|err| ParseError::Validation {
            attribute: defs::FILTER_SPEC.name.to_string(),
            value: expression.to_string(),
            message: err.to_string(),
            position: start.position,
        })?;
        Ok(ModelValue::String(text))
    }

    /// Exactly one child expression, then the parent's end tag
    fn single_operand(
        &mut self,
        parent: &StartElement,
        version: SchemaVersion,
    ) -> Result<FilterExpression, ParseError> {
        let Some(child) = self.cursor.next_child()? else {
            return Err(missing_operand(parent));
        };
        same_namespace(parent, &child)?;
        let expression = self.filter_expression(child, version)?;
        if let Some(extra) = self.cursor.next_child()? {
            return Err(unexpected_element(&extra));
        }
        Ok(expression)
    }

    /// One or more child expressions
    fn operands(
        &mut self,
        parent: &StartElement,
        version: SchemaVersion,
    ) -> Result<Vec<FilterExpression>, ParseError> {
        let mut operands = Vec::new();
        while let Some(child) = self.cursor.next_child()? {
            same_namespace(parent, &child)?;
            operands.push(self.filter_expression(child, version)?);
        }
        if operands.is_empty() {
            return Err(missing_operand(parent));
        }
        Ok(operands)
    }

    fn filter_expression(
        &mut self,
        start: StartElement,
        version: SchemaVersion,
    ) -> Result<FilterExpression, ParseError> {
        let element = Element::for_name(&start.name);
        Ok(match element {
            Element::Accept | Element::Deny => {
                scan_attributes(&start, &BARE, version)?;
                self.cursor.expect_end()?;
                if element == Element::Accept {
                    FilterExpression::Accept
                } else {
                    FilterExpression::Deny
                }
            }
            Element::All | Element::Any => {
                scan_attributes(&start, &BARE, version)?;
                let operands = self.operands(&start, version)?;
                if element == Element::All {
                    FilterExpression::All(operands)
                } else {
                    FilterExpression::Any(operands)
                }
            }
            Element::Not => {
                scan_attributes(&start, &BARE, version)?;
                FilterExpression::not(self.single_operand(&start, version)?)
            }
            Element::Level => FilterExpression::Level(level(&self.leaf(start)?)?),
            Element::ChangeLevel => FilterExpression::LevelChange(level(&self.leaf(start)?)?),
            Element::Match => FilterExpression::Match(self.leaf(start)?.value),
            Element::LevelRange => {
                let attributes = scan_attributes(&start, &LEVEL_RANGE, version)?;
                let min = level(attributes.require(Attribute::MinLevel, &start)?)?;
                let max = level(attributes.require(Attribute::MaxLevel, &start)?)?;
                let min_inclusive = flag(&defs::MIN_INCLUSIVE, attributes.get(Attribute::MinInclusive))?;
                let max_inclusive = flag(&defs::MAX_INCLUSIVE, attributes.get(Attribute::MaxInclusive))?;
                self.cursor.expect_end()?;
                FilterExpression::level_range(min, min_inclusive, max, max_inclusive)
            }
            Element::Replace => {
                let attributes = scan_attributes(&start, &REPLACE, version)?;
                let pattern = attributes.require(Attribute::Pattern, &start)?.value.clone();
                let replacement = attributes.require(Attribute::Replacement, &start)?.value.clone();
                let all = flag(&defs::REPLACE_ALL, attributes.get(Attribute::ReplaceAll))?;
                self.cursor.expect_end()?;
                if all {
                    FilterExpression::substitute_all(pattern, replacement)
                } else {
                    FilterExpression::substitute(pattern, replacement)
                }
            }
            _ => return Err(unexpected_element(&start)),
        })
    }
}

fn missing_operand(parent: &StartElement) -> ParseError {
    ParseError::MissingRequiredElements {
        element: parent.name.clone(),
        elements: vec!["filter expression".to_string()],
        position: parent.position,
    }
}

/// Level names pass through as written, like the `filter-spec` form
fn level(attr: &XmlAttribute) -> Result<String, ParseError> {
    if is_level_name(&attr.value) {
        Ok(attr.value.clone())
    } else {
        Err(ParseError::Validation {
            attribute: attr.name.clone(),
            value: attr.value.clone(),
            message: "not a valid level name".to_string(),
            position: attr.position,
        })
    }
}

/// Absent flags are false
fn flag(definition: &AttributeDefinition, attr: Option<&XmlAttribute>) -> Result<bool, ParseError> {
    match attr {
        Some(attr) => Ok(decode(definition, attr)?.as_bool().unwrap_or(false)),
        None => Ok(false),
    }
}
