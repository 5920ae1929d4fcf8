//! Add operations
//!
//! Provides [`Operation`], the unit the parser emits for every resource it
//! reads, and [`OperationList`], the ordered result of a parse.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::address::PathAddress;
use crate::resource::ResourceType;
use crate::value::{AttributeMap, ModelValue};

/// An "add" operation: create the resource at `address` with `attributes`
///
/// # Invariants
/// - Immutable once handed to an [`crate::OperationBuilder`]
/// - Absent attributes are simply not present in the map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    address: PathAddress,
    attributes: AttributeMap,
}

impl Operation {
    /// Operation name every emitted operation carries
    pub const ADD: &'static str = "add";

    /// Create a new operation
    #[inline]
    #[must_use]
    pub fn new(address: PathAddress, attributes: AttributeMap) -> Self {
        Self {
            address,
            attributes,
        }
    }

    /// Create an operation with no attributes
    #[inline]
    #[must_use]
    pub fn add(address: PathAddress) -> Self {
        Self::new(address, AttributeMap::new())
    }

    /// Builder-style attribute setter
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<ModelValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Target address
    #[inline]
    #[must_use]
    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    /// All attributes
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Single attribute
    #[inline]
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&ModelValue> {
        self.attributes.get(name)
    }

    /// Resource type named by the last address element
    #[must_use]
    pub fn resource_type(&self) -> Option<ResourceType> {
        self.address
            .last()
            .and_then(|element| ResourceType::from_key(element.key()))
    }

    /// Resource name from the last address element
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.address.last().map(crate::PathElement::value)
    }

    /// Split into address and attributes
    #[must_use]
    pub fn into_parts(self) -> (PathAddress, AttributeMap) {
        (self.address, self.attributes)
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Operation", 3)?;
        state.serialize_field("operation", Self::ADD)?;
        state.serialize_field("address", &self.address)?;
        state.serialize_field("attributes", &self.attributes)?;
        state.end()
    }
}

/// Ordered operations produced by one parse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OperationList(Vec<Operation>);

impl OperationList {
    /// Create from operations in emission order
    #[inline]
    #[must_use]
    pub fn new(operations: Vec<Operation>) -> Self {
        Self(operations)
    }

    /// Operations as a slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Operation] {
        &self.0
    }

    /// Number of operations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in emission order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.0.iter()
    }

    /// Find the operation at an exact address
    #[must_use]
    pub fn find(&self, address: &PathAddress) -> Option<&Operation> {
        self.0.iter().find(|op| op.address() == address)
    }

    /// Unwrap into the inner vector
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<Operation> {
        self.0
    }

    /// Pretty JSON rendering
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl IntoIterator for OperationList {
    type Item = Operation;
    type IntoIter = std::vec::IntoIter<Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a OperationList {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Operation> for OperationList {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Operation {
        Operation::add(PathAddress::logging_subsystem().append("console-handler", "CONSOLE"))
            .with_attribute("level", "INFO")
    }

    #[test]
    fn operation_accessors() {
        let op = console();
        assert_eq!(op.resource_type(), Some(ResourceType::ConsoleHandler));
        assert_eq!(op.name(), Some("CONSOLE"));
        assert_eq!(op.attribute("level"), Some(&ModelValue::from("INFO")));
        assert!(op.attribute("encoding").is_none());
    }

    #[test]
    fn operation_serializes_with_add_marker() {
        let json = serde_json::to_value(console()).unwrap();
        assert_eq!(json["operation"], "add");
        assert_eq!(json["attributes"]["level"], "INFO");
        assert_eq!(json["address"][1]["type"], "console-handler");
    }

    #[test]
    fn list_find_by_address() {
        let list: OperationList = vec![console()].into_iter().collect();
        let address = PathAddress::logging_subsystem().append("console-handler", "CONSOLE");
        assert!(list.find(&address).is_some());
        assert!(list.find(&PathAddress::root()).is_none());
    }
}
