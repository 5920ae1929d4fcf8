//! Resource tree
//!
//! [`ResourceTree`] is the writer's input: subsystem attributes, resources
//! grouped by type in insertion order, and nested profiles. It can be rebuilt
//! from a parsed [`OperationList`](crate::OperationList), which is how
//! `parse → tree → write` round-trips.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::address::PathAddress;
use crate::error::ModelError;
use crate::operation::Operation;
use crate::resource::{ResourceType, ROOT_LOGGER_NAME};
use crate::value::{AttributeMap, ModelValue};

/// In-memory logging subsystem configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTree {
    attributes: AttributeMap,
    resources: BTreeMap<ResourceType, IndexMap<String, AttributeMap>>,
    profiles: IndexMap<String, ResourceTree>,
}

impl ResourceTree {
    /// Create an empty tree
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tree from add operations under `base`
    ///
    /// # Errors
    /// Returns error if an address is outside `base`, names an unknown
    /// resource type, nests deeper than a profile, or repeats a resource
    pub fn from_operations<'a>(
        operations: impl IntoIterator<Item = &'a Operation>,
        base: &PathAddress,
    ) -> Result<Self, ModelError> {
        let mut tree = Self::new();
        for operation in operations {
            tree.apply(operation, base)?;
        }
        Ok(tree)
    }

    /// Apply one add operation
    ///
    /// # Errors
    /// See [`Self::from_operations`]
    pub fn apply(&mut self, operation: &Operation, base: &PathAddress) -> Result<(), ModelError> {
        let relative = operation.address().relative_to(base)?;
        let elements = relative.elements();

        match elements {
            [] => {
                self.attributes.extend(
                    operation
                        .attributes()
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone())),
                );
                Ok(())
            }
            [profile] if profile.key() == ResourceType::LoggingProfile.key() => {
                if self.profiles.contains_key(profile.value()) {
                    return Err(ModelError::DuplicateResource {
                        address: operation.address().to_string(),
                    });
                }
                self.profiles
                    .insert(profile.value().to_string(), Self::new());
                Ok(())
            }
            [profile, resource] if profile.key() == ResourceType::LoggingProfile.key() => {
                let scope = self.profiles.get_mut(profile.value()).ok_or_else(|| {
                    ModelError::misplaced(operation.address(), "profile was not added first")
                })?;
                scope.insert_at(operation, resource.key(), resource.value())
            }
            [resource] => self.insert_at(operation, resource.key(), resource.value()),
            _ => Err(ModelError::misplaced(
                operation.address(),
                "address is too deep",
            )),
        }
    }

    fn insert_at(&mut self, operation: &Operation, key: &str, name: &str) -> Result<(), ModelError> {
        let resource: ResourceType = key.parse()?;
        if resource == ResourceType::LoggingProfile {
            return Err(ModelError::misplaced(
                operation.address(),
                "profiles cannot be nested",
            ));
        }
        self.insert(resource, name, operation.attributes().clone())
            .map_err(|_| ModelError::DuplicateResource {
                address: operation.address().to_string(),
            })
    }

    /// Insert a resource
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateResource`] if the `(type, name)` exists
    /// and [`ModelError::MisplacedOperation`] for profiles, which have
    /// their own entry point
    pub fn insert(
        &mut self,
        resource: ResourceType,
        name: impl Into<String>,
        attributes: AttributeMap,
    ) -> Result<(), ModelError> {
        let name = name.into();
        if resource == ResourceType::LoggingProfile {
            return Err(ModelError::misplaced(
                format!("{resource}={name}"),
                "use profile_mut to add profiles",
            ));
        }
        let bucket = self.resources.entry(resource).or_default();
        if bucket.contains_key(&name) {
            return Err(ModelError::DuplicateResource {
                address: format!("{resource}={name}"),
            });
        }
        bucket.insert(name, attributes);
        Ok(())
    }

    /// Set the root logger, replacing any existing one
    pub fn set_root_logger(&mut self, attributes: AttributeMap) {
        self.resources
            .entry(ResourceType::RootLogger)
            .or_default()
            .insert(ROOT_LOGGER_NAME.to_string(), attributes);
    }

    /// Root logger attributes, if present
    #[must_use]
    pub fn root_logger(&self) -> Option<&AttributeMap> {
        self.get(ResourceType::RootLogger, ROOT_LOGGER_NAME)
    }

    /// Single resource
    #[must_use]
    pub fn get(&self, resource: ResourceType, name: &str) -> Option<&AttributeMap> {
        self.resources.get(&resource).and_then(|bucket| bucket.get(name))
    }

    /// All resources of one type, in insertion order
    pub fn resources(&self, resource: ResourceType) -> impl Iterator<Item = (&str, &AttributeMap)> {
        self.resources
            .get(&resource)
            .into_iter()
            .flat_map(|bucket| bucket.iter().map(|(name, attrs)| (name.as_str(), attrs)))
    }

    /// Subsystem attributes
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Single subsystem attribute
    #[inline]
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&ModelValue> {
        self.attributes.get(name)
    }

    /// Set a subsystem attribute
    pub fn set_attribute(&mut self, name: impl Into<String>, value: ModelValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Profiles in insertion order
    pub fn profiles(&self) -> impl Iterator<Item = (&str, &ResourceTree)> {
        self.profiles.iter().map(|(name, tree)| (name.as_str(), tree))
    }

    /// Single profile
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<&ResourceTree> {
        self.profiles.get(name)
    }

    /// Profile by name, created empty if missing
    pub fn profile_mut(&mut self, name: impl Into<String>) -> &mut ResourceTree {
        self.profiles.entry(name.into()).or_default()
    }

    /// Total resources in this scope, excluding profiles
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.resources.values().map(IndexMap::len).sum()
    }

    /// True when there are no attributes, resources or profiles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.resource_count() == 0 && self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> PathAddress {
        PathAddress::logging_subsystem()
    }

    #[test]
    fn from_operations_groups_by_type() {
        let ops = vec![
            Operation::add(base().append("console-handler", "B")),
            Operation::add(base().append("console-handler", "A")).with_attribute("level", "INFO"),
            Operation::add(base().append("root-logger", "ROOT")),
        ];
        let tree = ResourceTree::from_operations(&ops, &base()).unwrap();

        let names: Vec<_> = tree
            .resources(ResourceType::ConsoleHandler)
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
        assert!(tree.root_logger().is_some());
        assert_eq!(
            tree.get(ResourceType::ConsoleHandler, "A")
                .and_then(|a| a.get("level")),
            Some(&ModelValue::from("INFO"))
        );
    }

    #[test]
    fn from_operations_builds_profiles() {
        let profile = base().append("logging-profile", "p");
        let ops = vec![
            Operation::add(profile.clone()),
            Operation::add(profile.append("logger", "x")),
        ];
        let tree = ResourceTree::from_operations(&ops, &base()).unwrap();
        let p = tree.profile("p").unwrap();
        assert!(p.get(ResourceType::Logger, "x").is_some());
        assert_eq!(tree.resource_count(), 0);
    }

    #[test]
    fn subsystem_attributes_merge() {
        let ops = vec![Operation::add(base()).with_attribute("add-logging-api-dependencies", false)];
        let tree = ResourceTree::from_operations(&ops, &base()).unwrap();
        assert_eq!(
            tree.attribute("add-logging-api-dependencies"),
            Some(&ModelValue::Boolean(false))
        );
    }

    #[test]
    fn profile_resource_before_profile_is_error() {
        let ops = vec![Operation::add(base().append("logging-profile", "p").append("logger", "x"))];
        assert!(ResourceTree::from_operations(&ops, &base()).is_err());
    }

    #[test]
    fn duplicate_resource_is_error() {
        let ops = vec![
            Operation::add(base().append("logger", "x")),
            Operation::add(base().append("logger", "x")),
        ];
        assert!(matches!(
            ResourceTree::from_operations(&ops, &base()),
            Err(ModelError::DuplicateResource { .. })
        ));
    }

    #[test]
    fn outside_base_is_error() {
        let ops = vec![Operation::add(PathAddress::single("subsystem", "jmx"))];
        assert!(matches!(
            ResourceTree::from_operations(&ops, &base()),
            Err(ModelError::Address(_))
        ));
    }

    #[test]
    fn unknown_type_is_error() {
        let ops = vec![Operation::add(base().append("widget", "w"))];
        assert!(matches!(
            ResourceTree::from_operations(&ops, &base()),
            Err(ModelError::UnknownResourceType(_))
        ));
    }
}
