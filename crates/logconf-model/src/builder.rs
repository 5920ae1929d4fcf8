//! Operation accumulation
//!
//! The parser reads resources in document order but must emit them grouped:
//!
//! ```text
//! [subsystem]? → formatters → handlers → async-handlers → loggers → root-logger
//!              → extensions
//! then per profile:
//!   logging-profile → formatters → handlers → async-handlers → loggers → root-logger
//! ```
//!
//! Async handlers come after every plain handler because they reference
//! them as sub-handlers; loggers come after all handlers for the same reason.

use std::collections::HashSet;

use crate::address::PathAddress;
use crate::error::ModelError;
use crate::operation::{Operation, OperationList};
use crate::resource::{ResourceCategory, ResourceType, ROOT_LOGGER_NAME};
use crate::value::{AttributeMap, ModelValue};

/// Set of names already declared for one category in one scope
#[derive(Debug, Clone)]
pub struct NameScope {
    label: &'static str,
    names: HashSet<String>,
}

impl NameScope {
    /// Create an empty scope reporting duplicates under `label`
    #[inline]
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            names: HashSet::new(),
        }
    }

    /// Declare a name
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateName`] if the name was declared before
    pub fn declare(&mut self, name: &str) -> Result<(), ModelError> {
        if self.names.insert(name.to_string()) {
            Ok(())
        } else {
            Err(ModelError::duplicate_name(self.label, name))
        }
    }

    /// Check whether a name is declared
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of declared names
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if nothing is declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Operations and name scopes for one scope (top level or one profile)
#[derive(Debug, Clone)]
pub struct ScopeBuilder {
    address: PathAddress,
    formatters: Vec<Operation>,
    handlers: Vec<Operation>,
    async_handlers: Vec<Operation>,
    loggers: Vec<Operation>,
    root_logger: Option<Operation>,
    extensions: Vec<Operation>,
    formatter_names: NameScope,
    handler_names: NameScope,
    logger_names: NameScope,
}

impl ScopeBuilder {
    /// Create an empty scope rooted at `address`
    #[must_use]
    pub fn new(address: PathAddress) -> Self {
        Self {
            address,
            formatters: Vec::new(),
            handlers: Vec::new(),
            async_handlers: Vec::new(),
            loggers: Vec::new(),
            root_logger: None,
            extensions: Vec::new(),
            formatter_names: NameScope::new(ResourceCategory::Formatter.scope_label()),
            handler_names: NameScope::new(ResourceCategory::Handler.scope_label()),
            logger_names: NameScope::new(ResourceCategory::Logger.scope_label()),
        }
    }

    /// Scope address
    #[inline]
    #[must_use]
    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    /// Address of a resource inside this scope
    #[must_use]
    pub fn resource_address(&self, resource: ResourceType, name: &str) -> PathAddress {
        self.address.append(resource.key(), name)
    }

    /// Declare a resource name in its category's name scope
    ///
    /// Handlers and async handlers share one scope; pattern and custom
    /// formatters share another.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateName`] on a repeated name, or
    /// [`ModelError::MisplacedOperation`] for categories without names
    pub fn declare(&mut self, resource: ResourceType, name: &str) -> Result<(), ModelError> {
        match resource.category() {
            ResourceCategory::Formatter => self.formatter_names.declare(name),
            ResourceCategory::Handler | ResourceCategory::AsyncHandler => {
                self.handler_names.declare(name)
            }
            ResourceCategory::Logger => self.logger_names.declare(name),
            ResourceCategory::RootLogger | ResourceCategory::Profile => Err(
                ModelError::misplaced(resource, "resource type has no per-scope name"),
            ),
        }
    }

    /// Check whether a handler name (plain or async) is declared
    #[inline]
    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handler_names.contains(name)
    }

    /// Check whether a root logger was already added
    #[inline]
    #[must_use]
    pub fn has_root_logger(&self) -> bool {
        self.root_logger.is_some()
    }

    /// Route an operation into its bucket
    ///
    /// # Errors
    /// Returns [`ModelError::MisplacedOperation`] if the operation is not a
    /// direct child of this scope or is a profile, and
    /// [`ModelError::DuplicateResource`] for a second root logger
    pub fn push(&mut self, operation: Operation) -> Result<(), ModelError> {
        if operation.address().parent().as_ref() != Some(&self.address) {
            return Err(ModelError::misplaced(
                operation.address(),
                format!("not a direct child of '{}'", self.address),
            ));
        }
        let Some(resource) = operation.resource_type() else {
            return Err(ModelError::misplaced(
                operation.address(),
                "unknown resource type",
            ));
        };

        match resource.category() {
            ResourceCategory::Formatter => self.formatters.push(operation),
            ResourceCategory::Handler => self.handlers.push(operation),
            ResourceCategory::AsyncHandler => self.async_handlers.push(operation),
            ResourceCategory::Logger => self.loggers.push(operation),
            ResourceCategory::RootLogger => {
                if self.root_logger.is_some() {
                    return Err(ModelError::DuplicateResource {
                        address: operation.address().to_string(),
                    });
                }
                self.root_logger = Some(operation);
            }
            ResourceCategory::Profile => {
                return Err(ModelError::misplaced(
                    operation.address(),
                    "profiles are added through OperationBuilder",
                ))
            }
        }
        Ok(())
    }

    /// Address of this scope's root logger
    #[must_use]
    pub fn root_logger_address(&self) -> PathAddress {
        self.resource_address(ResourceType::RootLogger, ROOT_LOGGER_NAME)
    }

    /// Append operations produced by an extension parser
    ///
    /// Extension operations are emitted after the scope's own resources.
    pub fn push_extension(&mut self, operations: impl IntoIterator<Item = Operation>) {
        self.extensions.extend(operations);
    }

    /// Number of operations held
    #[must_use]
    pub fn len(&self) -> usize {
        self.formatters.len()
            + self.handlers.len()
            + self.async_handlers.len()
            + self.loggers.len()
            + usize::from(self.root_logger.is_some())
            + self.extensions.len()
    }

    /// Check if no operation was pushed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into emission order
    #[must_use]
    pub fn finish(self) -> Vec<Operation> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(self.formatters);
        out.extend(self.handlers);
        out.extend(self.async_handlers);
        out.extend(self.loggers);
        out.extend(self.root_logger);
        out.extend(self.extensions);
        out
    }
}

/// Accumulates every operation of one document
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    base: PathAddress,
    subsystem: AttributeMap,
    top: ScopeBuilder,
    profiles: Vec<ScopeBuilder>,
    profile_names: NameScope,
}

impl OperationBuilder {
    /// Create a builder for a subsystem at `base`
    #[must_use]
    pub fn new(base: PathAddress) -> Self {
        Self {
            top: ScopeBuilder::new(base.clone()),
            base,
            subsystem: AttributeMap::new(),
            profiles: Vec::new(),
            profile_names: NameScope::new(ResourceCategory::Profile.scope_label()),
        }
    }

    /// Subsystem base address
    #[inline]
    #[must_use]
    pub fn base(&self) -> &PathAddress {
        &self.base
    }

    /// Set an attribute on the subsystem resource itself
    pub fn set_subsystem_attribute(&mut self, name: impl Into<String>, value: ModelValue) {
        self.subsystem.insert(name.into(), value);
    }

    /// Top-level scope
    #[inline]
    pub fn top_mut(&mut self) -> &mut ScopeBuilder {
        &mut self.top
    }

    /// Top-level scope, read-only
    #[inline]
    #[must_use]
    pub fn top(&self) -> &ScopeBuilder {
        &self.top
    }

    /// Open a new profile scope
    ///
    /// The returned scope is handed back through [`Self::add_profile`] once
    /// its contents are parsed.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateName`] if the profile name repeats
    pub fn begin_profile(&mut self, name: &str) -> Result<ScopeBuilder, ModelError> {
        self.profile_names.declare(name)?;
        Ok(ScopeBuilder::new(
            self.base.append(ResourceType::LoggingProfile.key(), name),
        ))
    }

    /// Close a profile scope opened by [`Self::begin_profile`]
    pub fn add_profile(&mut self, scope: ScopeBuilder) {
        self.profiles.push(scope);
    }

    /// Number of profiles added
    #[inline]
    #[must_use]
    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// Produce the final ordered operation list
    #[must_use]
    pub fn build(self) -> OperationList {
        let mut out = Vec::new();
        if !self.subsystem.is_empty() {
            out.push(Operation::new(self.base, self.subsystem));
        }
        out.extend(self.top.finish());
        for profile in self.profiles {
            out.push(Operation::add(profile.address().clone()));
            out.extend(profile.finish());
        }
        OperationList::new(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(list: &OperationList) -> Vec<String> {
        list.iter().map(|op| op.address().to_string()).collect()
    }

    #[test]
    fn name_scope_rejects_repeat() {
        let mut scope = NameScope::new("handler");
        scope.declare("A").unwrap();
        let err = scope.declare("A").unwrap_err();
        assert_eq!(err, ModelError::duplicate_name("handler", "A"));
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn handlers_and_async_share_names() {
        let mut scope = ScopeBuilder::new(PathAddress::logging_subsystem());
        scope.declare(ResourceType::ConsoleHandler, "H").unwrap();
        assert!(scope.declare(ResourceType::AsyncHandler, "H").is_err());
        // Different category, same name is fine
        scope.declare(ResourceType::Logger, "H").unwrap();
    }

    #[test]
    fn buckets_emit_in_fixed_order() {
        let base = PathAddress::logging_subsystem();
        let mut builder = OperationBuilder::new(base.clone());
        let top = builder.top_mut();
        top.push(Operation::add(top.root_logger_address())).unwrap();
        top.push(Operation::add(base.append("logger", "a"))).unwrap();
        top.push(Operation::add(base.append("async-handler", "q")))
            .unwrap();
        top.push(Operation::add(base.append("console-handler", "c")))
            .unwrap();
        top.push(Operation::add(base.append("pattern-formatter", "p")))
            .unwrap();

        let list = builder.build();
        assert_eq!(
            keys(&list),
            vec![
                "subsystem=logging/pattern-formatter=p",
                "subsystem=logging/console-handler=c",
                "subsystem=logging/async-handler=q",
                "subsystem=logging/logger=a",
                "subsystem=logging/root-logger=ROOT",
            ]
        );
    }

    #[test]
    fn subsystem_operation_only_when_attributes_set() {
        let base = PathAddress::logging_subsystem();
        assert!(OperationBuilder::new(base.clone()).build().is_empty());

        let mut builder = OperationBuilder::new(base.clone());
        builder.set_subsystem_attribute("add-logging-api-dependencies", false.into());
        let list = builder.build();
        assert_eq!(list.len(), 1);
        assert_eq!(list.as_slice()[0].address(), &base);
    }

    #[test]
    fn profiles_follow_top_level() {
        let base = PathAddress::logging_subsystem();
        let mut builder = OperationBuilder::new(base.clone());
        let mut profile = builder.begin_profile("p1").unwrap();
        profile
            .push(Operation::add(profile.resource_address(ResourceType::Logger, "x")))
            .unwrap();
        builder.add_profile(profile);
        builder
            .top_mut()
            .push(Operation::add(base.append("logger", "y")))
            .unwrap();

        assert_eq!(
            keys(&builder.build()),
            vec![
                "subsystem=logging/logger=y",
                "subsystem=logging/logging-profile=p1",
                "subsystem=logging/logging-profile=p1/logger=x",
            ]
        );
    }

    #[test]
    fn duplicate_profile_name() {
        let mut builder = OperationBuilder::new(PathAddress::logging_subsystem());
        builder.begin_profile("p").unwrap();
        assert!(matches!(
            builder.begin_profile("p"),
            Err(ModelError::DuplicateName {
                category: "logging-profile",
                ..
            })
        ));
    }

    #[test]
    fn second_root_logger_rejected() {
        let mut scope = ScopeBuilder::new(PathAddress::logging_subsystem());
        scope.push(Operation::add(scope.root_logger_address())).unwrap();
        let again = scope.push(Operation::add(scope.root_logger_address()));
        assert!(matches!(again, Err(ModelError::DuplicateResource { .. })));
    }

    #[test]
    fn push_outside_scope_rejected() {
        let mut scope = ScopeBuilder::new(PathAddress::logging_subsystem());
        let stray = Operation::add(PathAddress::single("subsystem", "other").append("logger", "x"));
        assert!(matches!(
            scope.push(stray),
            Err(ModelError::MisplacedOperation { .. })
        ));
    }
}
