//! Subsystem root, profiles and top-level dispatch

use std::collections::HashSet;

use logconf_model::{OperationBuilder, ScopeBuilder};
use tracing::{debug, info};

use super::{decode, scan_attributes, unexpected_element, ElementParser, ParsedDocument};
use crate::codec::definitions as defs;
use crate::cursor::StartElement;
use crate::error::ParseError;
use crate::schema::SchemaVersion;
use crate::vocabulary::{
    handler_spec, Attribute, Element, ElementSpec, Occurs, LOGGING_PROFILE, LOGGING_PROFILES,
    SUBSYSTEM,
};

/// What to do with a child of the subsystem root or a profile
enum Dispatch {
    /// Built-in element, legal at its own namespace's version
    Builtin(Element, SchemaVersion, StartElement),
    /// Consumed by an extension parser
    Claimed,
}

fn resolve(start: &StartElement) -> Result<SchemaVersion, ParseError> {
    SchemaVersion::resolve(start.namespace.as_deref()).map_err(|unsupported| {
        ParseError::UnsupportedSchema {
            namespace: unsupported.namespace,
            position: start.position,
        }
    })
}

impl ElementParser<'_> {
    pub(super) fn document(mut self) -> Result<ParsedDocument, ParseError> {
        let root = self.cursor.root()?;
        let version = resolve(&root)?;
        if Element::for_name(&root.name) != Element::Subsystem {
            return Err(unexpected_element(&root));
        }
        scan_attributes(&root, &SUBSYSTEM, version)?;
        debug!(version = %version, "parsing logging subsystem");

        let mut builder = OperationBuilder::new(self.config.base_address.clone());
        let mut seen = HashSet::new();
        while let Some(child) = self.cursor.next_child()? {
            match self.dispatch(&SUBSYSTEM, child, builder.top_mut(), &mut seen)? {
                Dispatch::Claimed => {}
                Dispatch::Builtin(Element::AddLoggingApiDependencies, _, child) => {
                    let attr = self.leaf(child)?;
                    let definition = &defs::ADD_LOGGING_API_DEPENDENCIES;
                    builder.set_subsystem_attribute(definition.name, decode(definition, &attr)?);
                }
                Dispatch::Builtin(Element::LoggingProfiles, child_version, child) => {
                    self.profiles(child, child_version, &mut builder)?;
                }
                Dispatch::Builtin(element, child_version, child) => {
                    self.resource(element, child_version, child, builder.top_mut())?;
                }
            }
        }
        self.cursor.finish()?;

        let profiles = builder.profile_count();
        let operations = builder.build();
        info!(
            version = %version,
            operations = operations.len(),
            profiles,
            "parsed logging subsystem"
        );
        Ok(ParsedDocument {
            version,
            operations,
        })
    }

    /// Classify a child of the subsystem root or of a profile
    ///
    /// Each such child is gated by its own namespace. Elements the scope
    /// table does not know go to the extension registry.
    fn dispatch(
        &mut self,
        spec: &ElementSpec,
        child: StartElement,
        scope: &mut ScopeBuilder,
        seen: &mut HashSet<Element>,
    ) -> Result<Dispatch, ParseError> {
        let config = self.config;
        let version = match resolve(&child) {
            Ok(version) => version,
            Err(err) => {
                if config.extensions.find(&child.name).is_some() {
                    self.extension(child, scope)?;
                    return Ok(Dispatch::Claimed);
                }
                return Err(err);
            }
        };

        let element = Element::for_name(&child.name);
        if !spec.knows_child(element) {
            if config.extensions.find(&child.name).is_some() {
                self.extension(child, scope)?;
                return Ok(Dispatch::Claimed);
            }
            return Err(unexpected_element(&child));
        }
        let Some(rule) = spec.child(element, version) else {
            return Err(unexpected_element(&child));
        };
        if rule.occurs != Occurs::Repeated && !seen.insert(element) {
            return Err(ParseError::DuplicateElement {
                element: child.name,
                position: child.position,
            });
        }
        Ok(Dispatch::Builtin(element, version, child))
    }

    /// Parse one resource element into `scope`
    fn resource(
        &mut self,
        element: Element,
        version: SchemaVersion,
        start: StartElement,
        scope: &mut ScopeBuilder,
    ) -> Result<(), ParseError> {
        match element {
            Element::Logger => self.logger(start, version, scope),
            Element::RootLogger => self.root_logger(start, version, scope),
            Element::Formatter => self.formatter(start, version, scope),
            other => match handler_spec(other) {
                Some(spec) => self.handler(spec, start, version, scope),
                None => Err(unexpected_element(&start)),
            },
        }
    }

    fn profiles(
        &mut self,
        start: StartElement,
        version: SchemaVersion,
        builder: &mut OperationBuilder,
    ) -> Result<(), ParseError> {
        scan_attributes(&start, &LOGGING_PROFILES, version)?;
        self.children(&start, &LOGGING_PROFILES, version, |parser, _, profile| {
            parser.profile(profile, version, builder)
        })
    }

    fn profile(
        &mut self,
        start: StartElement,
        version: SchemaVersion,
        builder: &mut OperationBuilder,
    ) -> Result<(), ParseError> {
        let attributes = scan_attributes(&start, &LOGGING_PROFILE, version)?;
        let name = attributes.require(Attribute::Name, &start)?;
        let mut scope = builder
            .begin_profile(&name.value)
            .map_err(|err| ParseError::from_model(err, name.position))?;
        debug!(profile = %name.value, "parsing logging profile");

        let mut seen = HashSet::new();
        while let Some(child) = self.cursor.next_child()? {
            match self.dispatch(&LOGGING_PROFILE, child, &mut scope, &mut seen)? {
                Dispatch::Claimed => {}
                Dispatch::Builtin(element, child_version, child) => {
                    self.resource(element, child_version, child, &mut scope)?;
                }
            }
        }
        builder.add_profile(scope);
        Ok(())
    }

    fn extension(&mut self, start: StartElement, scope: &mut ScopeBuilder) -> Result<(), ParseError> {
        let config = self.config;
        let Some(parser) = config.extensions.find(&start.name) else {
            return Err(unexpected_element(&start));
        };
        let raw = self.cursor.capture(start)?;
        let operations = parser
            .parse(&raw, scope.address())
            .map_err(|err| ParseError::Extension {
                element: raw.name.clone(),
                message: err.message,
                position: raw.position,
            })?;
        if let Some(stray) = operations
            .iter()
            .find(|op| !scope.address().is_prefix_of(op.address()))
        {
            return Err(ParseError::Extension {
                element: raw.name.clone(),
                message: format!("operation address '{}' is outside '{}'", stray.address(), scope.address()),
                position: raw.position,
            });
        }
        debug!(element = %raw.name, operations = operations.len(), "extension element claimed");
        scope.push_extension(operations);
        Ok(())
    }
}
