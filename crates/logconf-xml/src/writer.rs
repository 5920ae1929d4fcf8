//! Writer
//!
//! Mirrors the parser in reverse and always targets
//! [`SchemaVersion::CURRENT`]. Output order is fixed:
//!
//! ```text
//! add-logging-api-dependencies?
//! async → console → file → custom → periodic → periodic-size → size → syslog
//! loggers → root-logger → pattern formatters → custom formatters
//! logging-profiles (same order per profile)
//! ```
//!
//! Within a category entries keep the tree's order. Every tree attribute
//! must be written; anything the current schema cannot express is an
//! encoding error rather than silently dropped.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use tracing::{debug, info};

use logconf_model::{AttributeMap, ModelValue, ResourceTree, ResourceType};

use crate::codec::{
    definitions as defs, leaf_definition, scalar_definition, AttributeCodec, AttributeDefinition,
};
use crate::config::WriterConfig;
use crate::error::WriteError;
use crate::schema::SchemaVersion;
use crate::vocabulary::{self as vocab, Attribute, Element, ElementSpec};

use self::Field::{Leaf, Refs};

/// Serialize a tree as a current-schema document
///
/// # Errors
/// Returns [`WriteError::Encoding`] if a tree value cannot be encoded, a
/// required value is missing, or an attribute has no representation
pub fn write(tree: &ResourceTree, config: &WriterConfig) -> Result<String, WriteError> {
    let mut root = XmlNode::new(Element::Subsystem.local_name())
        .with_attribute("xmlns", SchemaVersion::CURRENT.namespace());

    let mut subsystem = Resource::new("subsystem".to_string(), tree.attributes());
    if let Some(value) = subsystem.encode(&defs::ADD_LOGGING_API_DEPENDENCIES)? {
        root.push(XmlNode::leaf(Element::AddLoggingApiDependencies, value));
    }
    subsystem.finish()?;

    write_scope(tree, "", &mut root)?;

    let mut profiles = XmlNode::new(Element::LoggingProfiles.local_name());
    for (name, profile) in tree.profiles() {
        let label = format!("{}={name}", ResourceType::LoggingProfile);
        if profile.profiles().next().is_some() {
            return Err(WriteError::encoding(label, "logging-profile", "profiles cannot be nested"));
        }
        Resource::new(label.clone(), profile.attributes()).finish()?;

        let mut node = XmlNode::new(Element::LoggingProfile.local_name())
            .with_attribute(Attribute::Name.local_name(), name);
        write_scope(profile, &format!("{label}/"), &mut node)?;
        profiles.push(node);
    }
    if !profiles.children.is_empty() {
        root.push(profiles);
    }

    let mut xml = Writer::new_with_indent(Vec::new(), b' ', config.indent);
    if config.xml_declaration {
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    }
    root.emit(&mut xml)?;
    let document = String::from_utf8(xml.into_inner())?;

    info!(
        version = %SchemaVersion::CURRENT,
        resources = tree.resource_count(),
        bytes = document.len(),
        "wrote logging subsystem"
    );
    Ok(document)
}

/// Element under construction
#[derive(Debug)]
struct XmlNode {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn leaf(element: Element, value: String) -> Self {
        Self::new(element.local_name()).with_attribute(element.leaf_attribute().local_name(), value)
    }

    fn with_attribute(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    fn push(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    fn emit(&self, xml: &mut Writer<Vec<u8>>) -> Result<(), WriteError> {
        let mut start = BytesStart::new(self.name);
        for (name, value) in &self.attributes {
            start.push_attribute((*name, value.as_str()));
        }
        if self.children.is_empty() {
            xml.write_event(Event::Empty(start))?;
        } else {
            xml.write_event(Event::Start(start))?;
            for child in &self.children {
                child.emit(xml)?;
            }
            xml.write_event(Event::End(BytesEnd::new(self.name)))?;
        }
        Ok(())
    }
}

/// Attribute set being written; tracks which entries were consumed
struct Resource<'t> {
    label: String,
    attributes: &'t AttributeMap,
    consumed: Vec<&'static str>,
}

impl<'t> Resource<'t> {
    fn new(label: String, attributes: &'t AttributeMap) -> Self {
        Self {
            label,
            attributes,
            consumed: Vec::new(),
        }
    }

    fn take(&mut self, definition: &'static AttributeDefinition) -> Option<&'t ModelValue> {
        self.consumed.push(definition.name);
        self.attributes.get(definition.name)
    }

    fn error(&self, attribute: &str, message: impl Into<String>) -> WriteError {
        WriteError::encoding(self.label.clone(), attribute, message)
    }

    fn encode(&mut self, definition: &'static AttributeDefinition) -> Result<Option<String>, WriteError> {
        let Some(value) = self.take(definition) else {
            return Ok(None);
        };
        definition
            .encode(value)
            .map(Some)
            .map_err(|err| self.error(definition.name, err.to_string()))
    }

    fn missing(&self, definition: &AttributeDefinition) -> WriteError {
        self.error(definition.name, "required value is missing")
    }

    /// Every attribute must have been written
    fn finish(self) -> Result<(), WriteError> {
        match self
            .attributes
            .keys()
            .find(|key| !self.consumed.contains(&key.as_str()))
        {
            Some(key) => Err(self.error(key, "attribute cannot be expressed in the current schema")),
            None => Ok(()),
        }
    }
}

/// Child field of a handler or logger
#[derive(Debug, Clone, Copy)]
enum Field {
    /// Leaf element holding one value
    Leaf(Element),
    Formatter,
    SyslogFormatter,
    File,
    Properties,
    /// `handlers` or `subhandlers`
    Refs(Element),
}

impl Field {
    fn element(self) -> Element {
        match self {
            Self::Leaf(element) | Self::Refs(element) => element,
            Self::Formatter | Self::SyslogFormatter => Element::Formatter,
            Self::File => Element::File,
            Self::Properties => Element::Properties,
        }
    }

    /// Model attribute named in errors when the field is missing
    fn attribute_name(self) -> &'static str {
        match self {
            Self::Leaf(element) => leaf_definition(element).map_or(element.local_name(), |d| d.name),
            Self::Refs(Element::Subhandlers) => defs::SUBHANDLERS.name,
            Self::Refs(_) => defs::HANDLERS.name,
            Self::File => defs::FILE.name,
            Self::Properties => defs::PROPERTIES.name,
            Self::SyslogFormatter => defs::SYSLOG_FORMAT.name,
            Self::Formatter => defs::FORMATTER.name,
        }
    }
}

/// Element layout of one resource kind
struct Layout {
    spec: &'static ElementSpec,
    attributes: &'static [Attribute],
    fields: &'static [Field],
}


/// Handler categories in output order
static HANDLER_LAYOUTS: [(ResourceType, Layout); 8] = [
    (
        ResourceType::AsyncHandler,
        Layout {
            spec: &vocab::ASYNC_HANDLER,
            attributes: &[Attribute::Enabled],
            fields: &[
                Leaf(Element::Level),
                Leaf(Element::FilterSpec),
                Field::Formatter,
                Leaf(Element::QueueLength),
                Leaf(Element::OverflowAction),
                Refs(Element::Subhandlers),
            ],
        },
    ),
    (
        ResourceType::ConsoleHandler,
        Layout {
            spec: &vocab::CONSOLE_HANDLER,
            attributes: &[Attribute::Autoflush, Attribute::Enabled],
            fields: &[
                Leaf(Element::Level),
                Leaf(Element::Encoding),
                Leaf(Element::FilterSpec),
                Field::Formatter,
                Leaf(Element::Target),
            ],
        },
    ),
    (
        ResourceType::FileHandler,
        Layout {
            spec: &vocab::FILE_HANDLER,
            attributes: &[Attribute::Autoflush, Attribute::Enabled],
            fields: &[
                Leaf(Element::Level),
                Leaf(Element::Encoding),
                Leaf(Element::FilterSpec),
                Field::Formatter,
                Field::File,
                Leaf(Element::Append),
            ],
        },
    ),
    (
        ResourceType::CustomHandler,
        Layout {
            spec: &vocab::CUSTOM_HANDLER,
            attributes: &[Attribute::Enabled, Attribute::Class, Attribute::Module],
            fields: &[
                Leaf(Element::Level),
                Leaf(Element::Encoding),
                Leaf(Element::FilterSpec),
                Field::Formatter,
                Field::Properties,
            ],
        },
    ),
    (
        ResourceType::PeriodicRotatingFileHandler,
        Layout {
            spec: &vocab::PERIODIC_ROTATING_FILE_HANDLER,
            attributes: &[Attribute::Autoflush, Attribute::Enabled],
            fields: &[
                Leaf(Element::Level),
                Leaf(Element::Encoding),
                Leaf(Element::FilterSpec),
                Field::Formatter,
                Field::File,
                Leaf(Element::Append),
                Leaf(Element::Suffix),
            ],
        },
    ),
    (
        ResourceType::PeriodicSizeRotatingFileHandler,
        Layout {
            spec: &vocab::PERIODIC_SIZE_ROTATING_FILE_HANDLER,
            attributes: &[Attribute::Autoflush, Attribute::Enabled, Attribute::RotateOnBoot],
            fields: ROTATING_FIELDS,
        },
    ),
    (
        ResourceType::SizeRotatingFileHandler,
        Layout {
            spec: &vocab::SIZE_ROTATING_FILE_HANDLER,
            attributes: &[Attribute::Autoflush, Attribute::Enabled, Attribute::RotateOnBoot],
            fields: ROTATING_FIELDS,
        },
    ),
    (
        ResourceType::SyslogHandler,
        Layout {
            spec: &vocab::SYSLOG_HANDLER,
            attributes: &[Attribute::Enabled],
            fields: &[
                Leaf(Element::Level),
                Field::SyslogFormatter,
                Leaf(Element::AppName),
                Leaf(Element::Facility),
                Leaf(Element::Hostname),
                Leaf(Element::Port),
                Leaf(Element::ServerAddress),
            ],
        },
    ),
];

const ROTATING_FIELDS: &[Field] = &[
    Leaf(Element::Level),
    Leaf(Element::Encoding),
    Leaf(Element::FilterSpec),
    Field::Formatter,
    Field::File,
    Leaf(Element::Append),
    Leaf(Element::RotateSize),
    Leaf(Element::MaxBackupIndex),
    Leaf(Element::Suffix),
];

const LOGGER_FIELDS: &[Field] = &[
    Leaf(Element::Level),
    Leaf(Element::FilterSpec),
    Refs(Element::Handlers),
];

static LOGGER: Layout = Layout {
    spec: &vocab::LOGGER,
    attributes: &[Attribute::UseParentHandlers],
    fields: LOGGER_FIELDS,
};

static ROOT_LOGGER: Layout = Layout {
    spec: &vocab::ROOT_LOGGER,
    attributes: &[],
    fields: LOGGER_FIELDS,
};

fn write_scope(tree: &ResourceTree, prefix: &str, parent: &mut XmlNode) -> Result<(), WriteError> {
    for (resource, layout) in &HANDLER_LAYOUTS {
        for (name, attributes) in tree.resources(*resource) {
            let node = XmlNode::new(layout.spec.element.local_name())
                .with_attribute(Attribute::Name.local_name(), name);
            let label = format!("{prefix}{resource}={name}");
            parent.push(write_resource(node, label, attributes, layout)?);
        }
    }

    for (category, attributes) in tree.resources(ResourceType::Logger) {
        let node = XmlNode::new(Element::Logger.local_name())
            .with_attribute(Attribute::Category.local_name(), category);
        let label = format!("{prefix}{}={category}", ResourceType::Logger);
        parent.push(write_resource(node, label, attributes, &LOGGER)?);
    }

    if let Some(attributes) = tree.root_logger() {
        let node = XmlNode::new(Element::RootLogger.local_name());
        let label = format!("{prefix}{}", ResourceType::RootLogger);
        parent.push(write_resource(node, label, attributes, &ROOT_LOGGER)?);
    }

    for (name, attributes) in tree.resources(ResourceType::PatternFormatter) {
        let label = format!("{prefix}{}={name}", ResourceType::PatternFormatter);
        let mut resource = Resource::new(label, attributes);
        let pattern = resource
            .encode(&defs::PATTERN)?
            .ok_or_else(|| resource.missing(&defs::PATTERN))?;
        let mut definition = XmlNode::new(Element::PatternFormatter.local_name())
            .with_attribute(Attribute::Pattern.local_name(), pattern);
        if let Some(color_map) = resource.encode(&defs::COLOR_MAP)? {
            definition = definition.with_attribute(Attribute::ColorMap.local_name(), color_map);
        }
        resource.finish()?;
        parent.push(named_formatter(name, definition));
    }

    for (name, attributes) in tree.resources(ResourceType::CustomFormatter) {
        let label = format!("{prefix}{}={name}", ResourceType::CustomFormatter);
        let mut resource = Resource::new(label, attributes);
        let mut definition = XmlNode::new(Element::CustomFormatter.local_name());
        for (attribute, def) in [(Attribute::Class, &defs::CLASS), (Attribute::Module, &defs::MODULE)] {
            let value = resource.encode(def)?.ok_or_else(|| resource.missing(def))?;
            definition = definition.with_attribute(attribute.local_name(), value);
        }
        if let Some(properties) = properties_node(&mut resource)? {
            definition.push(properties);
        }
        resource.finish()?;
        parent.push(named_formatter(name, definition));
    }

    debug!(scope = prefix, resources = tree.resource_count(), "wrote scope");
    Ok(())
}

fn named_formatter(name: &str, definition: XmlNode) -> XmlNode {
    let mut node = XmlNode::new(Element::Formatter.local_name())
        .with_attribute(Attribute::Name.local_name(), name);
    node.push(definition);
    node
}

/// Attributes, then fields, of one handler or logger
fn write_resource(
    mut node: XmlNode,
    label: String,
    attributes: &AttributeMap,
    layout: &Layout,
) -> Result<XmlNode, WriteError> {
    let version = SchemaVersion::CURRENT;
    let mut resource = Resource::new(label, attributes);

    for attribute in layout.attributes {
        let Some(definition) = scalar_definition(*attribute) else {
            continue;
        };
        match resource.encode(definition)? {
            Some(value) => node = node.with_attribute(attribute.local_name(), value),
            None if definition.is_required(version) => return Err(resource.missing(definition)),
            None => {}
        }
    }

    let required: Vec<Element> = layout.spec.required_children(version).collect();
    for field in layout.fields {
        let child = match *field {
            Field::Leaf(element) => match leaf_definition(element) {
                Some(definition) => resource
                    .encode(definition)?
                    .map(|value| XmlNode::leaf(element, value)),
                None => None,
            },
            Field::Formatter => handler_formatter(&mut resource)?,
            Field::SyslogFormatter => resource.encode(&defs::SYSLOG_FORMAT)?.map(|value| {
                let mut formatter = XmlNode::new(Element::Formatter.local_name());
                formatter.push(XmlNode::leaf(Element::SyslogFormat, value));
                formatter
            }),
            Field::File => file_node(&mut resource)?,
            Field::Properties => properties_node(&mut resource)?,
            Field::Refs(element) => {
                let definition = if element == Element::Subhandlers {
                    &defs::SUBHANDLERS
                } else {
                    &defs::HANDLERS
                };
                refs_node(&mut resource, element, definition)?
            }
        };
        match child {
            Some(child) => node.push(child),
            None if required.contains(&field.element()) => {
                return Err(resource.error(field.attribute_name(), "required value is missing"));
            }
            None => {}
        }
    }

    resource.finish()?;
    Ok(node)
}

fn handler_formatter(resource: &mut Resource<'_>) -> Result<Option<XmlNode>, WriteError> {
    let pattern = resource.encode(&defs::FORMATTER)?;
    let named = resource.encode(&defs::NAMED_FORMATTER)?;
    let inner = match (pattern, named) {
        (Some(_), Some(_)) => {
            return Err(resource.error(
                defs::NAMED_FORMATTER.name,
                "formatter and named-formatter are exclusive",
            ))
        }
        (Some(pattern), None) => XmlNode::new(Element::PatternFormatter.local_name())
            .with_attribute(Attribute::Pattern.local_name(), pattern),
        (None, Some(named)) => XmlNode::leaf(Element::NamedFormatter, named),
        (None, None) => return Ok(None),
    };
    let mut formatter = XmlNode::new(Element::Formatter.local_name());
    formatter.push(inner);
    Ok(Some(formatter))
}

fn file_node(resource: &mut Resource<'_>) -> Result<Option<XmlNode>, WriteError> {
    let Some(value) = resource.take(&defs::FILE) else {
        return Ok(None);
    };
    let fields = value
        .as_object()
        .ok_or_else(|| resource.error(defs::FILE.name, format!("expected object, found {}", value.kind_name())))?;

    let mut node = XmlNode::new(Element::File.local_name());
    let mut known = 0;
    if let Some(relative_to) = fields.get(defs::RELATIVE_TO.name) {
        let text = defs::RELATIVE_TO
            .encode(relative_to)
            .map_err(|err| resource.error(defs::RELATIVE_TO.name, err.to_string()))?;
        node = node.with_attribute(Attribute::RelativeTo.local_name(), text);
        known += 1;
    }
    let path = fields
        .get(defs::PATH.name)
        .ok_or_else(|| resource.missing(&defs::PATH))?;
    let text = defs::PATH
        .encode(path)
        .map_err(|err| resource.error(defs::PATH.name, err.to_string()))?;
    node = node.with_attribute(Attribute::Path.local_name(), text);
    known += 1;

    if fields.len() > known {
        return Err(resource.error(defs::FILE.name, "only path and relative-to can be written"));
    }
    Ok(Some(node))
}

fn properties_node(resource: &mut Resource<'_>) -> Result<Option<XmlNode>, WriteError> {
    let Some(value) = resource.take(&defs::PROPERTIES) else {
        return Ok(None);
    };
    let properties = value.as_properties().ok_or_else(|| {
        resource.error(defs::PROPERTIES.name, format!("expected properties, found {}", value.kind_name()))
    })?;
    let mut node = XmlNode::new(Element::Properties.local_name());
    for (name, value) in properties {
        let mut property = XmlNode::new(Element::Property.local_name())
            .with_attribute(Attribute::Name.local_name(), name.as_str());
        if let Some(value) = value {
            property = property.with_attribute(Attribute::Value.local_name(), value.as_str());
        }
        node.push(property);
    }
    Ok(Some(node))
}

fn refs_node(
    resource: &mut Resource<'_>,
    element: Element,
    definition: &'static AttributeDefinition,
) -> Result<Option<XmlNode>, WriteError> {
    let Some(value) = resource.take(definition) else {
        return Ok(None);
    };
    let names = value.as_list().ok_or_else(|| {
        resource.error(definition.name, format!("expected list, found {}", value.kind_name()))
    })?;
    let mut node = XmlNode::new(element.local_name());
    for name in names {
        node.push(XmlNode::leaf(Element::Handler, name.clone()));
    }
    Ok(Some(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use logconf_model::AttributeMap;
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, ModelValue)]) -> AttributeMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn compact() -> WriterConfig {
        WriterConfig::new().with_indent(0).with_xml_declaration(false)
    }

    #[test]
    fn empty_tree_writes_bare_subsystem() {
        let out = write(&ResourceTree::new(), &compact()).unwrap();
        assert_eq!(out, r#"<subsystem xmlns="urn:jboss:domain:logging:1.5"/>"#);
    }

    #[test]
    fn declaration_and_indent() {
        let out = write(&ResourceTree::new(), &WriterConfig::default()).unwrap();
        assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    }

    #[test]
    fn console_handler_layout() {
        let mut tree = ResourceTree::new();
        tree.insert(
            ResourceType::ConsoleHandler,
            "CONSOLE",
            attrs(&[
                ("level", ModelValue::from("INFO")),
                ("autoflush", ModelValue::Boolean(true)),
                ("formatter", ModelValue::from("%m%n")),
                ("target", ModelValue::from("System.out")),
            ]),
        )
        .unwrap();
        let out = write(&tree, &compact()).unwrap();
        assert!(out.contains(
            concat!(
                r#"<console-handler name="CONSOLE" autoflush="true">"#,
                r#"<level name="INFO"/>"#,
                r#"<formatter><pattern-formatter pattern="%m%n"/></formatter>"#,
                r#"<target name="System.out"/>"#,
                "</console-handler>"
            )
        ), "{out}");
    }

    #[test]
    fn overflow_action_written_lower_case() {
        let mut tree = ResourceTree::new();
        tree.insert(
            ResourceType::AsyncHandler,
            "ASYNC",
            attrs(&[
                ("queue-length", ModelValue::Int(512)),
                ("overflow-action", ModelValue::from("DISCARD")),
            ]),
        )
        .unwrap();
        let out = write(&tree, &compact()).unwrap();
        assert!(out.contains(r#"<overflow-action value="discard"/>"#), "{out}");
    }

    #[test]
    fn missing_required_value_is_encoding_error() {
        let mut tree = ResourceTree::new();
        tree.insert(ResourceType::AsyncHandler, "ASYNC", AttributeMap::new())
            .unwrap();
        let err = write(&tree, &compact()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot encode 'queue-length' of async-handler=ASYNC: required value is missing"
        );
    }

    #[test]
    fn periodic_suffix_is_required() {
        let mut tree = ResourceTree::new();
        let file = crate::codec::file_value("server.log".into(), None);
        tree.insert(
            ResourceType::PeriodicRotatingFileHandler,
            "P",
            attrs(&[("file", file)]),
        )
        .unwrap();
        let err = write(&tree, &compact()).unwrap_err();
        assert!(err.to_string().contains("'suffix'"), "{err}");
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let mut tree = ResourceTree::new();
        tree.insert(
            ResourceType::Logger,
            "com.example",
            attrs(&[("colour", ModelValue::from("red"))]),
        )
        .unwrap();
        let err = write(&tree, &compact()).unwrap_err();
        assert!(err.to_string().contains("'colour' of logger=com.example"), "{err}");
    }

    #[test]
    fn invalid_value_is_rejected() {
        let mut tree = ResourceTree::new();
        tree.set_root_logger(attrs(&[("level", ModelValue::Int(3))]));
        let err = write(&tree, &compact()).unwrap_err();
        assert!(err.to_string().contains("expected string, found int"), "{err}");
    }

    #[test]
    fn profiles_follow_top_level() {
        let mut tree = ResourceTree::new();
        tree.set_root_logger(AttributeMap::new());
        tree.profile_mut("dev").set_root_logger(AttributeMap::new());
        let out = write(&tree, &compact()).unwrap();
        assert_eq!(
            out,
            concat!(
                r#"<subsystem xmlns="urn:jboss:domain:logging:1.5">"#,
                "<root-logger/>",
                r#"<logging-profiles><logging-profile name="dev"><root-logger/></logging-profile></logging-profiles>"#,
                "</subsystem>"
            )
        );
    }
}
