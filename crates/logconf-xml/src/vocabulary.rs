//! Element and attribute vocabulary
//!
//! The static tables here are the single source of truth for what is legal
//! where, and since which schema version. Parser routines consult an
//! [`ElementSpec`] for attribute and child legality and never hard-code
//! version checks.

use crate::schema::{Gate, SchemaVersion};

macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`", $text, "`")]
                $variant,
            )*
            /// Name outside the vocabulary
            Unknown,
        }

        impl $name {
            /// Look up by local name
            #[must_use]
            pub fn for_name(name: &str) -> Self {
                match name {
                    $($text => Self::$variant,)*
                    _ => Self::Unknown,
                }
            }

            /// Local name
            #[must_use]
            pub fn local_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                    Self::Unknown => "unknown",
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.local_name())
            }
        }
    };
}

vocabulary!(
    /// Element local names
    Element {
        Subsystem => "subsystem",
        AddLoggingApiDependencies => "add-logging-api-dependencies",
        Logger => "logger",
        RootLogger => "root-logger",
        ConsoleHandler => "console-handler",
        FileHandler => "file-handler",
        CustomHandler => "custom-handler",
        PeriodicRotatingFileHandler => "periodic-rotating-file-handler",
        PeriodicSizeRotatingFileHandler => "periodic-size-rotating-file-handler",
        SizeRotatingFileHandler => "size-rotating-file-handler",
        AsyncHandler => "async-handler",
        SyslogHandler => "syslog-handler",
        LoggingProfiles => "logging-profiles",
        LoggingProfile => "logging-profile",
        Formatter => "formatter",
        PatternFormatter => "pattern-formatter",
        NamedFormatter => "named-formatter",
        CustomFormatter => "custom-formatter",
        SyslogFormat => "syslog-format",
        Level => "level",
        Encoding => "encoding",
        Filter => "filter",
        FilterSpec => "filter-spec",
        Target => "target",
        File => "file",
        Append => "append",
        Suffix => "suffix",
        RotateSize => "rotate-size",
        MaxBackupIndex => "max-backup-index",
        Properties => "properties",
        Property => "property",
        QueueLength => "queue-length",
        OverflowAction => "overflow-action",
        Subhandlers => "subhandlers",
        Handlers => "handlers",
        Handler => "handler",
        AppName => "app-name",
        Facility => "facility",
        Hostname => "hostname",
        Port => "port",
        ServerAddress => "server-address",
        Accept => "accept",
        Deny => "deny",
        All => "all",
        Any => "any",
        Not => "not",
        LevelRange => "level-range",
        ChangeLevel => "change-level",
        Match => "match",
        Replace => "replace",
    }
);

vocabulary!(
    /// Attribute local names
    Attribute {
        Name => "name",
        Value => "value",
        Category => "category",
        UseParentHandlers => "use-parent-handlers",
        Autoflush => "autoflush",
        Enabled => "enabled",
        RotateOnBoot => "rotate-on-boot",
        Class => "class",
        Module => "module",
        Path => "path",
        RelativeTo => "relative-to",
        Pattern => "pattern",
        ColorMap => "color-map",
        SyslogType => "syslog-type",
        NewLevel => "new-level",
        MinLevel => "min-level",
        MaxLevel => "max-level",
        MinInclusive => "min-inclusive",
        MaxInclusive => "max-inclusive",
        Replacement => "replacement",
        ReplaceAll => "replace-all",
    }
);

impl Element {
    /// Attribute carrying the value of a single-attribute leaf element
    ///
    /// References and level-like leaves use `name`; the legacy filter leaves
    /// and `syslog-format` have their own; every other leaf uses `value`.
    #[must_use]
    pub fn leaf_attribute(self) -> Attribute {
        match self {
            Self::Level | Self::Target | Self::Handler | Self::NamedFormatter => Attribute::Name,
            Self::SyslogFormat => Attribute::SyslogType,
            Self::ChangeLevel => Attribute::NewLevel,
            Self::Match => Attribute::Pattern,
            _ => Attribute::Value,
        }
    }
}

/// How often a child may occur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    /// Zero or one; a repeat is `DuplicateElement`
    Optional,
    /// Exactly one
    Required,
    /// Any number
    Repeated,
}

/// Legality of one attribute on an element
#[derive(Debug, Clone, Copy)]
pub struct AttributeRule {
    /// Attribute the rule covers
    pub attribute: Attribute,
    /// Versions in which it is legal
    pub gate: Gate,
    /// Must be present wherever legal
    pub required: bool,
}

/// Legality of one child element
#[derive(Debug, Clone, Copy)]
pub struct ChildRule {
    /// Child element the rule covers
    pub element: Element,
    /// Versions in which it is legal
    pub gate: Gate,
    /// Allowed repetition
    pub occurs: Occurs,
}

/// Attributes and children legal for one element in one context
#[derive(Debug)]
pub struct ElementSpec {
    /// Element described
    pub element: Element,
    /// Attribute rules, in document order
    pub attributes: &'static [AttributeRule],
    /// Child rules, in document order
    pub children: &'static [ChildRule],
}

impl ElementSpec {
    /// Rule for an attribute, if legal at `version`
    #[must_use]
    pub fn attribute(&self, attribute: Attribute, version: SchemaVersion) -> Option<&AttributeRule> {
        self.attributes
            .iter()
            .find(|rule| rule.attribute == attribute && rule.gate.is_legal_at(version))
    }

    /// Rule for a child, if legal at `version`
    #[must_use]
    pub fn child(&self, element: Element, version: SchemaVersion) -> Option<&ChildRule> {
        self.children
            .iter()
            .find(|rule| rule.element == element && rule.gate.is_legal_at(version))
    }

    /// True when the element appears in this spec at any version
    #[must_use]
    pub fn knows_child(&self, element: Element) -> bool {
        self.children.iter().any(|rule| rule.element == element)
    }

    /// Attributes required at `version`
    pub fn required_attributes(&self, version: SchemaVersion) -> impl Iterator<Item = Attribute> + '_ {
        self.attributes
            .iter()
            .filter(move |rule| rule.required && rule.gate.is_legal_at(version))
            .map(|rule| rule.attribute)
    }

    /// Children required at `version`
    pub fn required_children(&self, version: SchemaVersion) -> impl Iterator<Item = Element> + '_ {
        self.children
            .iter()
            .filter(move |rule| rule.occurs == Occurs::Required && rule.gate.is_legal_at(version))
            .map(|rule| rule.element)
    }
}

const fn attr(attribute: Attribute) -> AttributeRule {
    AttributeRule {
        attribute,
        gate: Gate::ALWAYS,
        required: false,
    }
}

const fn required(attribute: Attribute) -> AttributeRule {
    AttributeRule {
        attribute,
        gate: Gate::ALWAYS,
        required: true,
    }
}

const fn attr_since(attribute: Attribute, version: SchemaVersion) -> AttributeRule {
    AttributeRule {
        attribute,
        gate: Gate::since(version),
        required: false,
    }
}

const fn optional(element: Element) -> ChildRule {
    ChildRule {
        element,
        gate: Gate::ALWAYS,
        occurs: Occurs::Optional,
    }
}

const fn optional_since(element: Element, version: SchemaVersion) -> ChildRule {
    ChildRule {
        element,
        gate: Gate::since(version),
        occurs: Occurs::Optional,
    }
}

const fn one(element: Element) -> ChildRule {
    ChildRule {
        element,
        gate: Gate::ALWAYS,
        occurs: Occurs::Required,
    }
}

const fn many(element: Element) -> ChildRule {
    ChildRule {
        element,
        gate: Gate::ALWAYS,
        occurs: Occurs::Repeated,
    }
}

const fn many_since(element: Element, version: SchemaVersion) -> ChildRule {
    ChildRule {
        element,
        gate: Gate::since(version),
        occurs: Occurs::Repeated,
    }
}

use Attribute as A;
use Element as E;
use SchemaVersion as V;

/// Legacy nested filter, replaced by `filter-spec`
const LEGACY_FILTER: ChildRule = ChildRule {
    element: E::Filter,
    gate: Gate::until(V::V1_1),
    occurs: Occurs::Optional,
};

const FILTER_SPEC: ChildRule = optional_since(E::FilterSpec, V::V1_2);

/// Root element
pub static SUBSYSTEM: ElementSpec = ElementSpec {
    element: E::Subsystem,
    attributes: &[],
    children: &[
        optional_since(E::AddLoggingApiDependencies, V::V1_4),
        many(E::Logger),
        many(E::RootLogger),
        many(E::ConsoleHandler),
        many(E::FileHandler),
        many_since(E::CustomHandler, V::V1_1),
        many(E::PeriodicRotatingFileHandler),
        many_since(E::PeriodicSizeRotatingFileHandler, V::V1_5),
        many(E::SizeRotatingFileHandler),
        many(E::AsyncHandler),
        many(E::SyslogHandler),
        many_since(E::Formatter, V::V1_4),
        optional_since(E::LoggingProfiles, V::V1_2),
    ],
};

/// Profile container
pub static LOGGING_PROFILES: ElementSpec = ElementSpec {
    element: E::LoggingProfiles,
    attributes: &[],
    children: &[many(E::LoggingProfile)],
};

/// One profile: the root's resources without subsystem-only children
pub static LOGGING_PROFILE: ElementSpec = ElementSpec {
    element: E::LoggingProfile,
    attributes: &[required(A::Name)],
    children: &[
        many(E::Logger),
        many(E::RootLogger),
        many(E::ConsoleHandler),
        many(E::FileHandler),
        many_since(E::CustomHandler, V::V1_1),
        many(E::PeriodicRotatingFileHandler),
        many_since(E::PeriodicSizeRotatingFileHandler, V::V1_5),
        many(E::SizeRotatingFileHandler),
        many(E::AsyncHandler),
        many(E::SyslogHandler),
        many_since(E::Formatter, V::V1_4),
    ],
};

/// `logger`, keyed by `category`
pub static LOGGER: ElementSpec = ElementSpec {
    element: E::Logger,
    attributes: &[required(A::Category), attr(A::UseParentHandlers)],
    children: &[
        optional(E::Level),
        optional(E::Handlers),
        LEGACY_FILTER,
        FILTER_SPEC,
    ],
};

/// `root-logger`, at most one per scope
pub static ROOT_LOGGER: ElementSpec = ElementSpec {
    element: E::RootLogger,
    attributes: &[],
    children: &[
        optional(E::Level),
        optional(E::Handlers),
        LEGACY_FILTER,
        FILTER_SPEC,
    ],
};

/// `console-handler`
pub static CONSOLE_HANDLER: ElementSpec = ElementSpec {
    element: E::ConsoleHandler,
    attributes: &[
        required(A::Name),
        attr(A::Autoflush),
        attr_since(A::Enabled, V::V1_2),
    ],
    children: &[
        optional(E::Level),
        optional(E::Encoding),
        LEGACY_FILTER,
        FILTER_SPEC,
        optional(E::Formatter),
        optional(E::Target),
    ],
};

/// `file-handler`
pub static FILE_HANDLER: ElementSpec = ElementSpec {
    element: E::FileHandler,
    attributes: &[
        required(A::Name),
        attr(A::Autoflush),
        attr_since(A::Enabled, V::V1_2),
    ],
    children: &[
        optional(E::Level),
        optional(E::Encoding),
        LEGACY_FILTER,
        FILTER_SPEC,
        optional(E::Formatter),
        one(E::File),
        optional(E::Append),
    ],
};

/// `custom-handler`, since 1.1
pub static CUSTOM_HANDLER: ElementSpec = ElementSpec {
    element: E::CustomHandler,
    attributes: &[
        required(A::Name),
        required(A::Class),
        required(A::Module),
        attr_since(A::Enabled, V::V1_2),
    ],
    children: &[
        optional(E::Level),
        optional(E::Encoding),
        LEGACY_FILTER,
        FILTER_SPEC,
        optional(E::Formatter),
        optional(E::Properties),
    ],
};

/// `periodic-rotating-file-handler`
pub static PERIODIC_ROTATING_FILE_HANDLER: ElementSpec = ElementSpec {
    element: E::PeriodicRotatingFileHandler,
    attributes: &[
        required(A::Name),
        attr(A::Autoflush),
        attr_since(A::Enabled, V::V1_2),
    ],
    children: &[
        optional(E::Level),
        optional(E::Encoding),
        LEGACY_FILTER,
        FILTER_SPEC,
        optional(E::Formatter),
        one(E::File),
        optional(E::Append),
        one(E::Suffix),
    ],
};

/// `size-rotating-file-handler`
pub static SIZE_ROTATING_FILE_HANDLER: ElementSpec = ElementSpec {
    element: E::SizeRotatingFileHandler,
    attributes: &[
        required(A::Name),
        attr(A::Autoflush),
        attr_since(A::Enabled, V::V1_2),
        attr_since(A::RotateOnBoot, V::V1_3),
    ],
    children: &[
        optional(E::Level),
        optional(E::Encoding),
        LEGACY_FILTER,
        FILTER_SPEC,
        optional(E::Formatter),
        one(E::File),
        optional(E::Append),
        optional(E::RotateSize),
        optional(E::MaxBackupIndex),
        optional_since(E::Suffix, V::V1_5),
    ],
};

/// `periodic-size-rotating-file-handler`, since 1.5
pub static PERIODIC_SIZE_ROTATING_FILE_HANDLER: ElementSpec = ElementSpec {
    element: E::PeriodicSizeRotatingFileHandler,
    attributes: &[
        required(A::Name),
        attr(A::Autoflush),
        attr(A::Enabled),
        attr(A::RotateOnBoot),
    ],
    children: &[
        optional(E::Level),
        optional(E::Encoding),
        FILTER_SPEC,
        optional(E::Formatter),
        one(E::File),
        optional(E::Append),
        optional(E::RotateSize),
        optional(E::MaxBackupIndex),
        optional(E::Suffix),
    ],
};

/// `async-handler`
pub static ASYNC_HANDLER: ElementSpec = ElementSpec {
    element: E::AsyncHandler,
    attributes: &[required(A::Name), attr_since(A::Enabled, V::V1_2)],
    children: &[
        optional(E::Level),
        LEGACY_FILTER,
        FILTER_SPEC,
        optional(E::Formatter),
        one(E::QueueLength),
        optional(E::OverflowAction),
        optional(E::Subhandlers),
    ],
};

/// `syslog-handler`
pub static SYSLOG_HANDLER: ElementSpec = ElementSpec {
    element: E::SyslogHandler,
    attributes: &[required(A::Name), attr(A::Enabled)],
    children: &[
        optional(E::AppName),
        optional(E::Facility),
        optional(E::Hostname),
        optional(E::Level),
        optional(E::Formatter),
        optional(E::Port),
        optional(E::ServerAddress),
    ],
};

/// `formatter` inside a handler: a pattern or a named-formatter reference
pub static HANDLER_FORMATTER: ElementSpec = ElementSpec {
    element: E::Formatter,
    attributes: &[],
    children: &[
        optional(E::PatternFormatter),
        optional(E::NamedFormatter),
    ],
};

/// `formatter` inside a syslog handler
pub static SYSLOG_FORMATTER: ElementSpec = ElementSpec {
    element: E::Formatter,
    attributes: &[],
    children: &[one(E::SyslogFormat)],
};

/// `pattern-formatter` inside a handler's `formatter`
pub static HANDLER_PATTERN_FORMATTER: ElementSpec = ElementSpec {
    element: E::PatternFormatter,
    attributes: &[required(A::Pattern)],
    children: &[],
};

/// Top-level named `formatter`
pub static FORMATTER: ElementSpec = ElementSpec {
    element: E::Formatter,
    attributes: &[required(A::Name)],
    children: &[optional(E::PatternFormatter), optional(E::CustomFormatter)],
};

/// Top-level `pattern-formatter` definition
pub static PATTERN_FORMATTER: ElementSpec = ElementSpec {
    element: E::PatternFormatter,
    attributes: &[required(A::Pattern), attr(A::ColorMap)],
    children: &[],
};

/// Top-level `custom-formatter` definition
pub static CUSTOM_FORMATTER: ElementSpec = ElementSpec {
    element: E::CustomFormatter,
    attributes: &[required(A::Class), required(A::Module)],
    children: &[optional(E::Properties)],
};

/// `file` of a file handler
pub static FILE: ElementSpec = ElementSpec {
    element: E::File,
    attributes: &[required(A::Path), attr(A::RelativeTo)],
    children: &[],
};

/// `properties` wrapper
pub static PROPERTIES: ElementSpec = ElementSpec {
    element: E::Properties,
    attributes: &[],
    children: &[many(E::Property)],
};

/// One `property`
pub static PROPERTY: ElementSpec = ElementSpec {
    element: E::Property,
    attributes: &[required(A::Name), attr(A::Value)],
    children: &[],
};

/// `handlers` and `subhandlers`
pub static HANDLER_REFS: ElementSpec = ElementSpec {
    element: E::Handlers,
    attributes: &[],
    children: &[many(E::Handler)],
};

/// Legacy `filter` wrapper: no attributes, exactly one expression child
pub static LEGACY_FILTER_ELEMENT: ElementSpec = ElementSpec {
    element: E::Filter,
    attributes: &[],
    children: &[],
};

/// Legacy `level-range` filter
pub static LEVEL_RANGE: ElementSpec = ElementSpec {
    element: E::LevelRange,
    attributes: &[
        required(A::MinLevel),
        required(A::MaxLevel),
        attr(A::MinInclusive),
        attr(A::MaxInclusive),
    ],
    children: &[],
};

/// Legacy `replace` filter
pub static REPLACE: ElementSpec = ElementSpec {
    element: E::Replace,
    attributes: &[
        required(A::Pattern),
        required(A::Replacement),
        attr(A::ReplaceAll),
    ],
    children: &[],
};

/// Spec of a handler element
#[must_use]
pub fn handler_spec(element: Element) -> Option<&'static ElementSpec> {
    Some(match element {
        E::ConsoleHandler => &CONSOLE_HANDLER,
        E::FileHandler => &FILE_HANDLER,
        E::CustomHandler => &CUSTOM_HANDLER,
        E::PeriodicRotatingFileHandler => &PERIODIC_ROTATING_FILE_HANDLER,
        E::PeriodicSizeRotatingFileHandler => &PERIODIC_SIZE_ROTATING_FILE_HANDLER,
        E::SizeRotatingFileHandler => &SIZE_ROTATING_FILE_HANDLER,
        E::AsyncHandler => &ASYNC_HANDLER,
        E::SyslogHandler => &SYSLOG_HANDLER,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        assert_eq!(Element::for_name("filter-spec"), Element::FilterSpec);
        assert_eq!(Element::FilterSpec.local_name(), "filter-spec");
        assert_eq!(Element::for_name("bogus"), Element::Unknown);
        assert_eq!(Attribute::for_name("rotate-on-boot"), Attribute::RotateOnBoot);
    }

    #[test]
    fn custom_handler_gated_at_1_1() {
        assert!(SUBSYSTEM.child(E::CustomHandler, V::V1_0).is_none());
        assert!(SUBSYSTEM.child(E::CustomHandler, V::V1_1).is_some());
        assert!(SUBSYSTEM.knows_child(E::CustomHandler));
    }

    #[test]
    fn filter_forms_are_exclusive_per_version() {
        for version in SchemaVersion::ALL {
            let legacy = CONSOLE_HANDLER.child(E::Filter, version).is_some();
            let current = CONSOLE_HANDLER.child(E::FilterSpec, version).is_some();
            assert!(legacy != current, "version {version}");
        }
    }

    #[test]
    fn enabled_gated_except_on_syslog() {
        assert!(CONSOLE_HANDLER.attribute(A::Enabled, V::V1_1).is_none());
        assert!(CONSOLE_HANDLER.attribute(A::Enabled, V::V1_2).is_some());
        assert!(SYSLOG_HANDLER.attribute(A::Enabled, V::V1_0).is_some());
    }

    #[test]
    fn required_children_follow_gates() {
        let required: Vec<_> = PERIODIC_ROTATING_FILE_HANDLER
            .required_children(V::V1_0)
            .collect();
        assert_eq!(required, vec![E::File, E::Suffix]);
        let required: Vec<_> = ASYNC_HANDLER.required_children(V::V1_5).collect();
        assert_eq!(required, vec![E::QueueLength]);
    }

    #[test]
    fn required_attributes() {
        let required: Vec<_> = CUSTOM_HANDLER.required_attributes(V::V1_2).collect();
        assert_eq!(required, vec![A::Name, A::Class, A::Module]);
    }

    #[test]
    fn leaf_attribute_names() {
        assert_eq!(E::Level.leaf_attribute(), A::Name);
        assert_eq!(E::Target.leaf_attribute(), A::Name);
        assert_eq!(E::Encoding.leaf_attribute(), A::Value);
        assert_eq!(E::SyslogFormat.leaf_attribute(), A::SyslogType);
        assert_eq!(E::Match.leaf_attribute(), A::Pattern);
    }
}
