//! Attribute codecs
//!
//! An [`AttributeDefinition`] names a model attribute and knows how to turn
//! XML text into a [`ModelValue`] and back.

use std::collections::BTreeMap;

use logconf_filter::{GrammarError, RenderError};
use logconf_model::ModelValue;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::SchemaVersion;
use crate::vocabulary::{Attribute, Element};

static SIZE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)\d+[bkmgt]?$").expect("size pattern is valid"));

/// Level names accepted by level-valued attributes
pub const LEVEL_NAMES: &[&str] = &[
    "ALL", "FINEST", "FINER", "TRACE", "DEBUG", "FINE", "CONFIG", "INFO", "WARN", "WARNING",
    "ERROR", "SEVERE", "FATAL", "OFF",
];

/// Decode and encode contract for one attribute
pub trait AttributeCodec {
    /// XML text → typed value
    ///
    /// # Errors
    /// Returns [`CodecError`] if the text is not a legal value
    fn decode(&self, text: &str) -> Result<ModelValue, CodecError>;

    /// Typed value → XML text
    ///
    /// # Errors
    /// Returns [`CodecError`] if the value has the wrong kind or is illegal
    fn encode(&self, value: &ModelValue) -> Result<String, CodecError>;

    /// Whether the attribute must be present at `version`
    fn is_required(&self, version: SchemaVersion) -> bool;
}

/// Case handling for enumerated values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseRule {
    /// Match and store as written
    Exact,
    /// Match case-insensitively, store upper-case, write lower-case
    Upper,
}

/// Shape of an attribute's value
#[derive(Debug, Clone, Copy)]
pub enum ValueKind {
    /// Free text
    String,
    /// `true` or `false`, case-insensitive
    Boolean,
    /// Integer inside `min..=max`
    Int {
        /// Smallest legal value
        min: i64,
        /// Largest legal value
        max: i64,
    },
    /// One of a fixed set of words
    Enum {
        /// Legal values, in stored form
        values: &'static [&'static str],
        /// How input is matched and written
        case: CaseRule,
    },
    /// Name from [`LEVEL_NAMES`], stored upper-case
    Level,
    /// `<digits>[bkmgt]`, case-insensitive
    Size,
    /// Filter expression text
    FilterSpec,
    /// Built from repeated child elements
    List,
    /// Built from `property` children
    Properties,
    /// `{path, relative-to}` built from a `file` element
    File,
}

/// One model attribute
#[derive(Debug)]
pub struct AttributeDefinition {
    /// Model attribute name
    pub name: &'static str,
    /// Value shape
    pub kind: ValueKind,
    /// First version in which the attribute is mandatory
    pub required_since: Option<SchemaVersion>,
}

/// Value rejected by a codec
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Text or value outside the legal set
    #[error("{0}")]
    Invalid(String),

    /// Filter expression does not parse
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// Filter expression has no textual form
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl CodecError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    fn wrong_kind(expected: &str, value: &ModelValue) -> Self {
        Self::Invalid(format!("expected {expected}, found {}", value.kind_name()))
    }
}

impl AttributeDefinition {
    /// Optional attribute
    #[must_use]
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            required_since: None,
        }
    }

    /// Attribute mandatory in every version
    #[must_use]
    pub const fn required(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            required_since: Some(SchemaVersion::V1_0),
        }
    }

    fn expect_str<'v>(&self, value: &'v ModelValue) -> Result<&'v str, CodecError> {
        value
            .as_str()
            .ok_or_else(|| CodecError::wrong_kind("string", value))
    }
}

impl AttributeCodec for AttributeDefinition {
    fn decode(&self, text: &str) -> Result<ModelValue, CodecError> {
        match self.kind {
            ValueKind::String => Ok(ModelValue::from(text)),
            ValueKind::Boolean => decode_bool(text).map(ModelValue::Boolean),
            ValueKind::Int { min, max } => {
                let value: i64 = text
                    .trim()
                    .parse()
                    .map_err(|_| CodecError::invalid("not an integer"))?;
                if value < min || value > max {
                    return Err(CodecError::invalid(format!(
                        "must be between {min} and {max}"
                    )));
                }
                Ok(ModelValue::Int(value))
            }
            ValueKind::Enum { values, case } => {
                let found = values.iter().find(|candidate| match case {
                    CaseRule::Exact => **candidate == text,
                    CaseRule::Upper => candidate.eq_ignore_ascii_case(text),
                });
                found
                    .map(|v| ModelValue::from(*v))
                    .ok_or_else(|| CodecError::invalid(format!("expected one of {}", values.join(", "))))
            }
            ValueKind::Level => LEVEL_NAMES
                .iter()
                .find(|level| level.eq_ignore_ascii_case(text))
                .map(|level| ModelValue::from(*level))
                .ok_or_else(|| CodecError::invalid("unknown level")),
            ValueKind::Size => {
                if SIZE_PATTERN.is_match(text) {
                    Ok(ModelValue::from(text))
                } else {
                    Err(CodecError::invalid("expected digits with optional b, k, m, g or t suffix"))
                }
            }
            ValueKind::FilterSpec => {
                let expression = logconf_filter::parse(text)?;
                Ok(ModelValue::String(logconf_filter::render(&expression)?))
            }
            ValueKind::List | ValueKind::Properties | ValueKind::File => Err(CodecError::invalid(
                "composite value cannot be decoded from attribute text",
            )),
        }
    }

    fn encode(&self, value: &ModelValue) -> Result<String, CodecError> {
        match self.kind {
            ValueKind::String => Ok(self.expect_str(value)?.to_string()),
            ValueKind::Level => {
                let text = self.expect_str(value)?;
                if self.decode(text)?.as_str() != Some(text) {
                    return Err(CodecError::invalid(format!(
                        "level '{text}' is not in canonical upper-case form"
                    )));
                }
                Ok(text.to_string())
            }
            ValueKind::Boolean => value
                .as_bool()
                .map(|b| b.to_string())
                .ok_or_else(|| CodecError::wrong_kind("boolean", value)),
            ValueKind::Int { .. } => value
                .as_int()
                .map(|i| i.to_string())
                .ok_or_else(|| CodecError::wrong_kind("int", value)),
            ValueKind::Enum { case, .. } => {
                let text = self.expect_str(value)?;
                // Validate against the legal set before writing
                self.decode(text)?;
                Ok(match case {
                    CaseRule::Exact => text.to_string(),
                    CaseRule::Upper => text.to_ascii_lowercase(),
                })
            }
            ValueKind::Size => {
                let text = self.expect_str(value)?;
                self.decode(text)?;
                Ok(text.to_string())
            }
            ValueKind::FilterSpec => {
                let expression = logconf_filter::parse(self.expect_str(value)?)?;
                Ok(logconf_filter::render(&expression)?)
            }
            ValueKind::List | ValueKind::Properties | ValueKind::File => Err(CodecError::invalid(
                "composite value is written as child elements",
            )),
        }
    }

    fn is_required(&self, version: SchemaVersion) -> bool {
        self.required_since.is_some_and(|since| version >= since)
    }
}

fn decode_bool(text: &str) -> Result<bool, CodecError> {
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(CodecError::invalid("expected true or false"))
    }
}

/// Build the composite file value
#[must_use]
pub fn file_value(path: String, relative_to: Option<String>) -> ModelValue {
    let mut fields = BTreeMap::new();
    fields.insert(definitions::PATH.name.to_string(), ModelValue::String(path));
    if let Some(relative_to) = relative_to {
        fields.insert(
            definitions::RELATIVE_TO.name.to_string(),
            ModelValue::String(relative_to),
        );
    }
    ModelValue::Object(fields)
}

/// Definition of an attribute carried on a resource's own start tag
pub(crate) fn scalar_definition(attribute: Attribute) -> Option<&'static AttributeDefinition> {
    Some(match attribute {
        Attribute::Autoflush => &definitions::AUTOFLUSH,
        Attribute::Enabled => &definitions::ENABLED,
        Attribute::RotateOnBoot => &definitions::ROTATE_ON_BOOT,
        Attribute::Class => &definitions::CLASS,
        Attribute::Module => &definitions::MODULE,
        Attribute::UseParentHandlers => &definitions::USE_PARENT_HANDLERS,
        Attribute::Pattern => &definitions::PATTERN,
        Attribute::ColorMap => &definitions::COLOR_MAP,
        _ => return None,
    })
}

/// Definition of the value held by a leaf child element
pub(crate) fn leaf_definition(element: Element) -> Option<&'static AttributeDefinition> {
    Some(match element {
        Element::Level => &definitions::LEVEL,
        Element::Encoding => &definitions::ENCODING,
        Element::FilterSpec => &definitions::FILTER_SPEC,
        Element::Target => &definitions::TARGET,
        Element::Append => &definitions::APPEND,
        Element::Suffix => &definitions::SUFFIX,
        Element::RotateSize => &definitions::ROTATE_SIZE,
        Element::MaxBackupIndex => &definitions::MAX_BACKUP_INDEX,
        Element::QueueLength => &definitions::QUEUE_LENGTH,
        Element::OverflowAction => &definitions::OVERFLOW_ACTION,
        Element::AppName => &definitions::APP_NAME,
        Element::Facility => &definitions::FACILITY,
        Element::Hostname => &definitions::HOSTNAME,
        Element::Port => &definitions::PORT,
        Element::ServerAddress => &definitions::SERVER_ADDRESS,
        Element::AddLoggingApiDependencies => &definitions::ADD_LOGGING_API_DEPENDENCIES,
        _ => return None,
    })
}

/// Static attribute definitions
pub mod definitions {
    use super::{AttributeDefinition as Def, CaseRule, ValueKind as K};

    const BOOL: K = K::Boolean;
    const TEXT: K = K::String;

    /// Threshold level of a handler or logger
    pub static LEVEL: Def = Def::new("level", K::Level);
    /// Character encoding of a handler
    pub static ENCODING: Def = Def::new("encoding", TEXT);
    /// Filter expression text
    pub static FILTER_SPEC: Def = Def::new("filter-spec", K::FilterSpec);
    /// Inline pattern on a handler's `formatter` element
    pub static FORMATTER: Def = Def::new("formatter", TEXT);
    /// Reference to a top-level `formatter`
    pub static NAMED_FORMATTER: Def = Def::new("named-formatter", TEXT);
    /// Flush after every record
    pub static AUTOFLUSH: Def = Def::new("autoflush", BOOL);
    /// Handler switch, since 1.2
    pub static ENABLED: Def = Def::new("enabled", BOOL);
    /// Console stream
    pub static TARGET: Def = Def::new(
        "target",
        K::Enum {
            values: &["System.out", "System.err", "console"],
            case: CaseRule::Exact,
        },
    );
    /// `{path, relative-to}` of a file handler
    pub static FILE: Def = Def::required("file", K::File);
    /// File path, relative to `relative-to` when set
    pub static PATH: Def = Def::required("path", TEXT);
    /// Named base path
    pub static RELATIVE_TO: Def = Def::new("relative-to", TEXT);
    /// Append to an existing file
    pub static APPEND: Def = Def::new("append", BOOL);
    /// Date suffix of periodic rotation
    pub static SUFFIX: Def = Def::new("suffix", TEXT);
    /// Size that triggers rotation
    pub static ROTATE_SIZE: Def = Def::new("rotate-size", K::Size);
    /// Rotated files to keep
    pub static MAX_BACKUP_INDEX: Def = Def::new(
        "max-backup-index",
        K::Int {
            min: 1,
            max: i32::MAX as i64,
        },
    );
    /// Rotate when the server starts
    pub static ROTATE_ON_BOOT: Def = Def::new("rotate-on-boot", BOOL);
    /// Implementation class of a custom resource
    pub static CLASS: Def = Def::required("class", TEXT);
    /// Module holding `class`
    pub static MODULE: Def = Def::required("module", TEXT);
    /// Ordered `property` children
    pub static PROPERTIES: Def = Def::new("properties", K::Properties);
    /// Capacity of an async handler's queue
    pub static QUEUE_LENGTH: Def = Def::required(
        "queue-length",
        K::Int {
            min: 1,
            max: i32::MAX as i64,
        },
    );
    /// Behaviour of a full async queue
    pub static OVERFLOW_ACTION: Def = Def::new(
        "overflow-action",
        K::Enum {
            values: &["BLOCK", "DISCARD"],
            case: CaseRule::Upper,
        },
    );
    /// Handlers an async handler forwards to
    pub static SUBHANDLERS: Def = Def::new("subhandlers", K::List);
    /// Handlers attached to a logger
    pub static HANDLERS: Def = Def::new("handlers", K::List);
    /// Also publish to the parent logger's handlers
    pub static USE_PARENT_HANDLERS: Def = Def::new("use-parent-handlers", BOOL);
    /// Syslog application name
    pub static APP_NAME: Def = Def::new("app-name", TEXT);
    /// Syslog facility
    pub static FACILITY: Def = Def::new(
        "facility",
        K::Enum {
            values: &[
                "kernel",
                "user-level",
                "mail-system",
                "system-daemons",
                "security",
                "syslogd",
                "line-printer",
                "network-news",
                "uucp",
                "clock-daemon",
                "security2",
                "ftp-daemon",
                "ntp",
                "log-audit",
                "log-alert",
                "clock-daemon2",
                "local-use-0",
                "local-use-1",
                "local-use-2",
                "local-use-3",
                "local-use-4",
                "local-use-5",
                "local-use-6",
                "local-use-7",
            ],
            case: CaseRule::Exact,
        },
    );
    /// Host name sent to syslog
    pub static HOSTNAME: Def = Def::new("hostname", TEXT);
    /// Syslog server port
    pub static PORT: Def = Def::new("port", K::Int { min: 0, max: 65535 });
    /// Syslog server address
    pub static SERVER_ADDRESS: Def = Def::new("server-address", TEXT);
    /// Syslog message format
    pub static SYSLOG_FORMAT: Def = Def::new(
        "syslog-format",
        K::Enum {
            values: &["RFC5424", "RFC3164"],
            case: CaseRule::Exact,
        },
    );
    /// Pattern of a pattern formatter
    pub static PATTERN: Def = Def::required("pattern", TEXT);
    /// Level to colour mapping of a pattern formatter
    pub static COLOR_MAP: Def = Def::new("color-map", TEXT);
    /// Subsystem switch for implicit logging API modules
    pub static ADD_LOGGING_API_DEPENDENCIES: Def = Def::new("add-logging-api-dependencies", BOOL);
    /// Lower bound of a legacy `level-range` is inclusive
    pub static MIN_INCLUSIVE: Def = Def::new("min-inclusive", BOOL);
    /// Upper bound of a legacy `level-range` is inclusive
    pub static MAX_INCLUSIVE: Def = Def::new("max-inclusive", BOOL);
    /// Legacy `replace` rewrites every match
    pub static REPLACE_ALL: Def = Def::new("replace-all", BOOL);
}

#[cfg(test)]
mod tests {
    use super::definitions::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn boolean_is_case_insensitive() {
        assert_eq!(AUTOFLUSH.decode("TRUE"), Ok(ModelValue::Boolean(true)));
        assert_eq!(AUTOFLUSH.decode("false"), Ok(ModelValue::Boolean(false)));
        assert!(AUTOFLUSH.decode("yes").is_err());
    }

    #[test]
    fn overflow_action_is_upper_cased() {
        assert_eq!(OVERFLOW_ACTION.decode("block"), Ok(ModelValue::from("BLOCK")));
        assert_eq!(
            OVERFLOW_ACTION.encode(&ModelValue::from("DISCARD")),
            Ok("discard".to_string())
        );
        assert!(OVERFLOW_ACTION.decode("drop").is_err());
    }

    #[test]
    fn target_is_exact() {
        assert!(TARGET.decode("System.out").is_ok());
        assert!(TARGET.decode("system.out").is_err());
    }

    #[test]
    fn int_range_checked() {
        assert_eq!(PORT.decode("514"), Ok(ModelValue::Int(514)));
        assert!(PORT.decode("70000").is_err());
        assert!(QUEUE_LENGTH.decode("0").is_err());
        assert!(QUEUE_LENGTH.decode("ten").is_err());
    }

    #[test]
    fn size_accepts_suffixes() {
        for text in ["10", "10k", "5M", "1g", "2T", "512b"] {
            assert!(ROTATE_SIZE.decode(text).is_ok(), "{text}");
        }
        for text in ["", "k", "10kb", "-1", "1.5m"] {
            assert!(ROTATE_SIZE.decode(text).is_err(), "{text}");
        }
    }

    #[test]
    fn level_is_normalized() {
        assert_eq!(LEVEL.decode("info"), Ok(ModelValue::from("INFO")));
        assert!(LEVEL.decode("LOUD").is_err());
    }

    #[test]
    fn level_encode_accepts_only_canonical_names() {
        assert_eq!(LEVEL.encode(&ModelValue::from("WARN")), Ok("WARN".to_string()));
        assert_eq!(
            LEVEL.encode(&ModelValue::from("LOUD")),
            Err(CodecError::Invalid("unknown level".into()))
        );
        assert_eq!(
            LEVEL.encode(&ModelValue::from("info")),
            Err(CodecError::Invalid(
                "level 'info' is not in canonical upper-case form".into()
            ))
        );
        assert!(LEVEL.encode(&ModelValue::Int(3)).is_err());
    }

    #[test]
    fn filter_spec_is_canonicalized() {
        assert_eq!(
            FILTER_SPEC.decode("not( level( INFO ) )"),
            Ok(ModelValue::from("not(level(INFO))"))
        );
        assert!(matches!(
            FILTER_SPEC.decode("not("),
            Err(CodecError::Grammar(_))
        ));
    }

    #[test]
    fn encode_rejects_wrong_kind() {
        let err = AUTOFLUSH.encode(&ModelValue::from("true")).unwrap_err();
        assert_eq!(err, CodecError::Invalid("expected boolean, found string".into()));
    }

    #[test]
    fn composite_kinds_do_not_decode_text() {
        assert!(FILE.decode("x").is_err());
        assert!(HANDLERS.encode(&ModelValue::List(vec![])).is_err());
    }

    #[test]
    fn requiredness() {
        assert!(QUEUE_LENGTH.is_required(SchemaVersion::V1_0));
        assert!(!SUFFIX.is_required(SchemaVersion::CURRENT));
    }

    #[test]
    fn file_value_omits_missing_relative_to() {
        let value = file_value("server.log".into(), None);
        let fields = value.as_object().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["path"], ModelValue::from("server.log"));
    }
}
