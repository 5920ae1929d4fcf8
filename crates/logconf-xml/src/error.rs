//! Error types for the XML layer
//!
//! Provides error handling for:
//! - Parsing (document → operations), always positioned
//! - Writing (tree → document)
//! - The file-level facade combining both

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use logconf_filter::GrammarError;
use logconf_model::ModelError;

/// Location of a token in the source document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
    /// 0-based byte offset
    pub offset: usize,
}

impl Position {
    /// Compute line and column of a byte offset
    #[must_use]
    pub fn locate(source: &str, offset: usize) -> Self {
        let bytes = source.as_bytes();
        let offset = offset.min(bytes.len());
        let before = &bytes[..offset];
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        let line = 1 + before.iter().filter(|&&b| b == b'\n').count();
        // UTF-8 continuation bytes do not start a character
        let column = 1 + before[line_start..]
            .iter()
            .filter(|&&b| b & 0xC0 != 0x80)
            .count();
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors while parsing a configuration document
///
/// Every variant is fatal to the parse and carries the position of the
/// offending token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Element namespace is not a supported schema version
    #[error("unsupported schema namespace '{namespace}' at {position}")]
    UnsupportedSchema { namespace: String, position: Position },

    /// Attribute not legal on this element at this version
    #[error("unexpected attribute '{attribute}' on '{element}' at {position}")]
    UnexpectedAttribute {
        element: String,
        attribute: String,
        position: Position,
    },

    /// Element not legal here at this version
    #[error("unexpected element '{element}' at {position}")]
    UnexpectedElement { element: String, position: Position },

    /// Required attributes absent
    #[error("missing required attribute(s) {} on '{element}' at {position}", .attributes.join(", "))]
    MissingRequiredAttributes {
        element: String,
        attributes: Vec<String>,
        position: Position,
    },

    /// Required child elements absent
    #[error("missing required element(s) {} in '{element}' at {position}", .elements.join(", "))]
    MissingRequiredElements {
        element: String,
        elements: Vec<String>,
        position: Position,
    },

    /// Resource name repeated within its scope
    #[error("duplicate {category} name '{name}' at {position}")]
    DuplicateName {
        category: String,
        name: String,
        position: Position,
    },

    /// At-most-once child element repeated
    #[error("duplicate element '{element}' at {position}")]
    DuplicateElement { element: String, position: Position },

    /// Filter expression does not parse
    #[error("invalid filter expression at {position}: {source}")]
    Grammar {
        #[source]
        source: GrammarError,
        position: Position,
    },

    /// Attribute value rejected by its codec
    #[error("invalid value '{value}' for '{attribute}' at {position}: {message}")]
    Validation {
        attribute: String,
        value: String,
        message: String,
        position: Position,
    },

    /// Extension parser rejected its element
    #[error("extension failed on '{element}' at {position}: {message}")]
    Extension {
        element: String,
        message: String,
        position: Position,
    },

    /// Malformed markup
    #[error("malformed document at {position}: {message}")]
    Xml { message: String, position: Position },
}

/// Fieldless discriminant of [`ParseError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    UnsupportedSchema,
    UnexpectedAttribute,
    UnexpectedElement,
    MissingRequiredAttributes,
    MissingRequiredElements,
    DuplicateName,
    DuplicateElement,
    Grammar,
    Validation,
    Extension,
    Xml,
}

impl ParseError {
    /// Kind of error, for matching without destructuring
    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            Self::UnsupportedSchema { .. } => ParseErrorKind::UnsupportedSchema,
            Self::UnexpectedAttribute { .. } => ParseErrorKind::UnexpectedAttribute,
            Self::UnexpectedElement { .. } => ParseErrorKind::UnexpectedElement,
            Self::MissingRequiredAttributes { .. } => ParseErrorKind::MissingRequiredAttributes,
            Self::MissingRequiredElements { .. } => ParseErrorKind::MissingRequiredElements,
            Self::DuplicateName { .. } => ParseErrorKind::DuplicateName,
            Self::DuplicateElement { .. } => ParseErrorKind::DuplicateElement,
            Self::Grammar { .. } => ParseErrorKind::Grammar,
            Self::Validation { .. } => ParseErrorKind::Validation,
            Self::Extension { .. } => ParseErrorKind::Extension,
            Self::Xml { .. } => ParseErrorKind::Xml,
        }
    }

    /// Position of the offending token
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            Self::UnsupportedSchema { position, .. }
            | Self::UnexpectedAttribute { position, .. }
            | Self::UnexpectedElement { position, .. }
            | Self::MissingRequiredAttributes { position, .. }
            | Self::MissingRequiredElements { position, .. }
            | Self::DuplicateName { position, .. }
            | Self::DuplicateElement { position, .. }
            | Self::Grammar { position, .. }
            | Self::Validation { position, .. }
            | Self::Extension { position, .. }
            | Self::Xml { position, .. } => *position,
        }
    }

    /// Create an unexpected-element error
    #[must_use]
    pub fn unexpected_element(element: impl Into<String>, position: Position) -> Self {
        Self::UnexpectedElement {
            element: element.into(),
            position,
        }
    }

    /// Create a malformed-markup error
    #[must_use]
    pub fn xml(message: impl Into<String>, position: Position) -> Self {
        Self::Xml {
            message: message.into(),
            position,
        }
    }

    /// Attach a position to a model error raised while building operations
    #[must_use]
    pub fn from_model(error: ModelError, position: Position) -> Self {
        match error {
            ModelError::DuplicateName { category, name } => Self::DuplicateName {
                category: category.to_string(),
                name,
                position,
            },
            other => Self::Xml {
                message: other.to_string(),
                position,
            },
        }
    }
}

/// Errors while writing a resource tree
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Tree content cannot be expressed in the current schema
    #[error("cannot encode '{attribute}' of {resource}: {message}")]
    Encoding {
        resource: String,
        attribute: String,
        message: String,
    },

    /// Markup writer failure
    #[error("xml writer error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Output was not UTF-8
    #[error("writer produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl WriteError {
    /// Create an encoding error
    pub fn encoding(
        resource: impl Into<String>,
        attribute: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Encoding {
            resource: resource.into(),
            attribute: attribute.into(),
            message: message.into(),
        }
    }
}

/// Combined error of the file-level facade
#[derive(Debug, thiserror::Error)]
pub enum SubsystemError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("write error: {0}")]
    Write(#[from] WriteError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// IO error reading or writing a document
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SubsystemError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_counts_lines_and_columns() {
        let source = "<a>\n  <b/>\n</a>";
        let pos = Position::locate(source, 6);
        assert_eq!((pos.line, pos.column, pos.offset), (2, 3, 6));
        assert_eq!(Position::locate(source, 0).line, 1);
    }

    #[test]
    fn locate_counts_characters_not_bytes() {
        let source = "é<x>";
        let pos = Position::locate(source, 2);
        assert_eq!(pos.column, 2);
    }

    #[test]
    fn locate_clamps_offset() {
        let pos = Position::locate("ab", 99);
        assert_eq!(pos.offset, 2);
    }

    #[test]
    fn missing_attributes_display_lists_names() {
        let err = ParseError::MissingRequiredAttributes {
            element: "file".into(),
            attributes: vec!["path".into()],
            position: Position {
                line: 3,
                column: 5,
                offset: 40,
            },
        };
        assert_eq!(
            err.to_string(),
            "missing required attribute(s) path on 'file' at 3:5"
        );
        assert_eq!(err.kind(), ParseErrorKind::MissingRequiredAttributes);
        assert_eq!(err.position().offset, 40);
    }

    #[test]
    fn duplicate_model_name_keeps_category() {
        let err = ParseError::from_model(
            ModelError::duplicate_name("handler", "CONSOLE"),
            Position::default(),
        );
        assert_eq!(err.kind(), ParseErrorKind::DuplicateName);
        assert!(err.to_string().contains("duplicate handler name 'CONSOLE'"));
    }

    #[test]
    fn encoding_error_display() {
        let err = WriteError::encoding("async-handler=A", "queue-length", "required");
        assert_eq!(
            err.to_string(),
            "cannot encode 'queue-length' of async-handler=A: required"
        );
    }
}
