//! logconf XML
//!
//! Reads every published revision of the logging subsystem schema (1.0
//! through 1.5) into an ordered list of "add" operations, and writes a
//! resource tree back as a current-schema document.
//!
//! # Pipeline
//!
//! ```text
//! document (any version) → parser → OperationList → ResourceTree → writer → document (1.5)
//! ```
//!
//! Each element kind is checked against a per-version [`vocabulary`] table:
//! attributes and children outside their version window are rejected, the
//! nested filter form of 1.0 is folded into `filter-spec` text, and names are
//! unique per category within each scope.
//!
//! # Example
//!
//! ```rust
//! use logconf_xml::{parse, ParserConfig};
//!
//! let source = r#"<subsystem xmlns="urn:jboss:domain:logging:1.5">
//!     <console-handler name="CONSOLE"><level name="INFO"/></console-handler>
//!     <root-logger><handlers><handler name="CONSOLE"/></handlers></root-logger>
//! </subsystem>"#;
//!
//! let operations = parse(source, &ParserConfig::default()).unwrap();
//! assert_eq!(operations.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod codec;
pub mod config;
mod cursor;
pub mod error;
pub mod extension;
pub mod parser;
pub mod schema;
pub mod subsystem;
pub mod vocabulary;
pub mod writer;

pub use config::{ParserConfig, WriterConfig};
pub use error::{ParseError, ParseErrorKind, Position, SubsystemError, WriteError};
pub use extension::{ExtensionError, ExtensionParser, ExtensionRegistry, RawElement};
pub use parser::{parse, parse_document, ParsedDocument};
pub use schema::SchemaVersion;
pub use subsystem::LoggingSubsystem;
pub use writer::write;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for reading and writing subsystem documents
    pub use crate::config::{ParserConfig, WriterConfig};
    pub use crate::error::{ParseError, SubsystemError, WriteError};
    pub use crate::extension::{ExtensionParser, ExtensionRegistry, RawElement};
    pub use crate::parser::{parse, parse_document};
    pub use crate::schema::SchemaVersion;
    pub use crate::subsystem::LoggingSubsystem;
    pub use crate::writer::write;
    pub use logconf_model::{OperationList, PathAddress, ResourceTree};
}
