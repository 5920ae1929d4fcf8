//! File-level entry point
//!
//! Bundles a parser and writer configuration and connects the two halves:
//!
//! - document text → operation list (ingress)
//! - operation list → resource tree
//! - resource tree → current-schema document (egress)

use std::fs;
use std::path::Path;

use logconf_model::{OperationList, ResourceTree};
use tracing::{debug, instrument};

use crate::config::{ParserConfig, WriterConfig};
use crate::error::SubsystemError;
use crate::parser::{parse_document, ParsedDocument};
use crate::writer::write;

/// Parser and writer sharing one configuration pair
#[derive(Debug, Clone, Default)]
pub struct LoggingSubsystem {
    parser: ParserConfig,
    writer: WriterConfig,
}

impl LoggingSubsystem {
    /// Create with default configurations
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace parser configuration
    #[must_use]
    pub fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.parser = config;
        self
    }

    /// Replace writer configuration
    #[must_use]
    pub fn with_writer_config(mut self, config: WriterConfig) -> Self {
        self.writer = config;
        self
    }

    /// Parser configuration in use
    #[inline]
    #[must_use]
    pub fn parser_config(&self) -> &ParserConfig {
        &self.parser
    }

    /// Writer configuration in use
    #[inline]
    #[must_use]
    pub fn writer_config(&self) -> &WriterConfig {
        &self.writer
    }

    /// Parse document text
    ///
    /// # Errors
    /// Returns [`SubsystemError::Parse`] on the first parse error
    pub fn parse_str(&self, source: &str) -> Result<ParsedDocument, SubsystemError> {
        Ok(parse_document(source, &self.parser)?)
    }

    /// Read and parse a document file
    ///
    /// # Errors
    /// Returns [`SubsystemError::Io`] if the file cannot be read, otherwise as
    /// [`Self::parse_str`]
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParsedDocument, SubsystemError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| SubsystemError::io_error(path, e))?;
        debug!(bytes = source.len(), "read document");
        self.parse_str(&source)
    }

    /// Build a resource tree from operations under the parser's base address
    ///
    /// # Errors
    /// Returns [`SubsystemError::Model`] if an operation does not fit the tree
    pub fn to_tree(&self, operations: &OperationList) -> Result<ResourceTree, SubsystemError> {
        Ok(ResourceTree::from_operations(operations, &self.parser.base_address)?)
    }

    /// Serialize a tree
    ///
    /// # Errors
    /// Returns [`SubsystemError::Write`] if the tree cannot be encoded
    pub fn write_string(&self, tree: &ResourceTree) -> Result<String, SubsystemError> {
        Ok(write(tree, &self.writer)?)
    }

    /// Serialize operations resolved against the writer's base address
    ///
    /// # Errors
    /// Returns [`SubsystemError::Model`] or [`SubsystemError::Write`]
    pub fn write_operations(&self, operations: &OperationList) -> Result<String, SubsystemError> {
        let tree = ResourceTree::from_operations(operations, &self.writer.base_address)?;
        self.write_string(&tree)
    }

    /// Serialize a tree to a file
    ///
    /// # Errors
    /// Returns [`SubsystemError::Io`] if the file cannot be written, otherwise
    /// as [`Self::write_string`]
    #[instrument(skip(self, tree), fields(path = %path.as_ref().display()))]
    pub fn write_file(&self, tree: &ResourceTree, path: impl AsRef<Path>) -> Result<(), SubsystemError> {
        let path = path.as_ref();
        let document = self.write_string(tree)?;
        fs::write(path, &document).map_err(|e| SubsystemError::io_error(path, e))?;
        debug!(bytes = document.len(), "wrote document");
        Ok(())
    }

    /// Upgrade a document of any supported version to the current schema
    ///
    /// # Errors
    /// Returns the first parse, model or write error
    pub fn rewrite_str(&self, source: &str) -> Result<String, SubsystemError> {
        let document = self.parse_str(source)?;
        let tree = self.to_tree(&document.operations)?;
        self.write_string(&tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::schema::SchemaVersion;
    use tempfile::TempDir;

    const LEGACY: &str = r#"<subsystem xmlns="urn:jboss:domain:logging:1.0">
        <console-handler name="CONSOLE">
            <level name="INFO"/>
        </console-handler>
        <root-logger>
            <handlers><handler name="CONSOLE"/></handlers>
        </root-logger>
    </subsystem>"#;

    #[test]
    fn rewrite_upgrades_namespace() {
        let subsystem = LoggingSubsystem::new();
        let out = subsystem.rewrite_str(LEGACY).unwrap();
        assert!(out.contains(SchemaVersion::CURRENT.namespace()));

        let reparsed = subsystem.parse_str(&out).unwrap();
        assert_eq!(reparsed.version, SchemaVersion::CURRENT);
        assert_eq!(reparsed.operations.len(), 2);
    }

    #[test]
    fn file_round_trip() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("logging.xml");
        let target = dir.path().join("out.xml");
        fs::write(&source, LEGACY).unwrap();

        let subsystem = LoggingSubsystem::new();
        let document = subsystem.parse_file(&source).unwrap();
        let tree = subsystem.to_tree(&document.operations).unwrap();
        subsystem.write_file(&tree, &target).unwrap();

        let rewritten = subsystem.parse_file(&target).unwrap();
        assert_eq!(subsystem.to_tree(&rewritten.operations).unwrap(), tree);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = LoggingSubsystem::new()
            .parse_file(dir.path().join("absent.xml"))
            .unwrap_err();
        assert!(matches!(err, SubsystemError::Io { .. }));
    }

    #[test]
    fn parse_errors_are_wrapped() {
        let err = LoggingSubsystem::new()
            .parse_str(r#"<subsystem xmlns="urn:example:other"/>"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SubsystemError::Parse(ParseError::UnsupportedSchema { .. })
        ));
    }
}
