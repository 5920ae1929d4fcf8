//! Parser and writer configuration

use logconf_model::PathAddress;

use crate::extension::{ExtensionParser, ExtensionRegistry};

/// Parser configuration
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Address the subsystem's resources are created under
    pub base_address: PathAddress,
    /// Parsers for top-level elements outside the built-in vocabulary
    pub extensions: ExtensionRegistry,
    /// Maximum element nesting before the document is rejected
    pub max_depth: usize,
}

impl ParserConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base address
    #[inline]
    #[must_use]
    pub fn with_base_address(mut self, base: PathAddress) -> Self {
        self.base_address = base;
        self
    }

    /// With one more extension parser
    #[must_use]
    pub fn with_extension(mut self, parser: impl ExtensionParser + 'static) -> Self {
        self.extensions.register(parser);
        self
    }

    /// With extension registry, replacing the current one
    #[inline]
    #[must_use]
    pub fn with_extensions(mut self, extensions: ExtensionRegistry) -> Self {
        self.extensions = extensions;
        self
    }

    /// With maximum nesting depth
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            base_address: PathAddress::logging_subsystem(),
            extensions: ExtensionRegistry::new(),
            max_depth: 64,
        }
    }
}

/// Writer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Spaces per nesting level
    pub indent: usize,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>`
    pub xml_declaration: bool,
    /// Address operations are resolved against when building a tree
    pub base_address: PathAddress,
}

impl WriterConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With indent width
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// With or without the XML declaration
    #[inline]
    #[must_use]
    pub fn with_xml_declaration(mut self, enabled: bool) -> Self {
        self.xml_declaration = enabled;
        self
    }

    /// With base address
    #[inline]
    #[must_use]
    pub fn with_base_address(mut self, base: PathAddress) -> Self {
        self.base_address = base;
        self
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: 4,
            xml_declaration: true,
            base_address: PathAddress::logging_subsystem(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let parser = ParserConfig::default();
        assert_eq!(parser.max_depth, 64);
        assert!(parser.extensions.is_empty());
        assert_eq!(parser.base_address.to_string(), "subsystem=logging");

        let writer = WriterConfig::default();
        assert_eq!(writer.indent, 4);
        assert!(writer.xml_declaration);
    }

    #[test]
    fn builders_chain() {
        let base = PathAddress::single("profile", "full").append("subsystem", "logging");
        let parser = ParserConfig::new()
            .with_base_address(base.clone())
            .with_max_depth(8);
        assert_eq!(parser.base_address, base);
        assert_eq!(parser.max_depth, 8);

        let writer = WriterConfig::new().with_indent(2).with_xml_declaration(false);
        assert_eq!(writer.indent, 2);
        assert!(!writer.xml_declaration);
    }
}
