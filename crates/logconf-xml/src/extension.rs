//! Extension passthrough
//!
//! Elements directly under the subsystem root or a profile that the built-in
//! vocabulary does not cover are captured as a [`RawElement`] subtree and
//! offered to the registered [`ExtensionParser`]s. Inside resource and filter
//! elements unknown content is always rejected.

use std::fmt;
use std::sync::Arc;

use logconf_model::{Operation, PathAddress};

use crate::error::Position;

/// Captured element subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    /// Resolved namespace URI
    pub namespace: Option<String>,
    /// Local name
    pub name: String,
    /// Unqualified attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<RawElement>,
    /// Concatenated text content, trimmed
    pub text: String,
    /// Position of the start tag
    pub position: Position,
}

impl RawElement {
    /// Look up an attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child with the given local name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&RawElement> {
        self.children.iter().find(|child| child.name == name)
    }
}

/// Rejection reported by an extension parser
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ExtensionError {
    /// Human-readable reason
    pub message: String,
}

impl ExtensionError {
    /// Create an error with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parser for elements outside the built-in vocabulary
///
/// Implement this trait to let documents carry additional top-level
/// elements. Returned operations must be addressed inside `scope`.
pub trait ExtensionParser: Send + Sync + fmt::Debug {
    /// Local names this parser claims
    fn element_names(&self) -> &[&str];

    /// Turn a captured element into operations under `scope`
    ///
    /// # Errors
    /// Returns [`ExtensionError`] if the element is not acceptable
    fn parse(&self, element: &RawElement, scope: &PathAddress)
        -> Result<Vec<Operation>, ExtensionError>;
}

/// Registered extension parsers, searched in registration order
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    parsers: Vec<Arc<dyn ExtensionParser>>,
}

impl ExtensionRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser
    pub fn register(&mut self, parser: impl ExtensionParser + 'static) {
        self.parsers.push(Arc::new(parser));
    }

    /// Register a parser, builder style
    #[must_use]
    pub fn with(mut self, parser: impl ExtensionParser + 'static) -> Self {
        self.register(parser);
        self
    }

    /// First parser claiming `name`
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&dyn ExtensionParser> {
        self.parsers
            .iter()
            .find(|parser| parser.element_names().contains(&name))
            .map(|parser| &**parser)
    }

    /// Number of registered parsers
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Check if no parser is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .parsers
            .iter()
            .flat_map(|parser| parser.element_names().iter().copied())
            .collect();
        f.debug_struct("ExtensionRegistry")
            .field("parser_count", &self.parsers.len())
            .field("elements", &names)
            .finish()
    }
}
