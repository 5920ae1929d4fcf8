//! Resource addresses in the management model
//!
//! Provides [`PathAddress`] for hierarchical addressing of resources such as
//! `subsystem=logging/console-handler=CONSOLE`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One `(type, name)` step of a [`PathAddress`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PathElement {
    #[serde(rename = "type")]
    key: String,
    #[serde(rename = "name")]
    value: String,
}

impl PathElement {
    /// Create new element
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Resource type segment (e.g. `console-handler`)
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resource name segment (e.g. `CONSOLE`)
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for PathElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Address of a resource in the management model
///
/// An ordered sequence of `(type, name)` pairs. Immutable: every
/// operation that extends or shortens an address returns a new one.
///
/// # Examples
/// - `[("subsystem", "logging")]` → `subsystem=logging`
/// - `[("subsystem", "logging"), ("logger", "com.foo")]` → `subsystem=logging/logger=com.foo`
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathAddress(Vec<PathElement>);

impl PathAddress {
    /// Create new address from elements
    #[inline]
    #[must_use]
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self(elements)
    }

    /// Empty address (model root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Address with a single element
    #[inline]
    #[must_use]
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self(vec![PathElement::new(key, value)])
    }

    /// `subsystem=logging`, the default base address
    #[must_use]
    pub fn logging_subsystem() -> Self {
        Self::single("subsystem", "logging")
    }

    /// Address elements
    #[inline]
    #[must_use]
    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    /// Number of elements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if address is the model root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last element (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&PathElement> {
        self.0.last()
    }

    /// First element (if not root)
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&PathElement> {
        self.0.first()
    }

    /// Parent address (if not root)
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Append an element, returning new address
    #[must_use]
    pub fn append(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(PathElement::new(key, value));
        new
    }

    /// Concatenate another address onto this one
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        let mut new = self.clone();
        new.0.extend(other.0.iter().cloned());
        new
    }

    /// Check if this address is a prefix of another (or equal to it)
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.0.len() <= other.0.len() && self.0 == other.0[..self.0.len()]
    }

    /// Address relative to an ancestor
    ///
    /// # Errors
    /// Returns [`PathError::NotDescendant`] if `base` is not a prefix of `self`
    pub fn relative_to(&self, base: &Self) -> Result<Self, PathError> {
        if !base.is_prefix_of(self) {
            return Err(PathError::NotDescendant {
                path: self.to_string(),
                base: base.to_string(),
            });
        }
        Ok(Self(self.0[base.0.len()..].to_vec()))
    }

    /// Iterate over elements
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.0.iter()
    }
}

impl Display for PathAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, element) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            Display::fmt(element, f)?;
        }
        Ok(())
    }
}

impl FromStr for PathAddress {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let mut elements = Vec::new();
        for part in s.split('/') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| PathError::MissingSeparator(part.to_string()))?;
            if key.is_empty() || value.is_empty() {
                return Err(PathError::EmptySegment(part.to_string()));
            }
            elements.push(PathElement::new(key, value));
        }

        Ok(Self(elements))
    }
}

impl From<PathElement> for PathAddress {
    fn from(element: PathElement) -> Self {
        Self(vec![element])
    }
}

impl<'a> IntoIterator for &'a PathAddress {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Address errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Segment without `=`
    #[error("address segment '{0}' is missing '='")]
    MissingSeparator(String),

    /// Segment with an empty type or name
    #[error("address segment '{0}' has an empty type or name")]
    EmptySegment(String),

    /// Address is not under the given base
    #[error("address '{path}' is not under '{base}'")]
    NotDescendant { path: String, base: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_root() {
        let root = PathAddress::root();
        assert!(root.is_empty());
        assert!(root.parent().is_none());
        assert_eq!(root.to_string(), "");
    }

    #[test]
    fn address_append_does_not_mutate() {
        let base = PathAddress::logging_subsystem();
        let child = base.append("console-handler", "CONSOLE");
        assert_eq!(base.len(), 1);
        assert_eq!(child.len(), 2);
        assert_eq!(child.parent(), Some(base));
    }

    #[test]
    fn address_display() {
        let address = PathAddress::logging_subsystem().append("root-logger", "ROOT");
        assert_eq!(address.to_string(), "subsystem=logging/root-logger=ROOT");
    }

    #[test]
    fn address_from_str_valid() {
        let address: PathAddress = "subsystem=logging/logger=com.foo".parse().unwrap();
        assert_eq!(address.len(), 2);
        assert_eq!(address.last().unwrap().key(), "logger");
        assert_eq!(address.last().unwrap().value(), "com.foo");
    }

    #[test]
    fn address_from_str_rejects_bad_segment() {
        assert!(matches!(
            "subsystem".parse::<PathAddress>(),
            Err(PathError::MissingSeparator(_))
        ));
        assert!(matches!(
            "subsystem=".parse::<PathAddress>(),
            Err(PathError::EmptySegment(_))
        ));
    }

    #[test]
    fn address_relative_to() {
        let base = PathAddress::logging_subsystem();
        let full = base.append("logging-profile", "p").append("logger", "x");
        let relative = full.relative_to(&base).unwrap();
        assert_eq!(relative.to_string(), "logging-profile=p/logger=x");
        assert_eq!(base.join(&relative), full);
    }

    #[test]
    fn address_relative_to_fails() {
        let base = PathAddress::logging_subsystem();
        let other = PathAddress::single("subsystem", "other").append("logger", "x");
        assert!(matches!(
            other.relative_to(&base),
            Err(PathError::NotDescendant { .. })
        ));
    }

    #[test]
    fn address_is_prefix_of() {
        let base = PathAddress::logging_subsystem();
        let child = base.append("logger", "x");
        assert!(base.is_prefix_of(&child));
        assert!(base.is_prefix_of(&base));
        assert!(!child.is_prefix_of(&base));
    }

    #[test]
    fn address_serializes_as_list() {
        let address = PathAddress::logging_subsystem();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, r#"[{"type":"subsystem","name":"logging"}]"#);
    }
}
