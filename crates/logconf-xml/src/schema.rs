//! Schema versions
//!
//! Every supported revision of the logging subsystem schema is bound to one
//! namespace URI. Versions are totally ordered; newer versions accept a
//! superset of older vocabularies except for constructs gated with `until`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Supported schema revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaVersion {
    /// `urn:jboss:domain:logging:1.0`
    V1_0,
    /// `urn:jboss:domain:logging:1.1`
    V1_1,
    /// `urn:jboss:domain:logging:1.2`
    V1_2,
    /// `urn:jboss:domain:logging:1.3`
    V1_3,
    /// `urn:jboss:domain:logging:1.4`
    V1_4,
    /// `urn:jboss:domain:logging:1.5`
    V1_5,
}

impl SchemaVersion {
    /// The version the writer emits
    pub const CURRENT: Self = Self::V1_5;

    /// Every version, oldest first
    pub const ALL: [Self; 6] = [
        Self::V1_0,
        Self::V1_1,
        Self::V1_2,
        Self::V1_3,
        Self::V1_4,
        Self::V1_5,
    ];

    /// Short tag such as `1.3`
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
            Self::V1_2 => "1.2",
            Self::V1_3 => "1.3",
            Self::V1_4 => "1.4",
            Self::V1_5 => "1.5",
        }
    }

    /// Namespace URI
    #[must_use]
    pub fn namespace(self) -> &'static str {
        match self {
            Self::V1_0 => "urn:jboss:domain:logging:1.0",
            Self::V1_1 => "urn:jboss:domain:logging:1.1",
            Self::V1_2 => "urn:jboss:domain:logging:1.2",
            Self::V1_3 => "urn:jboss:domain:logging:1.3",
            Self::V1_4 => "urn:jboss:domain:logging:1.4",
            Self::V1_5 => "urn:jboss:domain:logging:1.5",
        }
    }

    /// Resolve a namespace URI
    ///
    /// # Errors
    /// Returns [`UnsupportedSchema`] for an unknown URI or a missing namespace
    pub fn resolve(namespace: Option<&str>) -> Result<Self, UnsupportedSchema> {
        namespace
            .and_then(|uri| Self::ALL.into_iter().find(|v| v.namespace() == uri))
            .ok_or_else(|| UnsupportedSchema {
                namespace: namespace.unwrap_or_default().to_string(),
            })
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SchemaVersion {
    type Err = UnsupportedSchema;

    /// Accepts a tag (`1.2`) or a full namespace URI
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.tag() == s || v.namespace() == s)
            .ok_or_else(|| UnsupportedSchema {
                namespace: s.to_string(),
            })
    }
}

/// Namespace is not one of the supported schema revisions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported schema namespace '{namespace}'")]
pub struct UnsupportedSchema {
    /// Offending namespace, empty when the element had none
    pub namespace: String,
}

/// Version window in which a construct is legal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    since: SchemaVersion,
    until: Option<SchemaVersion>,
}

impl Gate {
    /// Legal in every version
    pub const ALWAYS: Self = Self::since(SchemaVersion::V1_0);

    /// Legal from `version` onwards
    #[must_use]
    pub const fn since(version: SchemaVersion) -> Self {
        Self {
            since: version,
            until: None,
        }
    }

    /// Legal from the first version up to and including `version`
    #[must_use]
    pub const fn until(version: SchemaVersion) -> Self {
        Self {
            since: SchemaVersion::V1_0,
            until: Some(version),
        }
    }

    /// Check legality at a version
    #[inline]
    #[must_use]
    pub fn is_legal_at(self, version: SchemaVersion) -> bool {
        version >= self.since && self.until.map_or(true, |last| version <= last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_known_namespaces() {
        for version in SchemaVersion::ALL {
            assert_eq!(
                SchemaVersion::resolve(Some(version.namespace())),
                Ok(version)
            );
        }
    }

    #[test]
    fn resolve_rejects_unknown_and_missing() {
        let err = SchemaVersion::resolve(Some("urn:jboss:domain:logging:9.9")).unwrap_err();
        assert_eq!(err.namespace, "urn:jboss:domain:logging:9.9");
        assert!(SchemaVersion::resolve(None).is_err());
    }

    #[test]
    fn versions_are_ordered() {
        assert!(SchemaVersion::V1_0 < SchemaVersion::V1_1);
        assert_eq!(SchemaVersion::ALL.iter().max(), Some(&SchemaVersion::CURRENT));
    }

    #[test]
    fn parse_from_tag() {
        assert_eq!("1.3".parse::<SchemaVersion>(), Ok(SchemaVersion::V1_3));
        assert!("2.0".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn gate_windows() {
        let filter = Gate::until(SchemaVersion::V1_1);
        assert!(filter.is_legal_at(SchemaVersion::V1_0));
        assert!(filter.is_legal_at(SchemaVersion::V1_1));
        assert!(!filter.is_legal_at(SchemaVersion::V1_2));

        let spec = Gate::since(SchemaVersion::V1_2);
        assert!(!spec.is_legal_at(SchemaVersion::V1_1));
        assert!(spec.is_legal_at(SchemaVersion::V1_5));
        assert!(Gate::ALWAYS.is_legal_at(SchemaVersion::V1_0));
    }
}
