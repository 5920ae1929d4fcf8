//! Model error types

use crate::address::PathError;

/// Errors raised while assembling operations or applying them to a tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Address key does not name a logging resource type
    #[error("unknown resource type '{0}'")]
    UnknownResourceType(String),

    /// Name already declared in the same scope and category
    #[error("duplicate {category} name '{name}'")]
    DuplicateName {
        category: &'static str,
        name: String,
    },

    /// Resource already present at the address
    #[error("resource already exists at '{address}'")]
    DuplicateResource { address: String },

    /// Operation address does not fit where it was placed
    #[error("operation at '{address}' cannot be placed here: {reason}")]
    MisplacedOperation { address: String, reason: String },

    /// Address error
    #[error(transparent)]
    Address(#[from] PathError),
}

impl ModelError {
    /// Create a duplicate-name error
    #[inline]
    #[must_use]
    pub fn duplicate_name(category: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            category,
            name: name.into(),
        }
    }

    /// Create a misplaced-operation error
    #[inline]
    #[must_use]
    pub fn misplaced(address: impl ToString, reason: impl Into<String>) -> Self {
        Self::MisplacedOperation {
            address: address.to_string(),
            reason: reason.into(),
        }
    }
}
