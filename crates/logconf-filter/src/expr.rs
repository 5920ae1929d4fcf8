//! Filter expression tree
//!
//! Provides [`FilterExpression`], the AST of the filter language attached to
//! handlers and loggers.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Boolean log-record filter
///
/// # Invariants
/// - `All`/`Any` hold at least one operand
/// - Level names are identifiers (`[A-Za-z0-9_.$-]+`)
/// - Rendering then parsing yields the same tree, not just an equivalent one
///
/// The parser only produces trees that hold these; trees built by hand are
/// checked by [`FilterExpression::validate`] before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterExpression {
    /// Accept every record
    Accept,
    /// Reject every record
    Deny,
    /// Accept when every operand accepts
    All(Vec<FilterExpression>),
    /// Accept when any operand accepts
    Any(Vec<FilterExpression>),
    /// Invert the operand
    Not(Box<FilterExpression>),
    /// Accept records at exactly this level
    Level(String),
    /// Accept records inside a level range
    LevelRange(LevelRange),
    /// Rewrite the record level
    LevelChange(String),
    /// Accept records whose message matches a regular expression
    Match(String),
    /// Rewrite matching parts of the message
    Substitute(Substitution),
}

/// Bounds of a [`FilterExpression::LevelRange`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelRange {
    /// Lower level name
    pub min: String,
    /// Upper level name
    pub max: String,
    /// `[` when true, `(` otherwise
    pub min_inclusive: bool,
    /// `]` when true, `)` otherwise
    pub max_inclusive: bool,
}

/// Arguments of a [`FilterExpression::Substitute`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Substitution {
    /// Regular expression to find
    pub pattern: String,
    /// Replacement text
    pub replacement: String,
    /// Replace every match instead of the first
    pub all: bool,
}

impl FilterExpression {
    /// Conjunction of operands
    #[must_use]
    pub fn all(operands: impl IntoIterator<Item = FilterExpression>) -> Self {
        Self::All(operands.into_iter().collect())
    }

    /// Disjunction of operands
    #[must_use]
    pub fn any(operands: impl IntoIterator<Item = FilterExpression>) -> Self {
        Self::Any(operands.into_iter().collect())
    }

    /// Negation
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(operand: FilterExpression) -> Self {
        Self::Not(Box::new(operand))
    }

    /// Exact level
    #[must_use]
    pub fn level(name: impl Into<String>) -> Self {
        Self::Level(name.into())
    }

    /// Level range with explicit inclusivity per side
    #[must_use]
    pub fn level_range(
        min: impl Into<String>,
        min_inclusive: bool,
        max: impl Into<String>,
        max_inclusive: bool,
    ) -> Self {
        Self::LevelRange(LevelRange {
            min: min.into(),
            max: max.into(),
            min_inclusive,
            max_inclusive,
        })
    }

    /// Level rewrite
    #[must_use]
    pub fn level_change(name: impl Into<String>) -> Self {
        Self::LevelChange(name.into())
    }

    /// Message pattern match
    #[must_use]
    pub fn matches(pattern: impl Into<String>) -> Self {
        Self::Match(pattern.into())
    }

    /// First-match substitution
    #[must_use]
    pub fn substitute(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::Substitute(Substitution {
            pattern: pattern.into(),
            replacement: replacement.into(),
            all: false,
        })
    }

    /// All-matches substitution
    #[must_use]
    pub fn substitute_all(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::Substitute(Substitution {
            pattern: pattern.into(),
            replacement: replacement.into(),
            all: true,
        })
    }

    /// Direct operands of a combinator, empty for leaves
    #[must_use]
    pub fn operands(&self) -> &[FilterExpression] {
        match self {
            Self::All(ops) | Self::Any(ops) => ops,
            Self::Not(op) => std::slice::from_ref(op.as_ref()),
            _ => &[],
        }
    }

    /// Nesting depth; leaves have depth 1
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .operands()
            .iter()
            .map(FilterExpression::depth)
            .max()
            .unwrap_or(0)
    }

    /// Check the tree has a textual form
    ///
    /// # Errors
    /// Returns [`RenderError`] for the first empty combinator or bad level name
    pub fn validate(&self) -> Result<(), RenderError> {
        match self {
            Self::All(ops) | Self::Any(ops) => {
                if ops.is_empty() {
                    let head = if matches!(self, Self::All(_)) { "all" } else { "any" };
                    return Err(RenderError::EmptyOperands(head));
                }
                ops.iter().try_for_each(FilterExpression::validate)
            }
            Self::Not(op) => op.validate(),
            Self::Level(name) | Self::LevelChange(name) => check_level_name(name),
            Self::LevelRange(range) => {
                check_level_name(&range.min)?;
                check_level_name(&range.max)
            }
            Self::Accept | Self::Deny | Self::Match(_) | Self::Substitute(_) => Ok(()),
        }
    }

    /// True for `all`, `any` and `not`
    #[inline]
    #[must_use]
    pub fn is_combinator(&self) -> bool {
        matches!(self, Self::All(_) | Self::Any(_) | Self::Not(_))
    }
}

/// True when `name` can appear as a level argument
#[must_use]
pub fn is_level_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '$' | '-'))
}

fn check_level_name(name: &str) -> Result<(), RenderError> {
    if is_level_name(name) {
        Ok(())
    } else {
        Err(RenderError::InvalidLevelName(name.to_string()))
    }
}
