//! Filter grammar errors

/// Error parsing a filter expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at offset {offset}")]
pub struct GrammarError {
    /// Byte offset inside the expression text
    pub offset: usize,
    /// What went wrong
    pub kind: GrammarErrorKind,
}

/// Kinds of [`GrammarError`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarErrorKind {
    /// Input ended early
    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    /// Wrong character
    #[error("expected {expected}, found '{found}'")]
    Unexpected { expected: &'static str, found: char },

    /// Name is not a filter
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),

    /// String literal without closing quote
    #[error("unterminated string literal")]
    UnterminatedString,

    /// Input left over after a complete expression
    #[error("trailing input after expression")]
    TrailingInput,

    /// Nesting exceeds the parser's limit
    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Expression tree that has no textual form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// `all` or `any` without operands
    #[error("{0}() needs at least one operand")]
    EmptyOperands(&'static str),

    /// Level name outside `[A-Za-z0-9_.$-]+`
    #[error("'{0}' is not a valid level name")]
    InvalidLevelName(String),
}

impl GrammarError {
    /// Create a new error
    #[inline]
    #[must_use]
    pub fn new(offset: usize, kind: GrammarErrorKind) -> Self {
        Self { offset, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offset() {
        let err = GrammarError::new(4, GrammarErrorKind::UnknownFilter("bogus".into()));
        assert_eq!(err.to_string(), "unknown filter 'bogus' at offset 4");
    }

    #[test]
    fn display_unexpected_char() {
        let err = GrammarError::new(
            3,
            GrammarErrorKind::Unexpected {
                expected: "'('",
                found: ']',
            },
        );
        assert_eq!(err.to_string(), "expected '(', found ']' at offset 3");
    }

    #[test]
    fn display_render_errors() {
        assert_eq!(
            RenderError::EmptyOperands("any").to_string(),
            "any() needs at least one operand"
        );
        assert_eq!(
            RenderError::InvalidLevelName("a b".into()).to_string(),
            "'a b' is not a valid level name"
        );
    }
}
