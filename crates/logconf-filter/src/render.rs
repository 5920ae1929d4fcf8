//! Textual rendering
//!
//! Structural printer: each combinator writes its head, its operands joined
//! by `,`, then its tail. No trailing separator is ever produced.
//!
//! [`Display`] prints any tree as-is and is meant for logs. [`render`] first
//! validates, so its output always parses back to the same tree.

use std::fmt::{self, Display, Formatter, Write};

use crate::error::RenderError;
use crate::expr::{FilterExpression, LevelRange, Substitution};

/// Render an expression to its canonical text
///
/// # Errors
/// Returns [`RenderError`] if the tree has no text that parses back to it
pub fn render(expression: &FilterExpression) -> Result<String, RenderError> {
    expression.validate()?;
    Ok(expression.to_string())
}

impl Display for FilterExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accept => f.write_str("accept"),
            Self::Deny => f.write_str("deny"),
            Self::All(ops) => write_call(f, "all", ops),
            Self::Any(ops) => write_call(f, "any", ops),
            Self::Not(op) => write!(f, "not({op})"),
            Self::Level(name) => write!(f, "level({name})"),
            Self::LevelRange(range) => Display::fmt(range, f),
            Self::LevelChange(name) => write!(f, "levelChange({name})"),
            Self::Match(pattern) => {
                f.write_str("match(")?;
                write_quoted(f, pattern)?;
                f.write_char(')')
            }
            Self::Substitute(sub) => Display::fmt(sub, f),
        }
    }
}

impl Display for LevelRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let open = if self.min_inclusive { '[' } else { '(' };
        let close = if self.max_inclusive { ']' } else { ')' };
        write!(f, "levelRange{open}{},{}{close}", self.min, self.max)
    }
}

impl Display for Substitution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(if self.all {
            "substituteAll("
        } else {
            "substitute("
        })?;
        write_quoted(f, &self.pattern)?;
        f.write_char(',')?;
        write_quoted(f, &self.replacement)?;
        f.write_char(')')
    }
}

fn write_call(f: &mut Formatter<'_>, head: &str, operands: &[FilterExpression]) -> fmt::Result {
    f.write_str(head)?;
    f.write_char('(')?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        Display::fmt(operand, f)?;
    }
    f.write_char(')')
}

fn write_quoted(f: &mut Formatter<'_>, text: &str) -> fmt::Result {
    f.write_char('"')?;
    for ch in text.chars() {
        if matches!(ch, '"' | '\\') {
            f.write_char('\\')?;
        }
        f.write_char(ch)?;
    }
    f.write_char('"')
}
