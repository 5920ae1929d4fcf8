//! Recursive-descent parser for filter expressions
//!
//! ```text
//! expr  := "accept" | "deny"
//!        | "all(" list ")" | "any(" list ")" | "not(" expr ")"
//!        | "level(" IDENT ")" | "levelChange(" IDENT ")"
//!        | "levelRange" ("[" | "(") IDENT "," IDENT ("]" | ")")
//!        | "match(" STRING ")"
//!        | ("substitute" | "substituteAll") "(" STRING "," STRING ")"
//! list  := expr ("," expr)*
//! IDENT := [A-Za-z0-9_.$-]+
//! ```
//!
//! Whitespace is allowed between tokens. `levels(X)` is accepted as an
//! alias of `level(X)`.

use std::str::FromStr;

use crate::error::{GrammarError, GrammarErrorKind};
use crate::expr::{FilterExpression, LevelRange, Substitution};

/// Deepest nesting the parser accepts
pub const MAX_DEPTH: usize = 128;

/// Parse filter text into an expression tree
///
/// # Errors
/// Returns [`GrammarError`] with the byte offset of the first offending token
pub fn parse(text: &str) -> Result<FilterExpression, GrammarError> {
    let mut parser = Parser::new(text);
    let expression = parser.expression(0)?;
    parser.skip_whitespace();
    if parser.pos < text.len() {
        return Err(parser.error(GrammarErrorKind::TrailingInput));
    }
    tracing::debug!(filter = %expression, "parsed filter expression");
    Ok(expression)
}

impl FromStr for FilterExpression {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn error(&self, kind: GrammarErrorKind) -> GrammarError {
        GrammarError::new(self.pos, kind)
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn expect(&mut self, wanted: char, expected: &'static str) -> Result<(), GrammarError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == wanted => {
                self.pos += ch.len_utf8();
                Ok(())
            }
            Some(found) => Err(self.error(GrammarErrorKind::Unexpected { expected, found })),
            None => Err(self.error(GrammarErrorKind::UnexpectedEnd { expected })),
        }
    }

    /// Consume one of two characters, returning which
    fn either(&mut self, first: char, second: char, expected: &'static str) -> Result<bool, GrammarError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == first => {
                self.pos += 1;
                Ok(true)
            }
            Some(ch) if ch == second => {
                self.pos += 1;
                Ok(false)
            }
            Some(found) => Err(self.error(GrammarErrorKind::Unexpected { expected, found })),
            None => Err(self.error(GrammarErrorKind::UnexpectedEnd { expected })),
        }
    }

    fn identifier(&mut self, expected: &'static str) -> Result<&'a str, GrammarError> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '$' | '-') {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(match self.peek() {
                Some(found) => self.error(GrammarErrorKind::Unexpected { expected, found }),
                None => self.error(GrammarErrorKind::UnexpectedEnd { expected }),
            });
        }
        Ok(&self.text[start..self.pos])
    }

    fn string(&mut self) -> Result<String, GrammarError> {
        self.expect('"', "string literal")?;
        let mut out = String::new();
        let mut chars = self.text[self.pos..].char_indices();
        while let Some((i, ch)) = chars.next() {
            match ch {
                '"' => {
                    self.pos += i + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                },
                other => out.push(other),
            }
        }
        self.pos = self.text.len();
        Err(self.error(GrammarErrorKind::UnterminatedString))
    }

    fn expression(&mut self, depth: usize) -> Result<FilterExpression, GrammarError> {
        if depth >= MAX_DEPTH {
            return Err(self.error(GrammarErrorKind::TooDeep(MAX_DEPTH)));
        }

        let start = {
            self.skip_whitespace();
            self.pos
        };
        let name = self.identifier("filter name")?;

        let expression = match name {
            "accept" => FilterExpression::Accept,
            "deny" => FilterExpression::Deny,
            "all" => FilterExpression::All(self.operand_list(depth)?),
            "any" => FilterExpression::Any(self.operand_list(depth)?),
            "not" => {
                self.expect('(', "'('")?;
                let operand = self.expression(depth + 1)?;
                self.expect(')', "')'")?;
                FilterExpression::Not(Box::new(operand))
            }
            "level" | "levels" => FilterExpression::Level(self.identifier_argument()?),
            "levelChange" => FilterExpression::LevelChange(self.identifier_argument()?),
            "levelRange" => FilterExpression::LevelRange(self.level_range()?),
            "match" => {
                self.expect('(', "'('")?;
                let pattern = self.string()?;
                self.expect(')', "')'")?;
                FilterExpression::Match(pattern)
            }
            "substitute" | "substituteAll" => {
                self.expect('(', "'('")?;
                let pattern = self.string()?;
                self.expect(',', "','")?;
                let replacement = self.string()?;
                self.expect(')', "')'")?;
                FilterExpression::Substitute(Substitution {
                    pattern,
                    replacement,
                    all: name == "substituteAll",
                })
            }
            other => {
                return Err(GrammarError::new(
                    start,
                    GrammarErrorKind::UnknownFilter(other.to_string()),
                ))
            }
        };
        Ok(expression)
    }

    fn operand_list(&mut self, depth: usize) -> Result<Vec<FilterExpression>, GrammarError> {
        self.expect('(', "'('")?;
        let mut operands = vec![self.expression(depth + 1)?];
        while !self.either(')', ',', "',' or ')'")? {
            operands.push(self.expression(depth + 1)?);
        }
        Ok(operands)
    }

    fn identifier_argument(&mut self) -> Result<String, GrammarError> {
        self.expect('(', "'('")?;
        let name = self.identifier("level name")?.to_string();
        self.expect(')', "')'")?;
        Ok(name)
    }

    fn level_range(&mut self) -> Result<LevelRange, GrammarError> {
        let min_inclusive = self.either('[', '(', "'[' or '('")?;
        let min = self.identifier("level name")?.to_string();
        self.expect(',', "','")?;
        let max = self.identifier("level name")?.to_string();
        let max_inclusive = self.either(']', ')', "']' or ')'")?;
        Ok(LevelRange {
            min,
            max,
            min_inclusive,
            max_inclusive,
        })
    }
}
