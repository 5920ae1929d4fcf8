//! logconf filter language
//!
//! Boolean filter expressions attached to handlers and loggers.
//!
//! # Overview
//!
//! - **FilterExpression**: the expression tree
//! - **parse**: text → tree, with byte offsets on error
//! - **render**: tree → canonical text, so that `parse(render(e)?) == e`
//!
//! # Example
//!
//! ```rust
//! use logconf_filter::{parse, render, FilterExpression};
//!
//! let expr = parse("all(deny, any(match(\"x\"), level(WARN)))").unwrap();
//! let text = render(&expr).unwrap();
//! assert_eq!(text, "all(deny,any(match(\"x\"),level(WARN)))");
//! assert_eq!(parse(&text).unwrap(), expr);
//!
//! assert!(render(&FilterExpression::all([])).is_err());
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod expr;
pub mod parser;
pub mod render;

// Re-exports
pub use error::{GrammarError, GrammarErrorKind, RenderError};
pub use expr::{is_level_name, FilterExpression, LevelRange, Substitution};
pub use parser::{parse, MAX_DEPTH};
pub use render::render;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for filter handling
    pub use crate::{
        parse, render, FilterExpression, GrammarError, LevelRange, RenderError, Substitution,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
