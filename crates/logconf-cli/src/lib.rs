//! logconf command-line front end
//!
//! Thin wrappers over [`logconf_xml`] used by the `logconf` binary:
//!
//! - `parse`: list the add operations a document produces
//! - `rewrite`: upgrade a document of any version to the current schema
//! - `check`: validate and summarize a document
//! - `filter`: print the canonical form of a filter expression

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod commands;

pub use commands::DocumentOptions;
