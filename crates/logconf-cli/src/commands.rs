//! Subcommand implementations
//!
//! Each command returns the text to print so it can be tested without a
//! process boundary.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use logconf_model::{OperationList, PathAddress};
use logconf_xml::{LoggingSubsystem, ParserConfig, WriterConfig};
use serde_json::json;
use tracing::info;

/// Options shared by the document commands
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    /// Address resources are created under
    pub base: PathAddress,
    /// Spaces per nesting level when writing
    pub indent: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            base: PathAddress::logging_subsystem(),
            indent: WriterConfig::default().indent,
        }
    }
}

impl DocumentOptions {
    fn subsystem(&self) -> LoggingSubsystem {
        LoggingSubsystem::new()
            .with_parser_config(ParserConfig::new().with_base_address(self.base.clone()))
            .with_writer_config(
                WriterConfig::new()
                    .with_indent(self.indent)
                    .with_base_address(self.base.clone()),
            )
    }
}

/// Parse `--base` text
///
/// # Errors
/// Returns error if the text is not a `type=name/...` address
pub fn parse_base(text: &str) -> Result<PathAddress> {
    text.parse::<PathAddress>()
        .with_context(|| format!("invalid base address '{text}'"))
}

/// `parse`: list the operations a document produces
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub fn parse(path: &Path, json: bool, options: &DocumentOptions) -> Result<String> {
    let document = options
        .subsystem()
        .parse_file(path)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    info!(version = %document.version, operations = document.operations.len(), "parsed");

    if json {
        return document
            .operations
            .to_json_pretty()
            .context("failed to render operations");
    }
    Ok(render_operations(&document.operations))
}

/// One line per operation: address, then sorted attributes
#[must_use]
pub fn render_operations(operations: &OperationList) -> String {
    let mut out = String::new();
    for operation in operations {
        let _ = write!(out, "add {}", operation.address());
        for (name, value) in operation.attributes() {
            let _ = write!(out, " {name}={value}");
        }
        out.push('\n');
    }
    out
}

/// `rewrite`: upgrade a document to the current schema
///
/// Writes to `output` when given and returns an empty string, otherwise
/// returns the document.
///
/// # Errors
/// Returns error if reading, parsing, writing or saving fails
pub fn rewrite(path: &Path, output: Option<&PathBuf>, options: &DocumentOptions) -> Result<String> {
    let subsystem = options.subsystem();
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document = subsystem
        .rewrite_str(&source)
        .with_context(|| format!("failed to rewrite {}", path.display()))?;

    match output {
        Some(target) => {
            fs::write(target, &document)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!(target = %target.display(), bytes = document.len(), "rewrote document");
            Ok(String::new())
        }
        None => Ok(document),
    }
}

/// `check`: parse and summarize without writing
///
/// # Errors
/// Returns error if the file cannot be read or parsed, or the operations do
/// not form a consistent tree
pub fn check(path: &Path, json: bool, options: &DocumentOptions) -> Result<String> {
    let subsystem = options.subsystem();
    let document = subsystem
        .parse_file(path)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let tree = subsystem.to_tree(&document.operations)?;
    let profiles: Vec<&str> = tree.profiles().map(|(name, _)| name).collect();

    if json {
        let summary = json!({
            "version": document.version.tag(),
            "operations": document.operations.len(),
            "resources": tree.resource_count(),
            "profiles": profiles,
        });
        return serde_json::to_string_pretty(&summary).context("failed to render summary");
    }
    let mut out = format!(
        "{}: schema {}, {} operations, {} resources",
        path.display(),
        document.version,
        document.operations.len(),
        tree.resource_count()
    );
    if !profiles.is_empty() {
        let _ = write!(out, ", profiles: {}", profiles.join(", "));
    }
    out.push('\n');
    Ok(out)
}

/// `filter`: canonical form of a filter expression
///
/// # Errors
/// Returns error if the expression does not parse
pub fn filter(expression: &str) -> Result<String> {
    let parsed = logconf_filter::parse(expression)
        .with_context(|| format!("invalid filter expression '{expression}'"))?;
    let canonical = logconf_filter::render(&parsed).context("failed to render filter")?;
    Ok(format!("{canonical}\n"))
}
