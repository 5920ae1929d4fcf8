//! logconf management model
//!
//! Addresses, typed values and "add" operations describing a logging
//! subsystem configuration.
//!
//! # Core Concepts
//!
//! - [`PathAddress`]: ordered `(type, name)` pairs locating a resource
//! - [`ModelValue`]: decoded attribute value
//! - [`Operation`]: "create resource at address with attributes"
//! - [`OperationBuilder`]: accumulates operations into fixed emission buckets
//! - [`ResourceTree`]: in-memory configuration, rebuilt from operations
//!
//! # Example
//!
//! ```rust
//! use logconf_model::{Operation, OperationBuilder, PathAddress, ResourceTree};
//!
//! let base = PathAddress::logging_subsystem();
//! let mut builder = OperationBuilder::new(base.clone());
//! let top = builder.top_mut();
//! let console = top.resource_address(logconf_model::ResourceType::ConsoleHandler, "CONSOLE");
//! top.push(Operation::add(console).with_attribute("level", "INFO")).unwrap();
//!
//! let ops = builder.build();
//! let tree = ResourceTree::from_operations(&ops, &base).unwrap();
//! assert_eq!(tree.resource_count(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod address;
mod builder;
mod error;
mod operation;
mod resource;
mod tree;
mod value;

pub use address::{PathAddress, PathElement, PathError};
pub use builder::{NameScope, OperationBuilder, ScopeBuilder};
pub use error::ModelError;
pub use operation::{Operation, OperationList};
pub use resource::{ResourceCategory, ResourceType, ROOT_LOGGER_NAME};
pub use tree::ResourceTree;
pub use value::{AttributeMap, ModelValue, PropertyMap};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
