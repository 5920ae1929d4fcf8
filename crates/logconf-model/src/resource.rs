//! Resource types of the logging subsystem

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name under which the single root logger of a scope is addressed
pub const ROOT_LOGGER_NAME: &str = "ROOT";

/// Kind of resource an add operation creates
///
/// The string form is the address key, e.g. `console-handler`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    /// Synchronous console handler
    ConsoleHandler,
    /// Plain file handler
    FileHandler,
    /// User-supplied handler class
    CustomHandler,
    /// File handler rotating by date suffix
    PeriodicRotatingFileHandler,
    /// File handler rotating by date suffix and size
    PeriodicSizeRotatingFileHandler,
    /// File handler rotating by size
    SizeRotatingFileHandler,
    /// Syslog handler
    SyslogHandler,
    /// Queueing handler wrapping sub-handlers
    AsyncHandler,
    /// Named logger category
    Logger,
    /// The root logger
    RootLogger,
    /// Named pattern formatter
    PatternFormatter,
    /// Named custom formatter
    CustomFormatter,
    /// Isolated logging profile
    LoggingProfile,
}

/// Grouping used to order operations and to scope name uniqueness
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceCategory {
    /// Pattern and custom formatters
    Formatter,
    /// Every synchronous handler kind
    Handler,
    /// Async handlers
    AsyncHandler,
    /// Named loggers
    Logger,
    /// The root logger
    RootLogger,
    /// Logging profiles
    Profile,
}

impl ResourceType {
    /// Every resource type
    pub const ALL: [Self; 13] = [
        Self::ConsoleHandler,
        Self::FileHandler,
        Self::CustomHandler,
        Self::PeriodicRotatingFileHandler,
        Self::PeriodicSizeRotatingFileHandler,
        Self::SizeRotatingFileHandler,
        Self::SyslogHandler,
        Self::AsyncHandler,
        Self::Logger,
        Self::RootLogger,
        Self::PatternFormatter,
        Self::CustomFormatter,
        Self::LoggingProfile,
    ];

    /// Address key for this type
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::ConsoleHandler => "console-handler",
            Self::FileHandler => "file-handler",
            Self::CustomHandler => "custom-handler",
            Self::PeriodicRotatingFileHandler => "periodic-rotating-file-handler",
            Self::PeriodicSizeRotatingFileHandler => "periodic-size-rotating-file-handler",
            Self::SizeRotatingFileHandler => "size-rotating-file-handler",
            Self::SyslogHandler => "syslog-handler",
            Self::AsyncHandler => "async-handler",
            Self::Logger => "logger",
            Self::RootLogger => "root-logger",
            Self::PatternFormatter => "pattern-formatter",
            Self::CustomFormatter => "custom-formatter",
            Self::LoggingProfile => "logging-profile",
        }
    }

    /// Look up a type by its address key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }

    /// Category this type belongs to
    #[must_use]
    pub fn category(self) -> ResourceCategory {
        match self {
            Self::ConsoleHandler
            | Self::FileHandler
            | Self::CustomHandler
            | Self::PeriodicRotatingFileHandler
            | Self::PeriodicSizeRotatingFileHandler
            | Self::SizeRotatingFileHandler
            | Self::SyslogHandler => ResourceCategory::Handler,
            Self::AsyncHandler => ResourceCategory::AsyncHandler,
            Self::Logger => ResourceCategory::Logger,
            Self::RootLogger => ResourceCategory::RootLogger,
            Self::PatternFormatter | Self::CustomFormatter => ResourceCategory::Formatter,
            Self::LoggingProfile => ResourceCategory::Profile,
        }
    }

    /// True for every handler kind, async included
    #[inline]
    #[must_use]
    pub fn is_handler(self) -> bool {
        matches!(
            self.category(),
            ResourceCategory::Handler | ResourceCategory::AsyncHandler
        )
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ResourceType {
    type Err = crate::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| crate::ModelError::UnknownResourceType(s.to_string()))
    }
}

impl ResourceCategory {
    /// Label used for duplicate-name errors
    ///
    /// Handlers and async handlers share one name scope, so both report `handler`.
    #[must_use]
    pub fn scope_label(self) -> &'static str {
        match self {
            Self::Formatter => "formatter",
            Self::Handler | Self::AsyncHandler => "handler",
            Self::Logger => "logger",
            Self::RootLogger => "root-logger",
            Self::Profile => "logging-profile",
        }
    }
}
