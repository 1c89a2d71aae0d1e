//! Error types for configuration resolution and the settings store

use std::io;

use thiserror::Error;

/// Process exit code used when help was requested
pub const EXIT_HELP: i32 = 255;

/// Render the available-ports list for the `InvalidComPort` message
fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "no serial ports were found on this host".to_string()
    } else {
        format!("available ports: {}", available.join(", "))
    }
}

/// Errors produced while resolving the command line into a [`Config`]
///
/// Each variant maps to a fixed process exit code; the binary prints the
/// usage text alongside the error message for every variant except
/// `HelpRequested`, which is not an error.
///
/// [`Config`]: super::Config
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Wrong number of positional arguments
    #[error("expected one or two positional arguments (UDP port, optional serial port), got {count}")]
    BadArgumentCount { count: usize },

    /// The UDP port positional did not parse as a nonzero u16
    #[error("invalid UDP port '{value}': must be an integer between 1 and 65535")]
    InvalidUdpPort { value: String },

    /// The requested serial port is not present on the host
    #[error("serial port '{requested}' was not found; {}", format_available(.available))]
    InvalidComPort {
        requested: String,
        available: Vec<String>,
    },

    /// No serial port was supplied and none could be enumerated
    #[error("no serial ports were found on this host")]
    NoComPortsFound,

    /// Unrecognized option token
    #[error("unknown option '{name}'")]
    UnknownOption { name: String },

    /// An option value failed to parse
    #[error("invalid value '{value}' for option '{name}': {reason}")]
    InvalidOptionValue {
        name: String,
        value: String,
        reason: String,
    },

    /// A help token was seen; not an error, but short-circuits resolution
    #[error("help requested")]
    HelpRequested,
}

impl ResolveError {
    /// Process exit code for this resolution outcome
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::BadArgumentCount { .. }
            | Self::UnknownOption { .. }
            | Self::InvalidOptionValue { .. } => 1,
            Self::InvalidUdpPort { .. } => 2,
            Self::InvalidComPort { .. } => 3,
            Self::NoComPortsFound => 4,
            Self::HelpRequested => EXIT_HELP,
        }
    }

    /// Whether this outcome is a help request rather than an error
    #[must_use]
    pub const fn is_help(&self) -> bool {
        matches!(self, Self::HelpRequested)
    }

    /// Create an `InvalidOptionValue` error
    pub fn invalid_option_value(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOptionValue {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors reading or parsing the persisted settings store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file could not be read or the template could not be written
    #[error("settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The file exists but is not valid TOML
    #[error("settings file {path} could not be parsed: {reason}")]
    Parse { path: String, reason: String },
}
