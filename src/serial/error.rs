//! Error types for serial-port operations

use std::io;

use thiserror::Error;

/// Errors raised by enumeration, open, and writes on the serial side
#[derive(Debug, Error)]
pub enum SerialError {
    /// Host port enumeration failed
    #[error("failed to enumerate serial ports: {0}")]
    Enumeration(String),

    /// The port could not be opened
    #[error("failed to open serial port {port}: {reason}")]
    Open { port: String, reason: String },

    /// The requested line settings cannot be expressed through the host
    /// serial stack on this platform
    #[error("{what} is not supported by the host serial stack")]
    Unsupported { what: String },

    /// I/O error on an open port
    #[error("serial I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SerialError {
    /// Whether this failure means the platform cannot perform the request
    /// at all, as opposed to a transient or configuration problem
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        match self {
            Self::Unsupported { .. } => true,
            Self::Io(e) => e.kind() == io::ErrorKind::Unsupported,
            Self::Enumeration(_) | Self::Open { .. } => false,
        }
    }

    /// Create an `Open` error
    pub fn open(port: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Open {
            port: port.into(),
            reason: reason.into(),
        }
    }

    /// Create an `Unsupported` error
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::Unsupported { what: what.into() }
    }
}
