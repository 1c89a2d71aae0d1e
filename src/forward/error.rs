//! Error types for the forwarding engine

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::serial::SerialError;

/// Errors raised by `start`, the session loop, and `stop`
#[derive(Debug, Error)]
pub enum ForwardError {
    /// `start` was called while a session is already active
    #[error("a forwarding session is already active")]
    AlreadyRunning,

    /// The serial port could not be opened; no UDP endpoint was created
    #[error("failed to open serial port: {0}")]
    SerialOpen(#[source] SerialError),

    /// The UDP endpoint could not be bound; the serial port was released
    #[error("failed to bind UDP endpoint {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// A serial write failed; fatal to the session
    #[error("serial write failed: {0}")]
    SerialWrite(#[source] SerialError),

    /// Releasing the serial port at teardown failed
    #[error("serial close failed: {0}")]
    SerialClose(#[source] SerialError),

    /// The session task ended abnormally
    #[error("session task failed: {0}")]
    Session(String),
}

impl ForwardError {
    /// Whether the underlying failure means the platform cannot perform
    /// serial I/O at all
    #[must_use]
    pub fn is_unsupported_platform(&self) -> bool {
        match self {
            Self::SerialOpen(e) | Self::SerialWrite(e) | Self::SerialClose(e) => {
                e.is_unsupported()
            }
            Self::AlreadyRunning | Self::Bind { .. } | Self::Session(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_classification() {
        let err = ForwardError::SerialOpen(SerialError::unsupported("mark parity"));
        assert!(err.is_unsupported_platform());

        let err = ForwardError::SerialOpen(SerialError::open("COM3", "busy"));
        assert!(!err.is_unsupported_platform());

        let err = ForwardError::Bind {
            addr: "0.0.0.0:9000".parse().unwrap(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(!err.is_unsupported_platform());
    }

    #[test]
    fn test_error_display() {
        let err = ForwardError::Bind {
            addr: "0.0.0.0:9000".parse().unwrap(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };
        let msg = err.to_string();
        assert!(msg.contains("0.0.0.0:9000"));
        assert!(msg.contains("address in use"));
    }
}
