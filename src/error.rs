//! Top-level error type
//!
//! Aggregates the subsystem errors so the binary can classify any failure
//! at its outermost scope. The one load-bearing distinction lives in
//! [`BridgeError::is_unsupported_platform`]: those failures are absorbed
//! silently, everything else is reported.

use std::io;

use thiserror::Error;

use crate::config::{ResolveError, StoreError};
use crate::forward::ForwardError;
use crate::serial::SerialError;

/// Top-level error for the bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Settings store errors (read/parse)
    #[error("settings error: {0}")]
    Store(#[from] StoreError),

    /// Command-line resolution errors
    #[error("argument error: {0}")]
    Resolve(#[from] ResolveError),

    /// Serial enumeration/open/write errors
    #[error("serial error: {0}")]
    Serial(#[from] SerialError),

    /// Forwarding engine errors
    #[error("forwarding error: {0}")]
    Forward(#[from] ForwardError),

    /// I/O errors not covered by other categories
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BridgeError {
    /// Whether this failure means the platform cannot perform serial I/O
    /// at all; such failures are absorbed silently at the top level
    #[must_use]
    pub fn is_unsupported_platform(&self) -> bool {
        match self {
            Self::Serial(e) => e.is_unsupported(),
            Self::Forward(e) => e.is_unsupported_platform(),
            Self::Io(e) => e.kind() == io::ErrorKind::Unsupported,
            Self::Store(_) | Self::Resolve(_) => false,
        }
    }
}

/// Type alias for Result with [`BridgeError`]
pub type Result<T> = std::result::Result<T, BridgeError>;
