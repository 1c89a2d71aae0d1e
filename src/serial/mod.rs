//! Serial-port collaborator
//!
//! Everything the bridge needs from the host serial stack: fresh port
//! enumeration, opening a port with the configuration's line settings,
//! and the [`SerialSink`] seam the forwarding engine writes through.
//!
//! The seam exists so the engine can be exercised without hardware;
//! [`mock::MockSerialSink`] is the in-memory implementation used by the
//! test suites.
//!
//! # Modules
//!
//! - [`error`]: serial error type with the unsupported-platform classifier
//! - [`mock`]: in-memory sink for tests
//! - [`port`]: enumeration, open, and the real sink

pub mod error;
pub mod mock;
pub mod port;

// Re-export commonly used types
pub use error::SerialError;
pub use mock::{MockSerialSink, MockSinkHandle};
pub use port::{enumerate_ports, open, SerialSink, SerialStreamSink};
