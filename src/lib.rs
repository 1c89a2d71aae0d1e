//! udp2serial: one-way UDP to serial-port byte bridge
//!
//! Datagrams received on a UDP socket are written verbatim, in arrival
//! order, to an open serial port. There is no framing, no reverse path,
//! and no buffering beyond what the OS socket and serial driver provide.
//!
//! # Architecture
//!
//! ```text
//! CLI args + settings file + port enumeration
//!                  |
//!                  v
//!          +---------------+
//!          |   Resolver    |  -> immutable Config
//!          +---------------+
//!                  |
//!                  v
//!          +---------------+      +----------------+
//!          | ForwardEngine | ---> | SerialSink     |
//!          | UDP recv loop |      | (serial port)  |
//!          +---------------+      +----------------+
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use udp2serial::{Config, ForwardEngine, TracingObserver};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new(9000, "/dev/ttyUSB0").with_baud_rate(115_200);
//!
//! let mut engine = ForwardEngine::new(config, Arc::new(TracingObserver));
//! engine.start().await?;
//!
//! tokio::signal::ctrl_c().await?;
//! engine.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`config`]: configuration record, settings store, and CLI resolver
//! - [`error`]: top-level error type
//! - [`forward`]: the forwarding engine and its events/statistics
//! - [`serial`]: serial-port enumeration, open, and the sink seam

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod forward;
pub mod serial;

// Re-export commonly used types at the crate root
pub use config::{resolve, Config, Parity, ResolveError, StopBits, StoredSettings};
pub use error::BridgeError;
pub use forward::{
    EngineEvent, EngineObserver, EngineState, ForwardEngine, ForwardError, ForwardStats,
    ForwardStatsSnapshot, TracingObserver,
};
pub use serial::{enumerate_ports, SerialError, SerialSink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
