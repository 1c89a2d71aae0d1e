//! Configuration resolution
//!
//! This module turns the command line, the persisted settings overlay,
//! and the live serial-port enumeration into one immutable [`Config`].
//!
//! # Architecture
//!
//! ```text
//! CLI args ----------+
//!                    v
//! udp2serial.toml -> resolve() -> Config | ResolveError
//!                    ^
//! port enumeration --+
//! ```
//!
//! Precedence for every optional field, independently: command line over
//! stored overlay over compiled default.
//!
//! # Modules
//!
//! - [`error`]: typed resolution and store errors with exit codes
//! - [`resolver`]: the merge and validation logic plus the usage text
//! - [`store`]: the sectioned TOML settings overlay
//! - [`types`]: the `Config` record and serial line-setting enums

pub mod error;
pub mod resolver;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{ResolveError, StoreError, EXIT_HELP};
pub use resolver::{resolve, usage};
pub use store::{load_or_create, SerialSection, StoredSettings, UdpSection, DEFAULT_STORE_PATH};
pub use types::{
    Config, Parity, StopBits, DEFAULT_BAUD_RATE, DEFAULT_DATA_BITS, DEFAULT_INTERFACE_IP,
};
