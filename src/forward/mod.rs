//! The forwarding engine module
//!
//! Bridges one bound UDP endpoint to one open serial port for the
//! lifetime of a session.
//!
//! # Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                        ForwardEngine                         |
//! |                                                              |
//! |  start()                         session task                |
//! |  - open serial port              - recv datagram             |
//! |  - bind UDP endpoint             - write bytes to sink       |
//! |  - spawn session task            - bump counters             |
//! |                                  - opportunistic progress    |
//! |  stop()                                                      |
//! |  - signal shutdown               teardown (in order)         |
//! |  - join session task             - close UDP endpoint        |
//! |                                  - flush + release serial    |
//! +--------------------------------------------------------------+
//! ```
//!
//! Lifecycle notifications go through [`EngineObserver`]; the binary
//! installs [`TracingObserver`] so transport events land in the log
//! rather than being printed by the engine itself.
//!
//! # Modules
//!
//! - [`engine`]: the engine, its states, and the session loop
//! - [`error`]: engine error type with the unsupported-platform classifier
//! - [`events`]: event notifications and the observer seam
//! - [`stats`]: atomic byte/datagram counters

pub mod engine;
pub mod error;
pub mod events;
pub mod stats;

// Re-export commonly used types
pub use engine::{EngineState, ForwardEngine, PROGRESS_INTERVAL};
pub use error::ForwardError;
pub use events::{EngineEvent, EngineObserver, TracingObserver};
pub use stats::{ForwardStats, ForwardStatsSnapshot};
