//! Engine event notifications
//!
//! The engine reports connection lifecycle and data-path outcomes through
//! an observer instead of writing to the console itself; the binary
//! installs [`TracingObserver`], tests install a collector.

use std::net::SocketAddr;

use tracing::{error, info, trace, warn};

/// Notifications emitted by the forwarding engine
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The UDP bind sequence is starting
    ConnectAttempt { addr: SocketAddr },

    /// The UDP endpoint is bound and ready to receive
    Connected { addr: SocketAddr },

    /// The UDP bind failed; the session is aborted, never retried
    ConnectFailed { addr: SocketAddr, reason: String },

    /// One datagram was received and fully written to the serial port
    DatagramForwarded { len: usize, peer: SocketAddr },

    /// A socket-level receive failure; the session continues
    ReceiveError { reason: String },

    /// The UDP endpoint has closed
    Disconnected,

    /// Periodic, data-gated report of the cumulative byte count
    Progress { total_bytes: u64 },
}

/// Consumer of [`EngineEvent`] notifications
///
/// Called from the session task; implementations must be cheap and must
/// not block.
pub trait EngineObserver: Send + Sync {
    fn on_event(&self, event: &EngineEvent);
}

/// Observer that renders events to the `tracing` log
#[derive(Debug, Default)]
pub struct TracingObserver;

impl EngineObserver for TracingObserver {
    fn on_event(&self, event: &EngineEvent) {
        match event {
            EngineEvent::ConnectAttempt { addr } => {
                info!(addr = %addr, "Binding UDP endpoint");
            }
            EngineEvent::Connected { addr } => {
                info!(addr = %addr, "UDP endpoint ready");
            }
            EngineEvent::ConnectFailed { addr, reason } => {
                error!(addr = %addr, reason = %reason, "UDP bind failed");
            }
            EngineEvent::DatagramForwarded { len, peer } => {
                trace!(len = len, peer = %peer, "Datagram forwarded");
            }
            EngineEvent::ReceiveError { reason } => {
                warn!(reason = %reason, "UDP receive failed, continuing");
            }
            EngineEvent::Disconnected => {
                info!("UDP endpoint closed");
            }
            EngineEvent::Progress { total_bytes } => {
                info!(total_bytes = total_bytes, "Forwarded {total_bytes} bytes so far");
            }
        }
    }
}
