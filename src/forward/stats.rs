//! Forwarding statistics
//!
//! All counter mutation happens on the session task; readers take relaxed
//! snapshots.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic session counters, monotonic for the process lifetime
#[derive(Debug, Default)]
pub struct ForwardStats {
    /// Total payload bytes written to the serial port
    bytes_forwarded: AtomicU64,
    /// Total datagrams forwarded
    datagrams_forwarded: AtomicU64,
    /// Socket-level receive failures (session continues)
    receive_errors: AtomicU64,
}

impl ForwardStats {
    /// Create zeroed statistics
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one forwarded datagram of `bytes` payload bytes
    pub fn record_forwarded(&self, bytes: u64) {
        self.datagrams_forwarded.fetch_add(1, Ordering::Relaxed);
        self.bytes_forwarded.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a socket-level receive failure
    pub fn record_receive_error(&self) {
        self.receive_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Total payload bytes forwarded
    #[must_use]
    pub fn bytes_forwarded(&self) -> u64 {
        self.bytes_forwarded.load(Ordering::Relaxed)
    }

    /// Total datagrams forwarded
    #[must_use]
    pub fn datagrams_forwarded(&self) -> u64 {
        self.datagrams_forwarded.load(Ordering::Relaxed)
    }

    /// Total receive failures
    #[must_use]
    pub fn receive_errors(&self) -> u64 {
        self.receive_errors.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters
    #[must_use]
    pub fn snapshot(&self) -> ForwardStatsSnapshot {
        ForwardStatsSnapshot {
            bytes_forwarded: self.bytes_forwarded(),
            datagrams_forwarded: self.datagrams_forwarded(),
            receive_errors: self.receive_errors(),
        }
    }
}

/// Snapshot of forwarding statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardStatsSnapshot {
    /// Total payload bytes forwarded
    pub bytes_forwarded: u64,
    /// Total datagrams forwarded
    pub datagrams_forwarded: u64,
    /// Total receive failures
    pub receive_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = ForwardStats::new();
        assert_eq!(stats.bytes_forwarded(), 0);

        stats.record_forwarded(100);
        stats.record_forwarded(28);
        stats.record_receive_error();

        assert_eq!(stats.bytes_forwarded(), 128);
        assert_eq!(stats.datagrams_forwarded(), 2);
        assert_eq!(stats.receive_errors(), 1);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.bytes_forwarded, 128);
        assert_eq!(snapshot.datagrams_forwarded, 2);
        assert_eq!(snapshot.receive_errors, 1);
    }
}
