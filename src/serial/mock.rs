//! In-memory [`SerialSink`] for tests
//!
//! Records everything written to it and lets a test observe the byte
//! stream, toggle write failures, and check that the sink was released.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::SerialError;
use super::port::SerialSink;

#[derive(Debug, Default)]
struct MockSinkState {
    written: Mutex<Vec<u8>>,
    shut_down: AtomicBool,
    fail_writes: AtomicBool,
}

/// A [`SerialSink`] that appends writes to a shared in-memory buffer
#[derive(Debug)]
pub struct MockSerialSink {
    state: Arc<MockSinkState>,
}

/// Observer handle paired with a [`MockSerialSink`]
///
/// The handle stays valid after the sink has been moved into the engine.
#[derive(Debug, Clone)]
pub struct MockSinkHandle {
    state: Arc<MockSinkState>,
}

impl MockSerialSink {
    /// Create a sink and its observer handle
    #[must_use]
    pub fn new() -> (Self, MockSinkHandle) {
        let state = Arc::new(MockSinkState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            MockSinkHandle { state },
        )
    }
}

impl MockSinkHandle {
    /// Everything written so far, in write order
    #[must_use]
    pub fn written(&self) -> Vec<u8> {
        self.state.written.lock().clone()
    }

    /// Whether `shutdown` has been called on the sink
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.state.shut_down.load(Ordering::Relaxed)
    }

    /// Make every subsequent write fail with a broken-pipe error
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.fail_writes.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl SerialSink for MockSerialSink {
    async fn write_all(&mut self, buf: &[u8]) -> Result<(), SerialError> {
        if self.state.shut_down.load(Ordering::Relaxed) {
            return Err(SerialError::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "write after shutdown",
            )));
        }
        if self.state.fail_writes.load(Ordering::Relaxed) {
            return Err(SerialError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "mock write failure",
            )));
        }
        self.state.written.lock().extend_from_slice(buf);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), SerialError> {
        self.state.shut_down.store(true, Ordering::Relaxed);
        Ok(())
    }
}
