//! The forwarding engine
//!
//! Owns the serial sink and the UDP endpoint for exactly one session per
//! process run, drives the receive-to-write data path on a single task
//! (which is what guarantees arrival-order forwarding), and tears both
//! endpoints down in a fixed order on stop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::error::ForwardError;
use super::events::{EngineEvent, EngineObserver};
use super::stats::ForwardStats;
use crate::config::Config;
use crate::serial::{self, SerialSink};

/// Maximum UDP payload size
const MAX_DATAGRAM_SIZE: usize = 65_535;

/// Default interval between progress reports
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Engine lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No session active; the terminal state
    Idle,
    /// Opening the serial port
    SerialOpening,
    /// Serial port open, UDP endpoint not yet created
    SerialOpen,
    /// Binding the UDP endpoint
    UdpConnecting,
    /// Forwarding datagrams
    Running,
    /// Stop requested, teardown in progress
    Stopping,
}

/// UDP-to-serial forwarding engine
///
/// Exactly one session may be active at a time; `start` opens the serial
/// port first, then binds the UDP endpoint, and `stop` tears them down in
/// the reverse order. All mutable session state lives in this instance,
/// not in globals.
pub struct ForwardEngine {
    config: Config,
    observer: Arc<dyn EngineObserver>,
    stats: Arc<ForwardStats>,
    state: Arc<Mutex<EngineState>>,
    shutdown_tx: broadcast::Sender<()>,
    progress_interval: Duration,
    injected_sink: Option<Box<dyn SerialSink>>,
    local_addr: Option<SocketAddr>,
    task: Option<JoinHandle<Result<(), ForwardError>>>,
}

impl ForwardEngine {
    /// Create an engine that opens the configured serial port on `start`
    #[must_use]
    pub fn new(config: Config, observer: Arc<dyn EngineObserver>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            observer,
            stats: Arc::new(ForwardStats::new()),
            state: Arc::new(Mutex::new(EngineState::Idle)),
            shutdown_tx,
            progress_interval: PROGRESS_INTERVAL,
            injected_sink: None,
            local_addr: None,
            task: None,
        }
    }

    /// Create an engine that writes to the given sink instead of opening
    /// a serial port
    #[must_use]
    pub fn with_sink(
        config: Config,
        sink: Box<dyn SerialSink>,
        observer: Arc<dyn EngineObserver>,
    ) -> Self {
        let mut engine = Self::new(config, observer);
        engine.injected_sink = Some(sink);
        engine
    }

    /// Override the progress-report interval
    #[must_use]
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> EngineState {
        *self.state.lock()
    }

    /// Shared statistics handle
    #[must_use]
    pub fn stats(&self) -> Arc<ForwardStats> {
        Arc::clone(&self.stats)
    }

    /// The configuration this engine was built with
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Address the UDP endpoint is bound to, once `Running`
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Open the serial port, bind the UDP endpoint, and begin forwarding
    ///
    /// Returns once the session loop is running. A serial-open failure
    /// leaves no UDP endpoint behind; a bind failure releases the serial
    /// port before returning. Neither is retried.
    ///
    /// # Errors
    ///
    /// Returns `ForwardError::AlreadyRunning`, `ForwardError::SerialOpen`,
    /// or `ForwardError::Bind`.
    pub async fn start(&mut self) -> Result<(), ForwardError> {
        if self.task.is_some() {
            return Err(ForwardError::AlreadyRunning);
        }

        *self.state.lock() = EngineState::SerialOpening;
        let sink: Box<dyn SerialSink> = match self.injected_sink.take() {
            Some(sink) => sink,
            None => match serial::open(&self.config) {
                Ok(sink) => Box::new(sink),
                Err(e) => {
                    *self.state.lock() = EngineState::Idle;
                    return Err(ForwardError::SerialOpen(e));
                }
            },
        };
        *self.state.lock() = EngineState::SerialOpen;

        let bind_addr = self.config.bind_addr();
        *self.state.lock() = EngineState::UdpConnecting;
        self.observer
            .on_event(&EngineEvent::ConnectAttempt { addr: bind_addr });

        let socket = match UdpSocket::bind(bind_addr).await {
            Ok(socket) => socket,
            Err(e) => {
                self.observer.on_event(&EngineEvent::ConnectFailed {
                    addr: bind_addr,
                    reason: e.to_string(),
                });
                let mut sink = sink;
                let _ = sink.shutdown().await;
                *self.state.lock() = EngineState::Idle;
                return Err(ForwardError::Bind {
                    addr: bind_addr,
                    source: e,
                });
            }
        };

        let local_addr = socket.local_addr().unwrap_or(bind_addr);
        self.local_addr = Some(local_addr);
        self.observer
            .on_event(&EngineEvent::Connected { addr: local_addr });
        *self.state.lock() = EngineState::Running;

        let session = Session {
            socket,
            sink,
            stats: Arc::clone(&self.stats),
            observer: Arc::clone(&self.observer),
            state: Arc::clone(&self.state),
            shutdown_rx: self.shutdown_tx.subscribe(),
            progress_interval: self.progress_interval,
        };
        self.task = Some(tokio::spawn(session.run()));

        Ok(())
    }

    /// Wait for the session to end on its own (fatal write failure)
    ///
    /// Resolves only when a running session terminates without `stop`
    /// being called; pends forever while the engine is idle.
    pub async fn wait(&mut self) -> Result<(), ForwardError> {
        match self.task.as_mut() {
            Some(task) => {
                let result = join_result(task.await);
                self.task = None;
                result
            }
            None => std::future::pending().await,
        }
    }

    /// Stop the session and tear both endpoints down
    ///
    /// Safe to call at any time; a no-op when idle. The UDP endpoint is
    /// closed before the serial port, and no observer notification is
    /// delivered after this returns.
    ///
    /// # Errors
    ///
    /// Returns the session's terminal error, if it ended abnormally.
    pub async fn stop(&mut self) -> Result<(), ForwardError> {
        let Some(task) = self.task.take() else {
            *self.state.lock() = EngineState::Idle;
            return Ok(());
        };

        *self.state.lock() = EngineState::Stopping;
        let _ = self.shutdown_tx.send(());
        let result = join_result(task.await);
        *self.state.lock() = EngineState::Idle;
        self.local_addr = None;
        result
    }
}

fn join_result(
    joined: Result<Result<(), ForwardError>, tokio::task::JoinError>,
) -> Result<(), ForwardError> {
    joined.unwrap_or_else(|e| Err(ForwardError::Session(e.to_string())))
}

/// State owned by the session task
struct Session {
    socket: UdpSocket,
    sink: Box<dyn SerialSink>,
    stats: Arc<ForwardStats>,
    observer: Arc<dyn EngineObserver>,
    state: Arc<Mutex<EngineState>>,
    shutdown_rx: broadcast::Receiver<()>,
    progress_interval: Duration,
}

impl Session {
    /// The receive-to-write loop
    ///
    /// Runs on one task: each datagram is fully written to the sink
    /// before the next receive is serviced, so forwarded order equals
    /// arrival order and no locking is needed around the write or the
    /// counters.
    async fn run(mut self) -> Result<(), ForwardError> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut last_progress = Instant::now();
        let mut result = Ok(());

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => break,
                recv = self.socket.recv_from(&mut buf) => match recv {
                    Ok((len, peer)) => {
                        if let Err(e) = self.sink.write_all(&buf[..len]).await {
                            result = Err(ForwardError::SerialWrite(e));
                            break;
                        }
                        self.stats.record_forwarded(len as u64);
                        self.observer
                            .on_event(&EngineEvent::DatagramForwarded { len, peer });

                        // Opportunistic, data-gated progress report: the
                        // clock is only consulted when a datagram arrives.
                        if self.stats.bytes_forwarded() > 0
                            && last_progress.elapsed() >= self.progress_interval
                        {
                            self.observer.on_event(&EngineEvent::Progress {
                                total_bytes: self.stats.bytes_forwarded(),
                            });
                            last_progress = Instant::now();
                        }
                    }
                    Err(e) => {
                        // Socket-level receive failures are not fatal;
                        // only connection-level failures end the session.
                        self.stats.record_receive_error();
                        self.observer.on_event(&EngineEvent::ReceiveError {
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        // Teardown order: UDP endpoint first, then the serial side, so no
        // queued receive can write to a port the engine already released.
        drop(self.socket);
        self.observer.on_event(&EngineEvent::Disconnected);
        if let Err(e) = self.sink.shutdown().await {
            if result.is_ok() {
                result = Err(ForwardError::SerialClose(e));
            }
        }
        *self.state.lock() = EngineState::Idle;
        result
    }
}
