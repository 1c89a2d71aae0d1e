//! udp2serial: one-way UDP to serial-port byte bridge
//!
//! This is the binary entry point: resolve the configuration, run one
//! forwarding session until the operator stops it, tear down cleanly.
//!
//! # Usage
//!
//! ```bash
//! # Forward UDP port 9000 to the first available serial port
//! udp2serial 9000
//!
//! # Forward to a named port with explicit line settings
//! udp2serial 9000 /dev/ttyUSB0 --BaudRate=115200 --Parity=even
//!
//! # Verbose logging
//! RUST_LOG=debug udp2serial 9000
//! ```

use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use udp2serial::config::{self, StoredSettings};
use udp2serial::error::BridgeError;
use udp2serial::forward::{ForwardEngine, ForwardError, TracingObserver};
use udp2serial::serial;

/// Initialize logging from `RUST_LOG`, defaulting to `info`
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Report an engine-phase failure at the outermost scope
///
/// Unsupported-platform failures are absorbed silently; everything else
/// is printed to the error stream. Neither crashes the process.
fn report_engine_error(e: ForwardError) {
    let err = BridgeError::from(e);
    if !err.is_unsupported_platform() {
        eprintln!("Error: {err}");
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // The settings overlay is optional; a broken one degrades to the
    // compiled defaults rather than inventing a new exit code.
    let stored = match config::load_or_create(config::DEFAULT_STORE_PATH) {
        Ok(stored) => stored,
        Err(e) => {
            warn!("{e}; continuing with built-in defaults");
            StoredSettings::default()
        }
    };

    // Enumerate fresh, immediately before resolution.
    let ports = match serial::enumerate_ports() {
        Ok(ports) => ports,
        Err(e) => {
            warn!("{e}; treating the host as having no serial ports");
            Vec::new()
        }
    };

    let config = match config::resolve(&args, &stored, &ports) {
        Ok(config) => config,
        Err(e) if e.is_help() => {
            println!("{}", config::usage());
            std::process::exit(config::EXIT_HELP);
        }
        Err(e) => {
            eprintln!("Error: {e}\n");
            eprintln!("{}", config::usage());
            std::process::exit(e.exit_code());
        }
    };

    info!(
        udp_port = config.udp_port,
        serial_port = %config.serial_port_id,
        baud = config.baud_rate,
        "udp2serial v{}",
        udp2serial::VERSION
    );

    let mut engine = ForwardEngine::new(config, Arc::new(TracingObserver));
    if let Err(e) = engine.start().await {
        report_engine_error(e);
        return;
    }

    info!("Forwarding; press Ctrl-C to stop");

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, stopping...");
        }
        _ = wait_for_sigterm() => {
            info!("Received SIGTERM, stopping...");
        }
        result = engine.wait() => {
            if let Err(e) = result {
                report_engine_error(e);
            }
        }
    }

    if let Err(e) = engine.stop().await {
        report_engine_error(e);
    }

    let stats = engine.stats().snapshot();
    info!(
        bytes = stats.bytes_forwarded,
        datagrams = stats.datagrams_forwarded,
        receive_errors = stats.receive_errors,
        "Session complete"
    );
}

/// Wait for SIGTERM
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
    sigterm.recv().await;
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    // On non-Unix platforms, just wait forever
    std::future::pending::<()>().await
}
