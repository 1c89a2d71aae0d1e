//! Serial-port enumeration, open, and the async sink seam
//!
//! The engine only ever sees [`SerialSink`]; the real implementation
//! wraps a [`tokio_serial::SerialStream`] opened with the configuration's
//! line settings.

use std::io;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::debug;

use super::error::SerialError;
use crate::config::{Config, Parity, StopBits};

/// Byte sink the forwarding engine writes datagram payloads to
///
/// The production implementation is [`SerialStreamSink`]; tests inject
/// [`MockSerialSink`](super::mock::MockSerialSink).
#[async_trait]
pub trait SerialSink: Send {
    /// Write the whole buffer, in order, before returning
    async fn write_all(&mut self, buf: &[u8]) -> Result<(), SerialError>;

    /// Flush pending bytes and release the underlying port
    async fn shutdown(&mut self) -> Result<(), SerialError>;
}

/// Enumerate the serial ports currently present on the host
///
/// The list is re-read from the OS on every call; callers wanting the
/// live set at resolution or engine-start time simply call again. Names
/// are sorted so "the first port" is deterministic.
///
/// # Errors
///
/// Returns `SerialError::Enumeration` if the host enumeration fails.
pub fn enumerate_ports() -> Result<Vec<String>, SerialError> {
    let ports =
        serialport::available_ports().map_err(|e| SerialError::Enumeration(e.to_string()))?;

    let mut names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();
    names.sort();
    Ok(names)
}

/// Open the configured serial port with its line settings applied
///
/// # Errors
///
/// Returns `SerialError::Unsupported` for settings the host serial stack
/// cannot express (mark/space parity, zero or 1.5 stop bits), and
/// `SerialError::Open` for any other open failure (port busy, permission
/// denied, device absent).
pub fn open(config: &Config) -> Result<SerialStreamSink, SerialError> {
    let builder = tokio_serial::new(config.serial_port_id.as_str(), config.baud_rate)
        .data_bits(to_data_bits(config.data_bits)?)
        .parity(to_parity(config.parity)?)
        .stop_bits(to_stop_bits(config.stop_bits)?)
        .flow_control(tokio_serial::FlowControl::None);

    let mut stream = builder
        .open_native_async()
        .map_err(|e| map_open_error(&config.serial_port_id, &e))?;

    stream
        .write_data_terminal_ready(config.dtr_enable)
        .map_err(|e| map_open_error(&config.serial_port_id, &e))?;
    stream
        .write_request_to_send(config.rts_enable)
        .map_err(|e| map_open_error(&config.serial_port_id, &e))?;

    debug!(
        port = %config.serial_port_id,
        baud = config.baud_rate,
        data_bits = config.data_bits,
        parity = %config.parity,
        stop_bits = %config.stop_bits,
        dtr = config.dtr_enable,
        rts = config.rts_enable,
        "Serial port open"
    );

    Ok(SerialStreamSink {
        port_name: config.serial_port_id.clone(),
        stream,
    })
}

/// [`SerialSink`] over an open [`SerialStream`]
#[derive(Debug)]
pub struct SerialStreamSink {
    port_name: String,
    stream: SerialStream,
}

impl SerialStreamSink {
    /// Name of the underlying port
    #[must_use]
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

#[async_trait]
impl SerialSink for SerialStreamSink {
    async fn write_all(&mut self, buf: &[u8]) -> Result<(), SerialError> {
        AsyncWriteExt::write_all(&mut self.stream, buf).await?;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), SerialError> {
        AsyncWriteExt::flush(&mut self.stream).await?;
        AsyncWriteExt::shutdown(&mut self.stream).await?;
        debug!(port = %self.port_name, "Serial port released");
        Ok(())
    }
}

fn map_open_error(port: &str, e: &tokio_serial::Error) -> SerialError {
    match e.kind() {
        tokio_serial::ErrorKind::Io(io::ErrorKind::Unsupported) => {
            SerialError::unsupported(format!("serial I/O on this platform ({port})"))
        }
        _ => SerialError::open(port, e.to_string()),
    }
}

fn to_data_bits(bits: u8) -> Result<tokio_serial::DataBits, SerialError> {
    match bits {
        5 => Ok(tokio_serial::DataBits::Five),
        6 => Ok(tokio_serial::DataBits::Six),
        7 => Ok(tokio_serial::DataBits::Seven),
        8 => Ok(tokio_serial::DataBits::Eight),
        other => Err(SerialError::unsupported(format!("{other} data bits"))),
    }
}

fn to_parity(parity: Parity) -> Result<tokio_serial::Parity, SerialError> {
    match parity {
        Parity::None => Ok(tokio_serial::Parity::None),
        Parity::Odd => Ok(tokio_serial::Parity::Odd),
        Parity::Even => Ok(tokio_serial::Parity::Even),
        Parity::Mark => Err(SerialError::unsupported("mark parity")),
        Parity::Space => Err(SerialError::unsupported("space parity")),
    }
}

fn to_stop_bits(stop_bits: StopBits) -> Result<tokio_serial::StopBits, SerialError> {
    match stop_bits {
        StopBits::One => Ok(tokio_serial::StopBits::One),
        StopBits::Two => Ok(tokio_serial::StopBits::Two),
        StopBits::None => Err(SerialError::unsupported("zero stop bits")),
        StopBits::OnePointFive => Err(SerialError::unsupported("1.5 stop bits")),
    }
}
