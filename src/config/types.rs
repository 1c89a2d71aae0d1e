//! Configuration record and serial line-setting enums
//!
//! [`Config`] is the single immutable value the resolver produces and the
//! forwarding engine consumes. The engine never mutates it.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ResolveError;

/// Default interface address (IPv4 any)
pub const DEFAULT_INTERFACE_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default serial data bits
pub const DEFAULT_DATA_BITS: u8 = 8;

/// Serial parity setting
///
/// `Mark` and `Space` exist in the configuration surface but are not
/// expressible through every host serial stack; opening a port with them
/// may fail with an unsupported-platform error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl FromStr for Parity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "odd" => Ok(Self::Odd),
            "even" => Ok(Self::Even),
            "mark" => Ok(Self::Mark),
            "space" => Ok(Self::Space),
            _ => Err(format!(
                "expected one of none, odd, even, mark, space (got '{s}')"
            )),
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Odd => "odd",
            Self::Even => "even",
            Self::Mark => "mark",
            Self::Space => "space",
        };
        f.write_str(name)
    }
}

/// Serial stop-bits setting
///
/// `None` and `OnePointFive` exist in the configuration surface but are
/// not expressible through every host serial stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopBits {
    None,
    #[default]
    One,
    OnePointFive,
    Two,
}

impl FromStr for StopBits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "0" => Ok(Self::None),
            "one" | "1" => Ok(Self::One),
            "one-point-five" | "onepointfive" | "1.5" => Ok(Self::OnePointFive),
            "two" | "2" => Ok(Self::Two),
            _ => Err(format!(
                "expected one of none, one, one-point-five, two (got '{s}')"
            )),
        }
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::One => "one",
            Self::OnePointFive => "one-point-five",
            Self::Two => "two",
        };
        f.write_str(name)
    }
}

/// Validated bridge configuration
///
/// Produced once per process run by [`resolve`](super::resolve), then only
/// read. Field precedence at resolution time is command line, then the
/// persisted settings overlay, then the compiled defaults above.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// UDP port to listen on (1-65535)
    pub udp_port: u16,

    /// Identifier of the serial port to write to
    pub serial_port_id: String,

    /// Interface address the UDP endpoint binds to
    pub interface_ip: IpAddr,

    /// Serial baud rate
    pub baud_rate: u32,

    /// Serial data bits (5-8)
    pub data_bits: u8,

    /// Serial parity
    pub parity: Parity,

    /// Serial stop bits
    pub stop_bits: StopBits,

    /// Assert DTR when the port is opened
    pub dtr_enable: bool,

    /// Assert RTS when the port is opened
    pub rts_enable: bool,
}

impl Config {
    /// Create a configuration with compiled defaults for all optional fields
    #[must_use]
    pub fn new(udp_port: u16, serial_port_id: impl Into<String>) -> Self {
        Self {
            udp_port,
            serial_port_id: serial_port_id.into(),
            interface_ip: DEFAULT_INTERFACE_IP,
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DEFAULT_DATA_BITS,
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            dtr_enable: false,
            rts_enable: false,
        }
    }

    /// Set the interface address
    #[must_use]
    pub fn with_interface_ip(mut self, ip: IpAddr) -> Self {
        self.interface_ip = ip;
        self
    }

    /// Set the baud rate
    #[must_use]
    pub fn with_baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Set the data bits
    #[must_use]
    pub fn with_data_bits(mut self, bits: u8) -> Self {
        self.data_bits = bits;
        self
    }

    /// Set the parity
    #[must_use]
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Set the stop bits
    #[must_use]
    pub fn with_stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Set DTR assertion
    #[must_use]
    pub fn with_dtr_enable(mut self, dtr: bool) -> Self {
        self.dtr_enable = dtr;
        self
    }

    /// Set RTS assertion
    #[must_use]
    pub fn with_rts_enable(mut self, rts: bool) -> Self {
        self.rts_enable = rts;
        self
    }

    /// The socket address the UDP endpoint binds to
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.interface_ip, self.udp_port)
    }

    /// Re-check the numeric ranges of a constructed configuration
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if the UDP port is zero, the baud rate is
    /// zero, or the data bits fall outside 5-8.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.udp_port == 0 {
            return Err(ResolveError::InvalidUdpPort {
                value: "0".to_string(),
            });
        }
        if self.baud_rate == 0 {
            return Err(ResolveError::invalid_option_value(
                "BaudRate",
                "0",
                "baud rate must be positive",
            ));
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(ResolveError::invalid_option_value(
                "DataBits",
                self.data_bits.to_string(),
                "data bits must be between 5 and 8",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_round_trip() {
        for (text, parity) in [
            ("none", Parity::None),
            ("odd", Parity::Odd),
            ("even", Parity::Even),
            ("mark", Parity::Mark),
            ("space", Parity::Space),
        ] {
            assert_eq!(text.parse::<Parity>().unwrap(), parity);
            assert_eq!(parity.to_string(), text);
        }

        // Case-insensitive
        assert_eq!("EVEN".parse::<Parity>().unwrap(), Parity::Even);
        assert!("sometimes".parse::<Parity>().is_err());
    }

    #[test]
    fn test_stop_bits_round_trip() {
        assert_eq!("one".parse::<StopBits>().unwrap(), StopBits::One);
        assert_eq!("1".parse::<StopBits>().unwrap(), StopBits::One);
        assert_eq!("1.5".parse::<StopBits>().unwrap(), StopBits::OnePointFive);
        assert_eq!(
            "one-point-five".parse::<StopBits>().unwrap(),
            StopBits::OnePointFive
        );
        assert_eq!("two".parse::<StopBits>().unwrap(), StopBits::Two);
        assert_eq!(StopBits::OnePointFive.to_string(), "one-point-five");
        assert!("three".parse::<StopBits>().is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::new(9000, "COM3");
        assert_eq!(config.udp_port, 9000);
        assert_eq!(config.serial_port_id, "COM3");
        assert_eq!(config.interface_ip, DEFAULT_INTERFACE_IP);
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.data_bits, DEFAULT_DATA_BITS);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
        assert!(!config.dtr_enable);
        assert!(!config.rts_enable);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = Config::new(9000, "COM3")
            .with_baud_rate(115_200)
            .with_data_bits(7)
            .with_parity(Parity::Even)
            .with_stop_bits(StopBits::Two)
            .with_dtr_enable(true)
            .with_rts_enable(true);

        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.data_bits, 7);
        assert_eq!(config.parity, Parity::Even);
        assert_eq!(config.stop_bits, StopBits::Two);
        assert!(config.dtr_enable);
        assert!(config.rts_enable);
    }

    #[test]
    fn test_config_validate_ranges() {
        let mut config = Config::new(9000, "COM3");
        config.baud_rate = 0;
        assert!(config.validate().is_err());

        let mut config = Config::new(9000, "COM3");
        config.data_bits = 9;
        assert!(config.validate().is_err());

        let mut config = Config::new(9000, "COM3");
        config.udp_port = 0;
        assert!(matches!(
            config.validate(),
            Err(ResolveError::InvalidUdpPort { .. })
        ));
    }

    #[test]
    fn test_bind_addr() {
        let config = Config::new(9000, "COM3");
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:9000");
    }
}
