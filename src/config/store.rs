//! Persisted settings store
//!
//! A sectioned key/value TOML file holding defaults for every optional
//! field of the configuration. The file is an overlay: it is not required
//! to exist, every key is optional, and command-line options always win
//! over it. On first run the file is created with all keys commented out
//! at the compiled defaults so the operator can see what is tunable.

use std::net::IpAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::StoreError;
use super::types::{Parity, StopBits};

/// Default store file name, resolved against the working directory
pub const DEFAULT_STORE_PATH: &str = "udp2serial.toml";

/// Template written on first run; every key commented out at its default
const TEMPLATE: &str = r#"# Persisted defaults for udp2serial.
# Values here are used for any option not given on the command line.
# Uncomment a key to override the built-in default shown.

[UDP]
# InterfaceIP = "0.0.0.0"

[Serial]
# BaudRate = 9600
# DataBits = 8
# Parity = "none"
# StopBits = "one"
# DtrEnable = false
# RtsEnable = false
"#;

/// Parsed settings overlay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSettings {
    /// `[UDP]` section
    #[serde(default, rename = "UDP")]
    pub udp: UdpSection,

    /// `[Serial]` section
    #[serde(default, rename = "Serial")]
    pub serial: SerialSection,
}

/// Keys of the `[UDP]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UdpSection {
    #[serde(default, rename = "InterfaceIP")]
    pub interface_ip: Option<IpAddr>,
}

/// Keys of the `[Serial]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerialSection {
    #[serde(default, rename = "BaudRate")]
    pub baud_rate: Option<u32>,

    #[serde(default, rename = "DataBits")]
    pub data_bits: Option<u8>,

    #[serde(default, rename = "Parity")]
    pub parity: Option<Parity>,

    #[serde(default, rename = "StopBits")]
    pub stop_bits: Option<StopBits>,

    #[serde(default, rename = "DtrEnable")]
    pub dtr_enable: Option<bool>,

    #[serde(default, rename = "RtsEnable")]
    pub rts_enable: Option<bool>,
}

/// Load the settings overlay, creating the commented template on first run
///
/// A missing file is not an error: the template is written and an empty
/// overlay is returned.
///
/// # Errors
///
/// Returns `StoreError` if the file exists but cannot be read or parsed,
/// or if the template cannot be written.
pub fn load_or_create(path: impl AsRef<Path>) -> Result<StoredSettings, StoreError> {
    let path = path.as_ref();

    if !path.exists() {
        debug!(path = %path.display(), "Settings file absent, writing template");
        std::fs::write(path, TEMPLATE).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        return Ok(StoredSettings::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let settings: StoredSettings = toml::from_str(&contents).map_err(|e| StoreError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    debug!(path = %path.display(), "Settings overlay loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_first_run_creates_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_STORE_PATH);

        let settings = load_or_create(&path).unwrap();
        assert!(settings.udp.interface_ip.is_none());
        assert!(settings.serial.baud_rate.is_none());

        // Template was written with every key commented out
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[UDP]"));
        assert!(written.contains("[Serial]"));
        assert!(written.contains("# BaudRate = 9600"));

        // Loading the template back yields an empty overlay
        let reloaded = load_or_create(&path).unwrap();
        assert!(reloaded.serial.parity.is_none());
    }

    #[test]
    fn test_overlay_parses_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            r#"
[UDP]
InterfaceIP = "127.0.0.1"

[Serial]
BaudRate = 115200
Parity = "even"
StopBits = "two"
DtrEnable = true
"#,
        )
        .unwrap();

        let settings = load_or_create(&path).unwrap();
        assert_eq!(
            settings.udp.interface_ip,
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST))
        );
        assert_eq!(settings.serial.baud_rate, Some(115_200));
        assert_eq!(settings.serial.parity, Some(Parity::Even));
        assert_eq!(settings.serial.stop_bits, Some(StopBits::Two));
        assert_eq!(settings.serial.dtr_enable, Some(true));
        // Untouched keys stay absent
        assert!(settings.serial.data_bits.is_none());
        assert!(settings.serial.rts_enable.is_none());
    }

    #[test]
    fn test_missing_sections_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "").unwrap();

        let settings = load_or_create(&path).unwrap();
        assert!(settings.udp.interface_ip.is_none());
        assert!(settings.serial.stop_bits.is_none());
    }

    #[test]
    fn test_malformed_store_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[Serial\nBaudRate = ").unwrap();

        let result = load_or_create(&path);
        assert!(matches!(result, Err(StoreError::Parse { .. })));
    }
}
