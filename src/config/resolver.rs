//! Command-line resolution
//!
//! Merges the argument list, the persisted settings overlay, and the
//! compiled defaults into one validated [`Config`]. The merge precedence
//! is strict and per-field: command line, then overlay, then default.
//!
//! The port enumeration is passed in by the caller, captured immediately
//! before the call, so the validation always runs against the live set of
//! host ports.

use std::net::IpAddr;

use super::error::ResolveError;
use super::store::StoredSettings;
use super::types::{
    Config, Parity, StopBits, DEFAULT_BAUD_RATE, DEFAULT_DATA_BITS, DEFAULT_INTERFACE_IP,
};

/// Usage text shown for `--help` and alongside every resolution error
#[must_use]
pub fn usage() -> String {
    format!(
        r#"udp2serial v{}

One-way UDP to serial-port byte bridge: datagrams received on the UDP
port are written verbatim, in arrival order, to the serial port.

USAGE:
    udp2serial <UDPPort> [COMPortID] [OPTIONS]

ARGS:
    <UDPPort>      UDP port to listen on (1-65535)
    [COMPortID]    Serial port to write to [default: first available port]

OPTIONS:
    --InterfaceIP=<addr>  -i=<addr>  Interface address to bind [default: 0.0.0.0]
    --BaudRate=<n>        -b=<n>     Serial baud rate [default: 9600]
    --DataBits=<n>        -d=<n>     Data bits, 5-8 [default: 8]
    --Parity=<p>          -p=<p>     none|odd|even|mark|space [default: none]
    --StopBits=<s>        -s=<s>     none|one|one-point-five|two [default: one]
    --DtrEnable=<bool>    -t=<bool>  Assert DTR on open [default: false]
    --RtsEnable=<bool>    -r=<bool>  Assert RTS on open [default: false]
    --help  -?  /?                   Show this help

SETTINGS:
    Options not given on the command line fall back to udp2serial.toml in
    the working directory ([UDP] and [Serial] sections), then to the
    defaults above. The file is created with all keys commented out on
    first run.

EXIT CODES:
    0    forwarding ran until stopped
    1    bad argument count or malformed option
    2    invalid UDP port
    3    serial port not found
    4    no serial ports found on this host
    255  help displayed
"#,
        crate::VERSION
    )
}

/// Option values collected from the command line before the merge
#[derive(Debug, Default)]
struct CliOverrides {
    interface_ip: Option<IpAddr>,
    baud_rate: Option<u32>,
    data_bits: Option<u8>,
    parity: Option<Parity>,
    stop_bits: Option<StopBits>,
    dtr_enable: Option<bool>,
    rts_enable: Option<bool>,
}

/// Resolve the command line into a validated [`Config`]
///
/// # Arguments
///
/// * `args` - argument tokens, program name excluded
/// * `stored` - the persisted settings overlay
/// * `ports` - serial ports enumerated on the host immediately before
///   this call
///
/// # Errors
///
/// Returns `ResolveError::HelpRequested` when a help token is present,
/// and a typed error (each with a fixed exit code) for every invalid
/// argument combination.
pub fn resolve(
    args: &[String],
    stored: &StoredSettings,
    ports: &[String],
) -> Result<Config, ResolveError> {
    // A help token anywhere short-circuits everything else.
    if args.iter().any(|a| is_help_token(a)) {
        return Err(ResolveError::HelpRequested);
    }

    let mut positionals: Vec<&str> = Vec::new();
    let mut overrides = CliOverrides::default();

    for arg in args {
        if let Some(body) = option_body(arg) {
            let (name, value) = split_option(body);
            apply_option(&mut overrides, arg, name, value)?;
        } else {
            positionals.push(arg.as_str());
        }
    }

    if positionals.is_empty() || positionals.len() > 2 {
        return Err(ResolveError::BadArgumentCount {
            count: positionals.len(),
        });
    }

    let udp_port = parse_udp_port(positionals[0])?;
    let serial_port_id = select_serial_port(positionals.get(1).copied(), ports)?;

    let config = Config {
        udp_port,
        serial_port_id,
        interface_ip: overrides
            .interface_ip
            .or(stored.udp.interface_ip)
            .unwrap_or(DEFAULT_INTERFACE_IP),
        baud_rate: overrides
            .baud_rate
            .or(stored.serial.baud_rate)
            .unwrap_or(DEFAULT_BAUD_RATE),
        data_bits: overrides
            .data_bits
            .or(stored.serial.data_bits)
            .unwrap_or(DEFAULT_DATA_BITS),
        parity: overrides
            .parity
            .or(stored.serial.parity)
            .unwrap_or_default(),
        stop_bits: overrides
            .stop_bits
            .or(stored.serial.stop_bits)
            .unwrap_or_default(),
        dtr_enable: overrides
            .dtr_enable
            .or(stored.serial.dtr_enable)
            .unwrap_or(false),
        rts_enable: overrides
            .rts_enable
            .or(stored.serial.rts_enable)
            .unwrap_or(false),
    };

    config.validate()?;
    Ok(config)
}

fn is_help_token(arg: &str) -> bool {
    arg.eq_ignore_ascii_case("--help") || arg == "-?" || arg == "/?"
}

/// Strip the option prefix, or `None` for a positional token
fn option_body(arg: &str) -> Option<&str> {
    if let Some(rest) = arg.strip_prefix("--") {
        Some(rest)
    } else if let Some(rest) = arg.strip_prefix('/') {
        Some(rest)
    } else if arg.len() > 1 {
        arg.strip_prefix('-')
    } else {
        None
    }
}

/// Split `name=value`; a bare name yields an empty value
fn split_option(body: &str) -> (&str, &str) {
    match body.split_once('=') {
        Some((name, value)) => (name, value),
        None => (body, ""),
    }
}

fn apply_option(
    overrides: &mut CliOverrides,
    token: &str,
    name: &str,
    value: &str,
) -> Result<(), ResolveError> {
    match name.to_ascii_lowercase().as_str() {
        "interfaceip" | "i" => {
            overrides.interface_ip = Some(value.parse().map_err(|_| {
                ResolveError::invalid_option_value(
                    "InterfaceIP",
                    value,
                    "expected an IPv4 or IPv6 address literal",
                )
            })?);
        }
        "baudrate" | "b" => {
            let baud: u32 = value.parse().map_err(|_| {
                ResolveError::invalid_option_value("BaudRate", value, "expected a positive integer")
            })?;
            if baud == 0 {
                return Err(ResolveError::invalid_option_value(
                    "BaudRate",
                    value,
                    "baud rate must be positive",
                ));
            }
            overrides.baud_rate = Some(baud);
        }
        "databits" | "d" => {
            let bits: u8 = value.parse().map_err(|_| {
                ResolveError::invalid_option_value("DataBits", value, "expected an integer 5-8")
            })?;
            if !(5..=8).contains(&bits) {
                return Err(ResolveError::invalid_option_value(
                    "DataBits",
                    value,
                    "data bits must be between 5 and 8",
                ));
            }
            overrides.data_bits = Some(bits);
        }
        "parity" | "p" => {
            overrides.parity = Some(value.parse().map_err(|reason: String| {
                ResolveError::invalid_option_value("Parity", value, reason)
            })?);
        }
        "stopbits" | "s" => {
            overrides.stop_bits = Some(value.parse().map_err(|reason: String| {
                ResolveError::invalid_option_value("StopBits", value, reason)
            })?);
        }
        "dtrenable" | "t" => {
            overrides.dtr_enable = Some(parse_bool("DtrEnable", value)?);
        }
        "rtsenable" | "r" => {
            overrides.rts_enable = Some(parse_bool("RtsEnable", value)?);
        }
        _ => {
            return Err(ResolveError::UnknownOption {
                name: token.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ResolveError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ResolveError::invalid_option_value(
            name,
            value,
            "expected true or false",
        )),
    }
}

fn parse_udp_port(value: &str) -> Result<u16, ResolveError> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ResolveError::InvalidUdpPort {
            value: value.to_string(),
        }),
    }
}

/// Pick the serial port: the requested one if present on the host
/// (case-insensitive, canonical spelling from the enumeration), otherwise
/// the first enumerated port.
fn select_serial_port(
    requested: Option<&str>,
    ports: &[String],
) -> Result<String, ResolveError> {
    match requested {
        Some(id) => ports
            .iter()
            .find(|p| p.eq_ignore_ascii_case(id))
            .cloned()
            .ok_or_else(|| ResolveError::InvalidComPort {
                requested: id.to_string(),
                available: ports.to_vec(),
            }),
        None => ports
            .first()
            .cloned()
            .ok_or(ResolveError::NoComPortsFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::store::{SerialSection, UdpSection};
    use std::net::Ipv4Addr;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    fn ports(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_valid_port_and_name() {
        for port in [1_u16, 80, 9000, 65_535] {
            let config = resolve(
                &args(&[&port.to_string(), "COM3"]),
                &StoredSettings::default(),
                &ports(&["COM1", "COM3"]),
            )
            .unwrap();
            assert_eq!(config.udp_port, port);
            assert_eq!(config.serial_port_id, "COM3");
        }
    }

    #[test]
    fn test_invalid_udp_port() {
        let stored = StoredSettings::default();
        let available = ports(&["COM1"]);

        for bad in ["0", "not-a-number", "65536", "-1"] {
            let result = resolve(&args(&[bad, "COM1"]), &stored, &available);
            // "-1" tokenizes as an option; anything numeric-but-invalid is
            // an InvalidUdpPort
            if bad == "-1" {
                assert!(result.is_err());
            } else {
                assert!(
                    matches!(result, Err(ResolveError::InvalidUdpPort { .. })),
                    "expected InvalidUdpPort for {bad}"
                );
            }
        }
    }

    #[test]
    fn test_unknown_com_port() {
        let result = resolve(
            &args(&["9000", "NOT_A_REAL_PORT"]),
            &StoredSettings::default(),
            &ports(&["COM1", "COM3"]),
        );
        match result {
            Err(ResolveError::InvalidComPort {
                requested,
                available,
            }) => {
                assert_eq!(requested, "NOT_A_REAL_PORT");
                assert_eq!(available, ports(&["COM1", "COM3"]));
            }
            other => panic!("expected InvalidComPort, got {other:?}"),
        }
    }

    #[test]
    fn test_com_port_match_is_case_insensitive() {
        let config = resolve(
            &args(&["9000", "com3"]),
            &StoredSettings::default(),
            &ports(&["COM1", "COM3"]),
        )
        .unwrap();
        // Canonical spelling comes from the enumeration
        assert_eq!(config.serial_port_id, "COM3");
    }

    #[test]
    fn test_default_port_selection() {
        let config = resolve(
            &args(&["9000"]),
            &StoredSettings::default(),
            &ports(&["/dev/ttyUSB1", "/dev/ttyUSB0"]),
        )
        .unwrap();
        assert_eq!(config.serial_port_id, "/dev/ttyUSB1");

        let result = resolve(&args(&["9000"]), &StoredSettings::default(), &[]);
        assert!(matches!(result, Err(ResolveError::NoComPortsFound)));
    }

    #[test]
    fn test_argument_count() {
        let stored = StoredSettings::default();
        let available = ports(&["COM1"]);

        for bad in [&args(&[]), &args(&["9000", "COM1", "extra"])] {
            assert!(matches!(
                resolve(bad, &stored, &available),
                Err(ResolveError::BadArgumentCount { .. })
            ));
        }
        // Options do not count as positionals
        assert!(resolve(
            &args(&["9000", "COM1", "--BaudRate=19200"]),
            &stored,
            &available
        )
        .is_ok());
    }

    #[test]
    fn test_help_tokens_short_circuit() {
        let stored = StoredSettings::default();
        for help in ["--help", "-?", "/?", "--HELP"] {
            // Even with otherwise-broken arguments
            let result = resolve(&args(&[help, "bogus", "x", "y"]), &stored, &[]);
            assert!(matches!(result, Err(ResolveError::HelpRequested)));
        }
    }

    #[test]
    fn test_cli_options_all_forms() {
        let config = resolve(
            &args(&[
                "9000",
                "COM1",
                "--InterfaceIP=127.0.0.1",
                "-b=115200",
                "/DataBits=7",
                "--parity=even",
                "-s=two",
                "--DtrEnable=true",
                "-r=1",
            ]),
            &StoredSettings::default(),
            &ports(&["COM1"]),
        )
        .unwrap();

        assert_eq!(config.interface_ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.data_bits, 7);
        assert_eq!(config.parity, Parity::Even);
        assert_eq!(config.stop_bits, StopBits::Two);
        assert!(config.dtr_enable);
        assert!(config.rts_enable);
    }

    #[test]
    fn test_precedence_cli_over_store_over_default() {
        let stored = StoredSettings {
            udp: UdpSection {
                interface_ip: Some("10.0.0.1".parse().unwrap()),
            },
            serial: SerialSection {
                baud_rate: Some(38_400),
                data_bits: Some(7),
                parity: Some(Parity::Odd),
                stop_bits: Some(StopBits::Two),
                dtr_enable: Some(true),
                rts_enable: Some(true),
            },
        };
        let available = ports(&["COM1"]);

        // CLI wins over the store, field by field
        let config = resolve(
            &args(&["9000", "COM1", "--BaudRate=115200", "--Parity=even"]),
            &stored,
            &available,
        )
        .unwrap();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.parity, Parity::Even);
        // Untouched fields still come from the store
        assert_eq!(config.interface_ip, "10.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(config.data_bits, 7);
        assert_eq!(config.stop_bits, StopBits::Two);
        assert!(config.dtr_enable);
        assert!(config.rts_enable);

        // Store wins over the compiled defaults
        let config = resolve(&args(&["9000", "COM1"]), &stored, &available).unwrap();
        assert_eq!(config.baud_rate, 38_400);
        assert_eq!(config.parity, Parity::Odd);

        // Empty store falls back to the compiled defaults
        let config = resolve(
            &args(&["9000", "COM1"]),
            &StoredSettings::default(),
            &available,
        )
        .unwrap();
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.interface_ip, DEFAULT_INTERFACE_IP);
        assert_eq!(config.parity, Parity::None);
    }

    #[test]
    fn test_malformed_option_values() {
        let stored = StoredSettings::default();
        let available = ports(&["COM1"]);

        for bad in [
            "--BaudRate=fast",
            "--BaudRate=0",
            "--DataBits=9",
            "--DataBits=x",
            "--Parity=sometimes",
            "--StopBits=three",
            "--DtrEnable=maybe",
            "--InterfaceIP=localhost",
        ] {
            let result = resolve(&args(&["9000", "COM1", bad]), &stored, &available);
            match &result {
                Err(ResolveError::InvalidOptionValue { .. }) => {}
                other => panic!("expected InvalidOptionValue for {bad}, got {other:?}"),
            }
            assert_eq!(result.unwrap_err().exit_code(), 1);
        }
    }

    #[test]
    fn test_unknown_option() {
        let result = resolve(
            &args(&["9000", "COM1", "--Bogus=1"]),
            &StoredSettings::default(),
            &ports(&["COM1"]),
        );
        assert!(matches!(&result, Err(ResolveError::UnknownOption { .. })));
        assert_eq!(result.unwrap_err().exit_code(), 1);
    }

    #[test]
    fn test_usage_mentions_every_option() {
        let text = usage();
        for needle in [
            "InterfaceIP",
            "BaudRate",
            "DataBits",
            "Parity",
            "StopBits",
            "DtrEnable",
            "RtsEnable",
            "--help",
        ] {
            assert!(text.contains(needle), "usage missing {needle}");
        }
    }
}
