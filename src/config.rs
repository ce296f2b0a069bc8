//! Collector configuration, read from a TOML file.

use std::{
    net::{AddrParseError, IpAddr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use ipfix_parser::packet::HEADER_LENGTH;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

/// Port registered for IPFIX with IANA.
pub const DEFAULT_PORT: u16 = 4739;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("Could not read {}: {}", path.display(), source))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Could not parse {}: {}", path.display(), source))]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[snafu(display("Invalid configuration: {}", reason))]
    Invalid { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).context(ReadSnafu { path })?;
        Self::parse(&contents, path)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, Path::new("<inline>"))
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).context(ParseSnafu { path })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listener.validate()
    }
}

/// Settings of the UDP listener and its decode pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ListenerConfig {
    /// IP literal to bind. `::` listens on every interface, IPv4 included
    /// where the platform supports dual stack sockets.
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Size of the receive buffer. Longer datagrams are truncated by the OS
    /// and then rejected by the message length check.
    #[serde(default = "default_max_packet_size")]
    pub max_packet_size: usize,

    /// `SO_RCVBUF` for the listening socket. The OS default when unset.
    #[serde(default)]
    pub receive_buffer_bytes: Option<usize>,

    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Datagrams queued per decode worker before new ones are dropped.
    #[serde(default = "default_worker_queue_size")]
    pub worker_queue_size: usize,

    /// Decoded messages waiting for the dispatcher.
    #[serde(default = "default_dispatch_queue_size")]
    pub dispatch_queue_size: usize,

    #[serde(default = "default_max_in_flight_dispatches")]
    pub max_in_flight_dispatches: usize,

    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Exporter sessions without traffic for this long are forgotten along
    /// with their templates. `0` keeps sessions forever.
    #[serde(default = "default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: u64,
}

fn default_address() -> String {
    "::".to_owned()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

const fn default_max_packet_size() -> usize {
    65535
}

fn default_workers() -> usize {
    num_cpus::get().max(1)
}

const fn default_worker_queue_size() -> usize {
    1024
}

const fn default_dispatch_queue_size() -> usize {
    4096
}

const fn default_max_in_flight_dispatches() -> usize {
    64
}

const fn default_shutdown_timeout_secs() -> u64 {
    30
}

const fn default_session_idle_timeout_secs() -> u64 {
    1800
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            max_packet_size: default_max_packet_size(),
            receive_buffer_bytes: None,
            workers: default_workers(),
            worker_queue_size: default_worker_queue_size(),
            dispatch_queue_size: default_dispatch_queue_size(),
            max_in_flight_dispatches: default_max_in_flight_dispatches(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            session_idle_timeout_secs: default_session_idle_timeout_secs(),
        }
    }
}

impl ListenerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let host = self
            .address
            .trim_start_matches('[')
            .trim_end_matches(']');
        let ip: IpAddr = host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub const fn session_idle_timeout(&self) -> Option<Duration> {
        match self.session_idle_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let nonzero = [
            ("workers", self.workers),
            ("worker_queue_size", self.worker_queue_size),
            ("dispatch_queue_size", self.dispatch_queue_size),
            ("max_in_flight_dispatches", self.max_in_flight_dispatches),
        ];
        if let Some((name, _)) = nonzero.iter().find(|(_, value)| *value == 0) {
            return InvalidSnafu {
                reason: format!("listener.{name} must be greater than zero"),
            }
            .fail();
        }
        if self.max_packet_size < HEADER_LENGTH {
            return InvalidSnafu {
                reason: format!(
                    "listener.max_packet_size must be at least {HEADER_LENGTH} bytes"
                ),
            }
            .fail();
        }
        if let Err(error) = self.socket_addr() {
            return InvalidSnafu {
                reason: format!("listener.address {:?} is not an IP address: {error}", self.address),
            }
            .fail();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    /// ANSI colours. Enabled when unset and stderr is a terminal.
    #[serde(default)]
    pub color: Option<bool>,
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            color: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        similar_asserts::assert_eq!(config, Config::default());
        assert_eq!(
            config.listener.socket_addr().unwrap(),
            "[::]:4739".parse::<SocketAddr>().unwrap()
        );
        assert!(config.listener.workers >= 1);
        assert_eq!(
            config.listener.session_idle_timeout(),
            Some(Duration::from_secs(1800))
        );
    }

    #[test]
    fn parses_every_field() {
        let config = Config::from_toml(
            r#"
            [listener]
            address = "127.0.0.1"
            port = 9995
            max_packet_size = 9000
            receive_buffer_bytes = 4194304
            workers = 2
            worker_queue_size = 16
            dispatch_queue_size = 32
            max_in_flight_dispatches = 4
            shutdown_timeout_secs = 5
            session_idle_timeout_secs = 0

            [log]
            level = "debug"
            json = true
            color = false
            "#,
        )
        .unwrap();

        assert_eq!(
            config.listener.socket_addr().unwrap(),
            "127.0.0.1:9995".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.listener.receive_buffer_bytes, Some(4_194_304));
        assert_eq!(config.listener.workers, 2);
        assert_eq!(config.listener.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(config.listener.session_idle_timeout(), None);
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
        assert_eq!(config.log.color, Some(false));
    }

    #[test]
    fn accepts_bracketed_ipv6() {
        let listener = ListenerConfig {
            address: "[::1]".to_owned(),
            port: 1,
            ..Default::default()
        };
        assert_eq!(
            listener.socket_addr().unwrap(),
            "[::1]:1".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let error = Config::from_toml("[listener]\nbind = \"::\"\n").unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }), "{error:?}");
    }

    #[test]
    fn rejects_zero_sized_queues() {
        let error = Config::from_toml("[listener]\nworker_queue_size = 0\n").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid configuration: listener.worker_queue_size must be greater than zero"
        );
    }

    #[test]
    fn rejects_host_names() {
        let error = Config::from_toml("[listener]\naddress = \"collector.local\"\n").unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { .. }), "{error:?}");
    }

    #[test]
    fn rejects_packets_smaller_than_a_header() {
        let error = Config::from_toml("[listener]\nmax_packet_size = 8\n").unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { .. }), "{error:?}");
    }

    #[test]
    fn load_reports_the_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nport = \"not a port\"").unwrap();

        match Config::load(file.path()).unwrap_err() {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other:?}"),
        }

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            Config::load(&missing).unwrap_err(),
            ConfigError::Read { .. }
        ));
    }

    #[test]
    fn load_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nport = 2055").unwrap();
        assert_eq!(Config::load(file.path()).unwrap().listener.port, 2055);
    }
}
