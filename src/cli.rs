use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::Config;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(rename_all = "kebab-case", version = crate::get_version(), about)]
pub struct Opts {
    /// Read configuration from a TOML file.
    #[arg(short, long, env = "IPFIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// IP address to listen on. Overrides `listener.address`.
    #[arg(short, long)]
    pub address: Option<String>,

    /// UDP port to listen on. Overrides `listener.port`.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable more detailed internal logging. Repeat to increase level. Overridden by `$IPFIX_LOG`.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Reduce detail of internal logging. Repeat to reduce further. Overridden by `$IPFIX_LOG`.
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Write internal logs as JSON.
    #[arg(long)]
    pub json_logs: bool,
}

impl Opts {
    pub fn get_matches() -> Self {
        Self::parse()
    }

    /// The level requested through `-v`/`-q`, if any flag was given.
    pub const fn log_level(&self) -> Option<&'static str> {
        match (self.quiet, self.verbose) {
            (0, 0) => None,
            (0, 1) => Some("debug"),
            (0, _) => Some("trace"),
            (1, _) => Some("warn"),
            (2, _) => Some("error"),
            (_, _) => Some("off"),
        }
    }

    /// Applies command line overrides on top of the file configuration.
    pub fn merge_into(&self, config: &mut Config) {
        if let Some(address) = &self.address {
            config.listener.address.clone_from(address);
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(level) = self.log_level() {
            config.log.level = level.to_owned();
        }
        if self.json_logs {
            config.log.json = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use rstest::rstest;

    use super::*;
    use crate::config::ListenerConfig;

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[rstest]
    #[case(&[], None)]
    #[case(&["-v"], Some("debug"))]
    #[case(&["-vv"], Some("trace"))]
    #[case(&["-q"], Some("warn"))]
    #[case(&["-qq"], Some("error"))]
    #[case(&["-qqq"], Some("off"))]
    fn log_level_from_flags(#[case] flags: &[&str], #[case] expected: Option<&str>) {
        let args = std::iter::once("ipfix-collector").chain(flags.iter().copied());
        let opts = Opts::try_parse_from(args).unwrap();
        assert_eq!(opts.log_level(), expected);
    }

    #[test]
    fn overrides_the_config_file() {
        let opts = Opts::try_parse_from([
            "ipfix-collector",
            "--address",
            "0.0.0.0",
            "--port",
            "2055",
            "-v",
            "--json-logs",
        ])
        .unwrap();
        let mut config = Config::default();
        opts.merge_into(&mut config);

        assert_eq!(config.listener.address, "0.0.0.0");
        assert_eq!(config.listener.port, 2055);
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
    }

    #[test]
    fn keeps_file_values_without_flags() {
        let opts = Opts::try_parse_from(["ipfix-collector"]).unwrap();
        let mut config = Config::default();
        config.log.level = "warn".to_owned();
        opts.merge_into(&mut config);

        assert_eq!(config.log.level, "warn");
        assert_eq!(config.listener, ListenerConfig::default());
    }
}
