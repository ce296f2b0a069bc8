use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an `EnvFilter` directive that overrides the
/// level derived from the command line.
pub const LOG_ENV: &str = "IPFIX_LOG";

/// Installs the global subscriber.
///
/// Later calls are ignored, since tests can initialize this multiple times.
pub fn init(color: bool, json: bool, levels: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(levels));

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry
            .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_ansi(color).with_writer(std::io::stderr))
            .try_init()
    };
}

/// Whether log output should be coloured when nothing is configured.
pub fn default_color() -> bool {
    std::io::stderr().is_terminal()
}

/// Installs a test subscriber honouring `IPFIX_LOG`.
#[cfg(test)]
pub fn test_init() {
    init(false, false, "error");
}
