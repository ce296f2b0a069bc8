//! A UDP collector that decodes IPFIX flow records and hands them to a
//! [`Dispatcher`](dispatcher::Dispatcher).

#![deny(missing_debug_implementations)]

#[macro_use]
extern crate tracing;

#[macro_use]
pub mod internal_events;

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod net;
pub mod shutdown;
pub mod signal;
pub mod sources;
#[cfg(test)]
pub mod test_util;
pub mod trace;

pub use config::Config;
pub use dispatcher::{Ack, DispatchError, Dispatcher, StdoutDispatcher};
pub use sources::ipfix::{IpfixListener, ListenerError, RunningListener};

pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
