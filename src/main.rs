use std::{process::ExitCode, sync::Arc};

use futures::StreamExt;
use ipfix_collector::{
    IpfixListener, ListenerError, StdoutDispatcher,
    cli::Opts,
    config::Config,
    signal::{self, SignalTo},
    trace,
};
use ipfix_parser::SessionRegistry;
use tracing::{error, info};

fn main() -> ExitCode {
    let opts = Opts::get_matches();

    let mut config = match &opts.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(error) => {
                trace::init(trace::default_color(), opts.json_logs, "error");
                error!(message = "Configuration error.", %error);
                return exit(exitcode::CONFIG);
            }
        },
        None => Config::default(),
    };
    opts.merge_into(&mut config);

    trace::init(
        config.log.color.unwrap_or_else(trace::default_color),
        config.log.json,
        &config.log.level,
    );

    if let Err(error) = config.validate() {
        error!(message = "Configuration error.", %error);
        return exit(exitcode::CONFIG);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            error!(message = "Unable to create async runtime.", %error);
            return exit(exitcode::OSERR);
        }
    };

    exit(runtime.block_on(run(config)))
}

async fn run(config: Config) -> exitcode::ExitCode {
    let registry = Arc::new(SessionRegistry::new());
    let listener = IpfixListener::new(
        config.listener,
        registry,
        Arc::new(StdoutDispatcher::stdout()),
    );
    let listener = match listener.start() {
        Ok(listener) => listener,
        Err(error @ ListenerError::ParseBindAddress { .. }) => {
            error!(message = "Configuration error.", %error);
            return exitcode::CONFIG;
        }
        Err(error) => {
            error!(message = "Failed to start listener.", %error);
            return exitcode::UNAVAILABLE;
        }
    };
    info!(
        message = "IPFIX collector started.",
        version = ipfix_collector::get_version(),
        address = %listener.local_addr(),
    );

    let mut signals = std::pin::pin!(signal::signals());
    match signals.next().await {
        Some(SignalTo::Quit) => {
            info!("Quitting immediately.");
            return exitcode::OK;
        }
        Some(SignalTo::Shutdown) | None => info!("Shutting down."),
    }

    tokio::select! {
        _ = listener.stop() => info!("IPFIX collector stopped."),
        Some(SignalTo::Quit | SignalTo::Shutdown) = signals.next() => {
            info!("Shutdown interrupted, quitting immediately.");
        }
    }
    exitcode::OK
}

fn exit(code: exitcode::ExitCode) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
