//! UDP listener for IPFIX exporters.
//!
//! One task owns the socket and only moves datagrams. Decoding happens on a
//! pool of workers, each fed by a bounded queue; datagrams are routed by
//! source address so every exporter is decoded in arrival order. Decoded
//! messages go through one more bounded queue to a dispatch stage that
//! limits how many [`Dispatcher::submit`] calls run at once.

use std::{
    hash::{BuildHasher, RandomState},
    io,
    net::{AddrParseError, SocketAddr},
    sync::Arc,
    time::Duration,
};

use bytes::Bytes;
use ipfix_parser::{InformationElementRegistry, Message, PacketDecoder, SessionRegistry};
use snafu::{ResultExt, Snafu};
use stream_cancel::Trigger;
use tokio::{
    net::UdpSocket,
    sync::{Semaphore, mpsc},
    task::JoinSet,
    time::{self, Instant, Interval, MissedTickBehavior},
};

use crate::{
    config::ListenerConfig,
    dispatcher::Dispatcher,
    internal_events::{
        IpfixBindError, IpfixBytesReceived, IpfixDatagramDropped, IpfixDecodeWorkerStopped,
        IpfixDispatchError, IpfixListenerStarted, IpfixListenerStopped, IpfixMessageDispatched,
        IpfixMessagesDecoded, IpfixPacketDecodeError, IpfixReceiveError, IpfixSessionsExpired,
        IpfixSetSkipped, IpfixShutdownTimeout,
    },
    net,
    shutdown::ShutdownSignal,
};

/// Upper bound on the interval between idle session sweeps.
const MAX_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ListenerError {
    #[snafu(display("Invalid bind address {:?}: {}", address, source))]
    ParseBindAddress {
        address: String,
        source: AddrParseError,
    },
    #[snafu(display("Unable to bind to {}: {}", address, source))]
    Bind {
        address: SocketAddr,
        source: io::Error,
    },
    #[snafu(display("Unable to configure listener socket: {}", source))]
    Configure { source: io::Error },
}

#[derive(Debug)]
struct Datagram {
    peer_addr: SocketAddr,
    payload: Bytes,
}

/// A listener that has not been started yet.
pub struct IpfixListener {
    config: ListenerConfig,
    decoder: PacketDecoder,
    dispatcher: Arc<dyn Dispatcher>,
}

impl IpfixListener {
    pub fn new(
        config: ListenerConfig,
        registry: Arc<SessionRegistry>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            config,
            decoder: PacketDecoder::new(registry),
            dispatcher,
        }
    }

    /// Replaces the IANA element table used to name and decode fields.
    pub fn with_elements(mut self, elements: Arc<InformationElementRegistry>) -> Self {
        self.decoder = PacketDecoder::with_elements(Arc::clone(self.decoder.sessions()), elements);
        self
    }

    /// Binds the socket and spawns the pipeline.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> Result<RunningListener, ListenerError> {
        let address = self.config.socket_addr().context(ParseBindAddressSnafu {
            address: self.config.address.clone(),
        })?;
        let socket = net::bind_udp(address, self.config.receive_buffer_bytes).map_err(|error| {
            emit!(IpfixBindError {
                address,
                error: &error,
            });
            ListenerError::Bind {
                address,
                source: error,
            }
        })?;
        let socket = UdpSocket::from_std(socket).context(ConfigureSnafu)?;
        let local_addr = socket.local_addr().context(ConfigureSnafu)?;

        let (trigger, shutdown) = ShutdownSignal::new_wired();
        let workers = self.config.workers.max(1);
        let mut tasks = JoinSet::new();

        let (dispatch_tx, dispatch_rx) = mpsc::channel(self.config.dispatch_queue_size.max(1));
        tasks.spawn(dispatch_messages(
            dispatch_rx,
            Arc::clone(&self.dispatcher),
            self.config.max_in_flight_dispatches.max(1),
        ));

        let mut queues = Vec::with_capacity(workers);
        for _ in 0..workers {
            let (tx, rx) = mpsc::channel(self.config.worker_queue_size.max(1));
            queues.push(tx);
            tasks.spawn(decode_datagrams(rx, self.decoder.clone(), dispatch_tx.clone()));
        }
        drop(dispatch_tx);

        tasks.spawn(
            ReceiveLoop {
                socket,
                local_addr,
                max_packet_size: self.config.max_packet_size,
                queues,
                router: RandomState::new(),
                sessions: Arc::clone(self.decoder.sessions()),
                idle_timeout: self.config.session_idle_timeout(),
            }
            .run(shutdown),
        );

        emit!(IpfixListenerStarted {
            address: local_addr,
            workers,
        });

        Ok(RunningListener {
            local_addr,
            trigger,
            tasks,
            shutdown_timeout: self.config.shutdown_timeout(),
        })
    }
}

impl std::fmt::Debug for IpfixListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpfixListener")
            .field("config", &self.config)
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}

/// Handle to a started listener.
pub struct RunningListener {
    local_addr: SocketAddr,
    trigger: Trigger,
    tasks: JoinSet<()>,
    shutdown_timeout: Duration,
}

impl RunningListener {
    /// The bound address, with the actual port when port 0 was requested.
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops receiving, then lets queued datagrams and in-flight dispatches
    /// finish for up to the shutdown timeout. Whatever is left after that is
    /// aborted. The socket is closed when this returns.
    pub async fn stop(self) {
        let Self {
            trigger,
            mut tasks,
            shutdown_timeout,
            ..
        } = self;
        trigger.cancel();

        let drained = time::timeout(shutdown_timeout, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            emit!(IpfixShutdownTimeout {
                timeout: shutdown_timeout,
                aborted: tasks.len(),
            });
            tasks.shutdown().await;
        }
    }
}

impl std::fmt::Debug for RunningListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningListener")
            .field("local_addr", &self.local_addr)
            .field("tasks", &self.tasks.len())
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish_non_exhaustive()
    }
}

struct ReceiveLoop {
    socket: UdpSocket,
    local_addr: SocketAddr,
    max_packet_size: usize,
    queues: Vec<mpsc::Sender<Datagram>>,
    router: RandomState,
    sessions: Arc<SessionRegistry>,
    idle_timeout: Option<Duration>,
}

impl ReceiveLoop {
    async fn run(self, mut shutdown: ShutdownSignal) {
        let mut buf = vec![0; self.max_packet_size];
        let mut maintenance = self.idle_timeout.map(|idle_timeout| {
            let period = (idle_timeout / 2).clamp(Duration::from_millis(1), MAX_MAINTENANCE_INTERVAL);
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break,
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((byte_size, peer_addr)) => {
                        emit!(IpfixBytesReceived { byte_size, peer_addr });
                        self.route(Datagram {
                            peer_addr,
                            payload: Bytes::copy_from_slice(&buf[..byte_size]),
                        });
                    }
                    Err(error) => emit!(IpfixReceiveError { error }),
                },
                _ = tick(&mut maintenance) => self.expire_sessions(),
            }
        }

        emit!(IpfixListenerStopped {
            address: self.local_addr,
        });
    }

    fn route(&self, datagram: Datagram) {
        let worker = self.worker_for(&datagram.peer_addr);
        let peer_addr = datagram.peer_addr;
        if let Err(error) = self.queues[worker].try_send(datagram) {
            match error {
                mpsc::error::TrySendError::Full(_) => {
                    emit!(IpfixDatagramDropped { peer_addr, worker })
                }
                mpsc::error::TrySendError::Closed(_) => {
                    emit!(IpfixDecodeWorkerStopped { peer_addr, worker })
                }
            }
        }
    }

    fn worker_for(&self, peer_addr: &SocketAddr) -> usize {
        let hash = self.router.hash_one(peer_addr.ip().to_canonical());
        (hash % self.queues.len() as u64) as usize
    }

    fn expire_sessions(&self) {
        if let Some(idle_timeout) = self.idle_timeout {
            let count = self.sessions.expire_idle(idle_timeout);
            emit!(IpfixSessionsExpired {
                count,
                remaining: self.sessions.len(),
            });
        }
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn decode_datagrams(
    mut datagrams: mpsc::Receiver<Datagram>,
    decoder: PacketDecoder,
    dispatch: mpsc::Sender<Message>,
) {
    while let Some(Datagram { peer_addr, payload }) = datagrams.recv().await {
        // IPv4 exporters reach a dual stack socket as mapped IPv6 addresses.
        let exporter = peer_addr.ip().to_canonical();
        let decoded = match decoder.decode(exporter, &payload) {
            Ok(decoded) => decoded,
            Err(error) => {
                emit!(IpfixPacketDecodeError {
                    error: &error,
                    peer_addr,
                });
                continue;
            }
        };

        for issue in &decoded.issues {
            emit!(IpfixSetSkipped { issue, peer_addr });
        }
        emit!(IpfixMessagesDecoded {
            count: decoded.messages.len(),
            templates_installed: decoded.templates_installed,
            templates_withdrawn: decoded.templates_withdrawn,
            peer_addr,
        });

        for message in decoded.messages {
            if dispatch.send(message).await.is_err() {
                return;
            }
        }
    }
}

async fn dispatch_messages(
    mut messages: mpsc::Receiver<Message>,
    dispatcher: Arc<dyn Dispatcher>,
    max_in_flight: usize,
) {
    let permits = Arc::new(Semaphore::new(max_in_flight));
    let mut in_flight = JoinSet::new();

    while let Some(message) = messages.recv().await {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        let dispatcher = Arc::clone(&dispatcher);
        in_flight.spawn(async move {
            let _permit = permit;
            match dispatcher.submit(message).await {
                Ok(_) => emit!(IpfixMessageDispatched),
                Err(error) => emit!(IpfixDispatchError { error }),
            }
        });
        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
}
