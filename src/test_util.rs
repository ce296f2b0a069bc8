use std::{
    net::SocketAddr,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use ipfix_parser::Message;
use tokio::{net::UdpSocket, sync::mpsc, time::timeout};

use crate::dispatcher::{Ack, DispatchError, Dispatcher};

/// Forwards every submitted message into a channel the test reads from.
#[derive(Debug)]
pub struct CollectingDispatcher {
    tx: mpsc::UnboundedSender<Message>,
    fail_every: Option<usize>,
    submitted: AtomicUsize,
}

impl CollectingDispatcher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            tx,
            fail_every: None,
            submitted: AtomicUsize::new(0),
        };
        (dispatcher, rx)
    }

    /// Rejects every `n`th submission instead of forwarding it.
    pub fn failing_every(n: usize) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (mut dispatcher, rx) = Self::new();
        dispatcher.fail_every = Some(n);
        (dispatcher, rx)
    }
}

#[async_trait]
impl Dispatcher for CollectingDispatcher {
    async fn submit(&self, message: Message) -> Result<Ack, DispatchError> {
        let count = self.submitted.fetch_add(1, Ordering::Relaxed) + 1;
        if self.fail_every.is_some_and(|n| count % n == 0) {
            return Err(DispatchError::new("rejected by test dispatcher"));
        }
        self.tx
            .send(message)
            .map_err(|_| DispatchError::new("receiver dropped"))?;
        Ok(Ack)
    }
}

/// Waits for `count` messages, failing the test after a few seconds.
pub async fn collect_n(rx: &mut mpsc::UnboundedReceiver<Message>, count: usize) -> Vec<Message> {
    let mut messages = Vec::with_capacity(count);
    while messages.len() < count {
        match timeout(Duration::from_secs(5), rx.recv()).await {
            Ok(Some(message)) => messages.push(message),
            Ok(None) => panic!("dispatcher dropped after {} messages", messages.len()),
            Err(_) => panic!("timed out after {} of {count} messages", messages.len()),
        }
    }
    messages
}

/// Asserts that nothing arrives within a short window.
pub async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<Message>) {
    if let Ok(Some(message)) = timeout(Duration::from_millis(200), rx.recv()).await {
        panic!("unexpected message: {message:?}");
    }
}

pub async fn send_datagrams(target: SocketAddr, datagrams: &[Vec<u8>]) -> UdpSocket {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    for datagram in datagrams {
        socket.send_to(datagram, target).await.unwrap();
    }
    socket
}
