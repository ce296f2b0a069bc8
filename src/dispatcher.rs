//! Where decoded messages go once the listener is done with them.

use async_trait::async_trait;
use ipfix_parser::Message;
use snafu::{FromString, ResultExt, Snafu};
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};

/// Confirmation that a dispatcher accepted a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack;

#[derive(Debug, Snafu)]
#[snafu(whatever, display("{message}"))]
pub struct DispatchError {
    message: String,
    #[snafu(source(from(Box<dyn std::error::Error + Send + Sync>, Some)))]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DispatchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::without_source(message.into())
    }
}

/// Asynchronous publish interface for decoded messages.
///
/// The listener calls `submit` concurrently from several tasks, bounded by
/// `max_in_flight_dispatches`.
#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    async fn submit(&self, message: Message) -> Result<Ack, DispatchError>;
}

/// Writes every message as one line of JSON.
#[derive(Debug)]
pub struct JsonLinesDispatcher<W> {
    writer: Mutex<W>,
}

pub type StdoutDispatcher = JsonLinesDispatcher<tokio::io::Stdout>;

impl StdoutDispatcher {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> JsonLinesDispatcher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> Dispatcher for JsonLinesDispatcher<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn submit(&self, message: Message) -> Result<Ack, DispatchError> {
        let mut line = serde_json::to_vec(&message).whatever_context("Failed to encode message")?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .whatever_context("Failed to write message")?;
        writer
            .flush()
            .await
            .whatever_context("Failed to flush output")?;
        Ok(Ack)
    }
}
