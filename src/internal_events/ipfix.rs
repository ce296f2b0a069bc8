use std::net::SocketAddr;
use std::time::Duration;

use ipfix_parser::{PacketError, SetIssue};
use metrics::{counter, gauge};

use super::InternalEvent;
use super::prelude::{error_stage, error_type, io_error_code};
use crate::dispatcher::DispatchError;

#[derive(Debug)]
pub struct IpfixListenerStarted {
    pub address: SocketAddr,
    pub workers: usize,
}

impl InternalEvent for IpfixListenerStarted {
    fn emit(self) {
        info!(
            message = "Listening for IPFIX messages.",
            address = %self.address,
            workers = self.workers,
        );
    }
}

#[derive(Debug)]
pub struct IpfixListenerStopped {
    pub address: SocketAddr,
}

impl InternalEvent for IpfixListenerStopped {
    fn emit(self) {
        info!(message = "IPFIX listener stopped.", address = %self.address);
    }
}

#[derive(Debug)]
pub struct IpfixBindError<'a> {
    pub address: SocketAddr,
    pub error: &'a std::io::Error,
}

impl InternalEvent for IpfixBindError<'_> {
    fn emit(self) {
        error!(
            message = "Unable to bind IPFIX listener socket.",
            address = %self.address,
            error = %self.error,
            error_code = io_error_code(self.error),
            error_type = error_type::CONFIGURATION_FAILED,
            stage = error_stage::RECEIVING,
        );
        counter!(
            "component_errors_total",
            "error_code" => io_error_code(self.error),
            "error_type" => error_type::CONFIGURATION_FAILED,
            "stage" => error_stage::RECEIVING,
        )
        .increment(1);
    }
}

#[derive(Debug)]
pub struct IpfixReceiveError {
    pub error: std::io::Error,
}

impl InternalEvent for IpfixReceiveError {
    fn emit(self) {
        error!(
            message = "Error receiving IPFIX datagram.",
            error = %self.error,
            error_code = io_error_code(&self.error),
            error_type = error_type::READER_FAILED,
            stage = error_stage::RECEIVING,
        );
        counter!(
            "component_errors_total",
            "error_code" => io_error_code(&self.error),
            "error_type" => error_type::READER_FAILED,
            "stage" => error_stage::RECEIVING,
        )
        .increment(1);
    }
}

#[derive(Debug)]
pub struct IpfixBytesReceived {
    pub byte_size: usize,
    pub peer_addr: SocketAddr,
}

impl InternalEvent for IpfixBytesReceived {
    fn emit(self) {
        trace!(
            message = "Bytes received.",
            byte_size = self.byte_size,
            peer_addr = %self.peer_addr,
            protocol = "udp",
        );
        counter!("component_received_bytes_total", "protocol" => "udp")
            .increment(self.byte_size as u64);
    }
}

#[derive(Debug)]
pub struct IpfixPacketDecodeError<'a> {
    pub error: &'a PacketError,
    pub peer_addr: SocketAddr,
}

impl InternalEvent for IpfixPacketDecodeError<'_> {
    fn emit(self) {
        warn!(
            message = "Discarding malformed IPFIX packet.",
            error = %self.error,
            peer_addr = %self.peer_addr,
            error_type = error_type::PARSER_FAILED,
            stage = error_stage::PROCESSING,
        );
        counter!(
            "component_errors_total",
            "error_type" => error_type::PARSER_FAILED,
            "stage" => error_stage::PROCESSING,
        )
        .increment(1);
        counter!("ipfix_packets_discarded_total").increment(1);
    }
}

#[derive(Debug)]
pub struct IpfixSetSkipped<'a> {
    pub issue: &'a SetIssue,
    pub peer_addr: SocketAddr,
}

impl InternalEvent for IpfixSetSkipped<'_> {
    fn emit(self) {
        match self.issue {
            // Expected until the exporter retransmits its templates.
            SetIssue::MissingTemplate { set_id } => debug!(
                message = "Skipping data set without a known template.",
                set_id,
                peer_addr = %self.peer_addr,
            ),
            SetIssue::SequenceGap { expected, received } => debug!(
                message = "Sequence number gap.",
                expected,
                received,
                peer_addr = %self.peer_addr,
            ),
            issue => warn!(
                message = "Skipping part of an IPFIX packet.",
                error = %issue,
                set_id = issue.set_id(),
                peer_addr = %self.peer_addr,
                error_type = error_type::PARSER_FAILED,
                stage = error_stage::PROCESSING,
            ),
        }
        counter!("ipfix_set_issues_total", "issue" => self.issue.as_str()).increment(1);
    }
}

#[derive(Debug)]
pub struct IpfixMessagesDecoded {
    pub count: usize,
    pub templates_installed: usize,
    pub templates_withdrawn: usize,
    pub peer_addr: SocketAddr,
}

impl InternalEvent for IpfixMessagesDecoded {
    fn emit(self) {
        trace!(
            message = "Messages decoded.",
            count = self.count,
            templates_installed = self.templates_installed,
            templates_withdrawn = self.templates_withdrawn,
            peer_addr = %self.peer_addr,
        );
        counter!("component_received_events_total").increment(self.count as u64);
        counter!("ipfix_templates_installed_total").increment(self.templates_installed as u64);
        counter!("ipfix_templates_withdrawn_total").increment(self.templates_withdrawn as u64);
    }
}

#[derive(Debug)]
pub struct IpfixDatagramDropped {
    pub peer_addr: SocketAddr,
    pub worker: usize,
}

impl InternalEvent for IpfixDatagramDropped {
    fn emit(self) {
        warn!(
            message = "Decode queue is full, dropping datagram.",
            peer_addr = %self.peer_addr,
            worker = self.worker,
            error_type = error_type::BUFFER_FULL,
            stage = error_stage::RECEIVING,
        );
        counter!(
            "component_errors_total",
            "error_type" => error_type::BUFFER_FULL,
            "stage" => error_stage::RECEIVING,
        )
        .increment(1);
        counter!("component_discarded_events_total", "intentional" => "false").increment(1);
    }
}

#[derive(Debug)]
pub struct IpfixDecodeWorkerStopped {
    pub peer_addr: SocketAddr,
    pub worker: usize,
}

impl InternalEvent for IpfixDecodeWorkerStopped {
    fn emit(self) {
        error!(
            message = "Decode worker has stopped, dropping datagram.",
            peer_addr = %self.peer_addr,
            worker = self.worker,
            error_type = error_type::DELIVERY_FAILED,
            stage = error_stage::PROCESSING,
        );
        counter!(
            "component_errors_total",
            "error_type" => error_type::DELIVERY_FAILED,
            "stage" => error_stage::PROCESSING,
        )
        .increment(1);
        counter!("component_discarded_events_total", "intentional" => "false").increment(1);
    }
}

#[derive(Debug)]
pub struct IpfixDispatchError {
    pub error: DispatchError,
}

impl InternalEvent for IpfixDispatchError {
    fn emit(self) {
        error!(
            message = "Failed to dispatch message.",
            error = %self.error,
            error_type = error_type::WRITER_FAILED,
            stage = error_stage::SENDING,
        );
        counter!(
            "component_errors_total",
            "error_type" => error_type::WRITER_FAILED,
            "stage" => error_stage::SENDING,
        )
        .increment(1);
        counter!("component_discarded_events_total", "intentional" => "false").increment(1);
    }
}

#[derive(Debug)]
pub struct IpfixMessageDispatched;

impl InternalEvent for IpfixMessageDispatched {
    fn emit(self) {
        counter!("component_sent_events_total").increment(1);
    }
}

#[derive(Debug)]
pub struct IpfixSessionsExpired {
    pub count: usize,
    pub remaining: usize,
}

impl InternalEvent for IpfixSessionsExpired {
    fn emit(self) {
        if self.count > 0 {
            debug!(
                message = "Expired idle exporter sessions.",
                count = self.count,
                remaining = self.remaining,
            );
            counter!("ipfix_sessions_expired_total").increment(self.count as u64);
        }
        gauge!("ipfix_sessions").set(self.remaining as f64);
    }
}

#[derive(Debug)]
pub struct IpfixShutdownTimeout {
    pub timeout: Duration,
    pub aborted: usize,
}

impl InternalEvent for IpfixShutdownTimeout {
    fn emit(self) {
        error!(
            message = "IPFIX listener did not drain in time, abandoning remaining work.",
            timeout_secs = self.timeout.as_secs(),
            aborted = self.aborted,
            error_type = error_type::TIMED_OUT,
            stage = error_stage::SENDING,
        );
        counter!(
            "component_errors_total",
            "error_type" => error_type::TIMED_OUT,
            "stage" => error_stage::SENDING,
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    use super::*;

    fn counters(emit_events: impl FnOnce()) -> Vec<(String, Vec<(String, String)>, u64)> {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        metrics::with_local_recorder(&recorder, emit_events);

        let mut counters = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| match value {
                DebugValue::Counter(count) => {
                    let key = key.key();
                    let mut labels = key
                        .labels()
                        .map(|label| (label.key().to_owned(), label.value().to_owned()))
                        .collect::<Vec<_>>();
                    labels.sort();
                    Some((key.name().to_owned(), labels, count))
                }
                _ => None,
            })
            .collect::<Vec<_>>();
        counters.sort();
        counters
    }

    fn labels(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn dropped_datagrams_count_as_errors_and_discards() {
        let peer_addr = "192.0.2.7:4739".parse().unwrap();
        let counters = counters(|| {
            emit!(IpfixDatagramDropped {
                peer_addr,
                worker: 0
            });
            emit!(IpfixDatagramDropped {
                peer_addr,
                worker: 0
            });
        });

        assert_eq!(
            counters,
            vec![
                (
                    "component_discarded_events_total".to_owned(),
                    labels(&[("intentional", "false")]),
                    2
                ),
                (
                    "component_errors_total".to_owned(),
                    labels(&[("error_type", "buffer_full"), ("stage", "receiving")]),
                    2
                ),
            ]
        );
    }

    #[test]
    fn datagrams_for_a_stopped_worker_are_counted_as_discarded() {
        let counters = counters(|| {
            emit!(IpfixDecodeWorkerStopped {
                peer_addr: "192.0.2.7:4739".parse().unwrap(),
                worker: 1,
            });
        });

        assert_eq!(
            counters,
            vec![
                (
                    "component_discarded_events_total".to_owned(),
                    labels(&[("intentional", "false")]),
                    1
                ),
                (
                    "component_errors_total".to_owned(),
                    labels(&[("error_type", "delivery_failed"), ("stage", "processing")]),
                    1
                ),
            ]
        );
    }

    #[test]
    fn set_issues_are_counted_by_kind() {
        let peer_addr = "192.0.2.7:4739".parse().unwrap();
        let missing = SetIssue::MissingTemplate { set_id: 300 };
        let gap = SetIssue::SequenceGap {
            expected: 10,
            received: 12,
        };
        let counters = counters(|| {
            emit!(IpfixSetSkipped {
                issue: &missing,
                peer_addr
            });
            emit!(IpfixSetSkipped {
                issue: &missing,
                peer_addr
            });
            emit!(IpfixSetSkipped {
                issue: &gap,
                peer_addr
            });
        });

        assert_eq!(
            counters,
            vec![
                (
                    "ipfix_set_issues_total".to_owned(),
                    labels(&[("issue", "missing_template")]),
                    2
                ),
                (
                    "ipfix_set_issues_total".to_owned(),
                    labels(&[("issue", "sequence_gap")]),
                    1
                ),
            ]
        );
    }

    #[test]
    fn decoded_messages_feed_the_received_and_template_counters() {
        let counters = counters(|| {
            emit!(IpfixMessagesDecoded {
                count: 3,
                templates_installed: 2,
                templates_withdrawn: 0,
                peer_addr: "[2001:db8::1]:4739".parse().unwrap(),
            });
        });

        let received = counters
            .iter()
            .find(|(name, _, _)| name == "component_received_events_total")
            .map(|(_, _, count)| *count);
        let installed = counters
            .iter()
            .find(|(name, _, _)| name == "ipfix_templates_installed_total")
            .map(|(_, _, count)| *count);
        assert_eq!(received, Some(3));
        assert_eq!(installed, Some(2));
    }
}
