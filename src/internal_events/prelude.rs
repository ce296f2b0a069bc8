pub mod error_stage {
    pub const RECEIVING: &str = "receiving";
    pub const PROCESSING: &str = "processing";
    pub const SENDING: &str = "sending";
}

pub mod error_type {
    /// The error was caused when reading from the network.
    pub const READER_FAILED: &str = "reader_failed";
    /// The error was caused when parsing received bytes.
    pub const PARSER_FAILED: &str = "parser_failed";
    /// The error was caused by a component that could not keep up.
    pub const BUFFER_FULL: &str = "buffer_full";
    /// The error was caused by a pipeline stage that is no longer running.
    pub const DELIVERY_FAILED: &str = "delivery_failed";
    /// The error was caused when handing events to a downstream consumer.
    pub const WRITER_FAILED: &str = "writer_failed";
    /// The error was caused by an operation that did not finish in time.
    pub const TIMED_OUT: &str = "timed_out";
    /// The error was caused by the configuration or the environment it
    /// was applied to.
    pub const CONFIGURATION_FAILED: &str = "configuration_failed";
}

pub(crate) fn io_error_code(error: &std::io::Error) -> &'static str {
    use std::io::ErrorKind::*;

    match error.kind() {
        AddrInUse => "address_in_use",
        AddrNotAvailable => "address_not_available",
        ConnectionRefused => "connection_refused",
        ConnectionReset => "connection_reset",
        Interrupted => "operation_interrupted",
        InvalidInput => "invalid_input_parameter",
        PermissionDenied => "permission_denied",
        TimedOut => "timed_out",
        Unsupported => "unsupported",
        WouldBlock => "operation_would_block",
        _ => "unknown",
    }
}
