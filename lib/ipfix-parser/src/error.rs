use snafu::Snafu;

/// A failure while decoding a single field of a data record.
///
/// Field errors leave the cursor at an unknown offset inside the record, so the
/// caller abandons the rest of the enclosing set.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DecodeError {
    #[snafu(display("Need {} bytes but only {} remain", needed, remaining))]
    InsufficientBytes { needed: usize, remaining: usize },

    #[snafu(display(
        "Field {} has length {} outside of the allowed range {}..={}",
        name,
        length,
        min,
        max
    ))]
    InvalidLength {
        name: String,
        length: usize,
        min: usize,
        max: usize,
    },

    #[snafu(display("Field {} carries invalid boolean value {}", name, value))]
    InvalidBoolean { name: String, value: u8 },

    #[snafu(display(
        "Variable length prefix announces an extended length but only {} bytes remain",
        remaining
    ))]
    ExtendedLengthTruncated { remaining: usize },
}

impl DecodeError {
    /// Whether a declared field length, or the extended length prefix that
    /// announces it, ran past the end of the enclosing set.
    pub const fn is_overrun(&self) -> bool {
        matches!(
            self,
            Self::InsufficientBytes { .. } | Self::ExtendedLengthTruncated { .. }
        )
    }
}

/// A Template Record that cannot be installed.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TemplateError {
    #[snafu(display("Template record is truncated: {}", source))]
    Truncated { source: DecodeError },

    #[snafu(display("Template id {} is reserved for set ids", template_id))]
    ReservedTemplateId { template_id: u16 },

    #[snafu(display(
        "Template {} declares {} scope fields out of {} fields",
        template_id,
        scope_field_count,
        field_count
    ))]
    InvalidScopeCount {
        template_id: u16,
        scope_field_count: u16,
        field_count: u16,
    },

    #[snafu(display("Template {} describes records of zero length", template_id))]
    EmptyRecord { template_id: u16 },
}

/// A structural failure that discards a whole packet.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PacketError {
    #[snafu(display("Packet of {} bytes is too short for a message header", length))]
    TruncatedHeader { length: usize },

    #[snafu(display("Unsupported protocol version {}", version))]
    UnsupportedVersion { version: u16 },

    #[snafu(display(
        "Message header declares {} bytes but {} are available",
        declared,
        available
    ))]
    InvalidMessageLength { declared: usize, available: usize },

    #[snafu(display(
        "Set {} declares {} bytes but only {} remain in the message",
        set_id,
        length,
        remaining
    ))]
    SetOverrun {
        set_id: u16,
        length: usize,
        remaining: usize,
    },

    #[snafu(display("Set {} declares invalid length {}", set_id, length))]
    InvalidSetLength { set_id: u16, length: usize },

    #[snafu(display("Truncated set header with {} bytes left in the message", remaining))]
    TruncatedSetHeader { remaining: usize },
}

/// A condition that cost some or all of one Set's content without discarding
/// the packet around it.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SetIssue {
    #[snafu(display("No template known for data set {}", set_id))]
    MissingTemplate { set_id: u16 },

    #[snafu(display("Failed to decode record {} of set {}: {}", record, set_id, source))]
    RecordDecode {
        set_id: u16,
        record: usize,
        source: DecodeError,
    },

    #[snafu(display("Record {} overruns the bounds of set {}: {}", record, set_id, source))]
    RecordOverrun {
        set_id: u16,
        record: usize,
        source: DecodeError,
    },

    #[snafu(display("Malformed template record in set {}: {}", set_id, source))]
    MalformedTemplate { set_id: u16, source: TemplateError },

    #[snafu(display("Skipped set with reserved id {}", set_id))]
    ReservedSet { set_id: u16 },

    #[snafu(display("Expected sequence number {} but received {}", expected, received))]
    SequenceGap { expected: u32, received: u32 },
}

impl SetIssue {
    /// Whether the rest of the packet is abandoned after this issue.
    pub const fn aborts_packet(&self) -> bool {
        matches!(self, Self::RecordOverrun { .. })
    }

    /// Whether Data Records were skipped, leaving the sequence number of the
    /// next message unpredictable.
    pub const fn loses_records(&self) -> bool {
        matches!(
            self,
            Self::MissingTemplate { .. } | Self::RecordDecode { .. } | Self::RecordOverrun { .. }
        )
    }

    pub const fn set_id(&self) -> Option<u16> {
        match self {
            Self::MissingTemplate { set_id }
            | Self::RecordDecode { set_id, .. }
            | Self::RecordOverrun { set_id, .. }
            | Self::MalformedTemplate { set_id, .. }
            | Self::ReservedSet { set_id } => Some(*set_id),
            Self::SequenceGap { .. } => None,
        }
    }

    /// Short, stable name used as a metric tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingTemplate { .. } => "missing_template",
            Self::RecordDecode { .. } => "record_decode",
            Self::RecordOverrun { .. } => "record_overrun",
            Self::MalformedTemplate { .. } => "malformed_template",
            Self::ReservedSet { .. } => "reserved_set",
            Self::SequenceGap { .. } => "sequence_gap",
        }
    }
}
