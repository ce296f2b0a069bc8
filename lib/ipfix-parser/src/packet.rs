//! Decoding of whole IPFIX messages.
//!
//! Decoding runs in three steps, each a plain function of its inputs:
//!
//! 1. [`Header::parse`] reads and checks the message header.
//! 2. [`split_sets`] cuts the message into sets, checking every set bound
//!    before any record is decoded. A structural error here discards the
//!    packet before it produced anything.
//! 3. [`decode_set`] interprets one set against the exporter's [`Session`],
//!    installing templates or emitting [`Message`]s.
//!
//! [`PacketDecoder`] strings these together and holds the session lock for
//! the duration of one packet, so template sets in a packet are visible to
//! data sets that follow them in the same or a later packet.

use std::net::IpAddr;
use std::sync::Arc;

use serde::Serialize;
use snafu::{OptionExt, ResultExt, ensure};

use crate::buffer::Cursor;
use crate::error::{
    InvalidMessageLengthSnafu, InvalidSetLengthSnafu, MalformedTemplateSnafu,
    MissingTemplateSnafu, PacketError, SetIssue, TruncatedHeaderSnafu, TruncatedSetHeaderSnafu,
    UnsupportedVersionSnafu,
};
use crate::ie::InformationElementRegistry;
use crate::message::{Message, MessageContext};
use crate::session::{Session, SessionKey, SessionRegistry, lock};
use crate::template::{
    MIN_DATA_SET_ID, OPTIONS_TEMPLATE_SET_ID, TEMPLATE_SET_ID, TemplateKind, TemplateRecord,
};

pub const IPFIX_VERSION: u16 = 10;
pub const HEADER_LENGTH: usize = 16;
pub const SET_HEADER_LENGTH: usize = 4;

/// The fixed IPFIX Message Header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub version: u16,
    pub length: u16,
    pub export_time: u32,
    pub sequence_number: u32,
    pub observation_domain_id: u32,
}

impl Header {
    pub fn parse(bytes: &[u8]) -> Result<Self, PacketError> {
        let header = bytes
            .first_chunk::<HEADER_LENGTH>()
            .context(TruncatedHeaderSnafu {
                length: bytes.len(),
            })?;
        let u16_at = |offset: usize| u16::from_be_bytes([header[offset], header[offset + 1]]);
        let u32_at = |offset: usize| {
            u32::from_be_bytes([
                header[offset],
                header[offset + 1],
                header[offset + 2],
                header[offset + 3],
            ])
        };

        let version = u16_at(0);
        ensure!(version == IPFIX_VERSION, UnsupportedVersionSnafu { version });

        let length = u16_at(2);
        let declared = usize::from(length);
        ensure!(
            declared >= HEADER_LENGTH && declared <= bytes.len(),
            InvalidMessageLengthSnafu {
                declared,
                available: bytes.len(),
            }
        );

        Ok(Self {
            version,
            length,
            export_time: u32_at(4),
            sequence_number: u32_at(8),
            observation_domain_id: u32_at(12),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetKind {
    Template(TemplateKind),
    Data,
    Reserved,
}

impl SetKind {
    pub const fn from_id(id: u16) -> Self {
        match id {
            TEMPLATE_SET_ID => Self::Template(TemplateKind::Data),
            OPTIONS_TEMPLATE_SET_ID => Self::Template(TemplateKind::Options),
            id if id >= MIN_DATA_SET_ID => Self::Data,
            _ => Self::Reserved,
        }
    }
}

/// One set of a message, its header already stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSet<'a> {
    pub id: u16,
    pub body: &'a [u8],
}

impl RawSet<'_> {
    pub const fn kind(&self) -> SetKind {
        SetKind::from_id(self.id)
    }
}

/// Splits the message body described by `header` into sets.
///
/// Bytes past the declared message length are ignored.
pub fn split_sets<'a>(header: &Header, bytes: &'a [u8]) -> Result<Vec<RawSet<'a>>, PacketError> {
    let body = bytes
        .get(HEADER_LENGTH..usize::from(header.length))
        .unwrap_or_default();
    let mut cursor = Cursor::new(body);
    let mut sets = Vec::new();

    while !cursor.is_empty() {
        let remaining = cursor.remaining();
        let set_header = cursor
            .array::<SET_HEADER_LENGTH>()
            .ok()
            .context(TruncatedSetHeaderSnafu { remaining })?;
        let set_id = u16::from_be_bytes([set_header[0], set_header[1]]);
        let length = usize::from(u16::from_be_bytes([set_header[2], set_header[3]]));
        ensure!(
            length >= SET_HEADER_LENGTH,
            InvalidSetLengthSnafu { set_id, length }
        );

        let body = cursor
            .take(length - SET_HEADER_LENGTH)
            .map_err(|_| PacketError::SetOverrun {
                set_id,
                length,
                remaining,
            })?;
        sets.push(RawSet { id: set_id, body });
    }

    Ok(sets)
}

/// Everything one message produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPacket {
    pub header: Header,
    pub messages: Vec<Message>,
    pub issues: Vec<SetIssue>,
    pub templates_installed: usize,
    pub templates_withdrawn: usize,
}

impl DecodedPacket {
    pub const fn new(header: Header) -> Self {
        Self {
            header,
            messages: Vec::new(),
            issues: Vec::new(),
            templates_installed: 0,
            templates_withdrawn: 0,
        }
    }
}

/// Interprets one set against `session`, adding its output to `packet`.
///
/// Messages decoded before an error stay in `packet`. The returned issue
/// tells the caller whether to continue with the next set
/// ([`SetIssue::aborts_packet`]).
pub fn decode_set(
    set: &RawSet<'_>,
    session: &mut Session,
    elements: &InformationElementRegistry,
    packet: &mut DecodedPacket,
) -> Result<(), SetIssue> {
    match set.kind() {
        SetKind::Template(kind) => decode_template_set(set, kind, session, elements, packet),
        SetKind::Data => decode_data_set(set, session, packet),
        SetKind::Reserved => Err(SetIssue::ReservedSet { set_id: set.id }),
    }
}

fn decode_template_set(
    set: &RawSet<'_>,
    kind: TemplateKind,
    session: &mut Session,
    elements: &InformationElementRegistry,
    packet: &mut DecodedPacket,
) -> Result<(), SetIssue> {
    let mut cursor = Cursor::new(set.body);
    // Anything shorter than a record header is padding.
    while cursor.remaining() >= TemplateRecord::MIN_LENGTH {
        let record = TemplateRecord::parse(&mut cursor, kind, elements)
            .context(MalformedTemplateSnafu { set_id: set.id })?;
        match record {
            TemplateRecord::Definition(template) => {
                session.install(template);
                packet.templates_installed += 1;
            }
            TemplateRecord::Withdrawal { template_id } if template_id == kind.set_id() => {
                packet.templates_withdrawn += session.withdraw_all(kind);
            }
            TemplateRecord::Withdrawal { template_id } => {
                if session.withdraw(template_id) {
                    packet.templates_withdrawn += 1;
                }
            }
        }
    }
    Ok(())
}

fn decode_data_set(
    set: &RawSet<'_>,
    session: &mut Session,
    packet: &mut DecodedPacket,
) -> Result<(), SetIssue> {
    let template = session
        .template(set.id)
        .context(MissingTemplateSnafu { set_id: set.id })?;
    let context = MessageContext {
        exporter: session.key().exporter,
        observation_domain_id: packet.header.observation_domain_id,
        export_time: packet.header.export_time,
        sequence_number: packet.header.sequence_number,
    };

    let min_record_length = template.min_record_length().max(1);
    let mut cursor = Cursor::new(set.body);
    let mut record = 0;
    // Fewer bytes than the smallest record are padding.
    while cursor.remaining() >= min_record_length {
        let values = template
            .fields
            .iter()
            .map(|field| field.decode(&mut cursor))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| {
                if source.is_overrun() {
                    SetIssue::RecordOverrun {
                        set_id: set.id,
                        record,
                        source,
                    }
                } else {
                    SetIssue::RecordDecode {
                        set_id: set.id,
                        record,
                        source,
                    }
                }
            })?;
        packet.messages.push(context.message(&template, values));
        record += 1;
    }
    Ok(())
}

/// Decodes whole messages against a shared [`SessionRegistry`].
#[derive(Debug, Clone)]
pub struct PacketDecoder {
    sessions: Arc<SessionRegistry>,
    elements: Arc<InformationElementRegistry>,
}

impl PacketDecoder {
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self::with_elements(sessions, Arc::new(InformationElementRegistry::iana()))
    }

    pub const fn with_elements(
        sessions: Arc<SessionRegistry>,
        elements: Arc<InformationElementRegistry>,
    ) -> Self {
        Self { sessions, elements }
    }

    pub const fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Decodes one message received from `exporter`.
    ///
    /// Fails only for structural errors, in which case the session is left
    /// untouched. Everything else is reported in [`DecodedPacket::issues`].
    pub fn decode(&self, exporter: IpAddr, bytes: &[u8]) -> Result<DecodedPacket, PacketError> {
        let header = Header::parse(bytes)?;
        let sets = split_sets(&header, bytes)?;

        let session = self
            .sessions
            .session(SessionKey::new(exporter, header.observation_domain_id));
        let mut session = lock(&session);
        session.touch();

        let mut packet = DecodedPacket::new(header);
        if let Some(expected) = session.check_sequence(header.sequence_number) {
            packet.issues.push(SetIssue::SequenceGap {
                expected,
                received: header.sequence_number,
            });
        }

        for set in &sets {
            if let Err(issue) = decode_set(set, &mut session, &self.elements, &mut packet) {
                let abort = issue.aborts_packet();
                packet.issues.push(issue);
                if abort {
                    break;
                }
            }
        }

        if packet.issues.iter().any(SetIssue::loses_records) {
            session.reset_sequence();
        } else {
            session.advance_sequence(header.sequence_number, packet.messages.len());
        }
        Ok(packet)
    }
}
