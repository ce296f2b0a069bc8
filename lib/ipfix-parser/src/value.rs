//! Typed field values and the decoders that produce them.
//!
//! Each [`DataType`] corresponds to one IPFIX abstract data type (RFC 7011
//! section 6.1, RFC 6313 for the structured list types). A data type knows the
//! byte lengths it accepts and decodes exactly one field occurrence.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use base64::Engine;
use bytes::BufMut;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::buffer::Cursor;
use crate::error::DecodeError;

/// Largest length a field can declare, and the largest a variable-length
/// occurrence can carry.
pub const MAX_FIELD_LENGTH: usize = u16::MAX as usize;

/// Seconds between the NTP epoch (1900-01-01) and the Unix epoch.
pub const NTP_EPOCH_OFFSET: i64 = 2_208_988_800;

/// The microsecond resolution of `dateTimeMicroseconds` leaves the lowest 11
/// bits of the fraction undefined.
pub const MICROSECONDS_FRACTION_MASK: u32 = 0xFFFF_F800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    Unsigned8,
    Unsigned16,
    Unsigned32,
    Unsigned64,
    Signed8,
    Signed16,
    Signed32,
    Signed64,
    Float32,
    Float64,
    Boolean,
    MacAddress,
    OctetArray,
    String,
    DateTimeSeconds,
    DateTimeMilliseconds,
    DateTimeMicroseconds,
    DateTimeNanoseconds,
    Ipv4Address,
    Ipv6Address,
    BasicList,
    SubTemplateList,
    SubTemplateMultiList,
}

impl DataType {
    /// Smallest field length this type can be encoded in.
    pub const fn min_length(self) -> usize {
        match self {
            Self::Unsigned8
            | Self::Unsigned16
            | Self::Unsigned32
            | Self::Unsigned64
            | Self::Signed8
            | Self::Signed16
            | Self::Signed32
            | Self::Signed64
            | Self::Boolean => 1,
            Self::Float32 | Self::Float64 => 4,
            Self::MacAddress => 6,
            Self::DateTimeSeconds | Self::Ipv4Address => 4,
            Self::DateTimeMilliseconds
            | Self::DateTimeMicroseconds
            | Self::DateTimeNanoseconds => 8,
            Self::Ipv6Address => 16,
            Self::OctetArray
            | Self::String
            | Self::BasicList
            | Self::SubTemplateList
            | Self::SubTemplateMultiList => 0,
        }
    }

    /// Largest field length this type can be encoded in.
    pub const fn max_length(self) -> usize {
        match self {
            Self::Unsigned8 | Self::Signed8 | Self::Boolean => 1,
            Self::Unsigned16 | Self::Signed16 => 2,
            Self::Unsigned32 | Self::Signed32 | Self::Float32 => 4,
            Self::Unsigned64 | Self::Signed64 | Self::Float64 => 8,
            Self::MacAddress => 6,
            Self::DateTimeSeconds | Self::Ipv4Address => 4,
            Self::DateTimeMilliseconds
            | Self::DateTimeMicroseconds
            | Self::DateTimeNanoseconds => 8,
            Self::Ipv6Address => 16,
            Self::OctetArray
            | Self::String
            | Self::BasicList
            | Self::SubTemplateList
            | Self::SubTemplateMultiList => MAX_FIELD_LENGTH,
        }
    }

    /// Whether `length` is a legal encoding length for this type.
    pub const fn accepts(self, length: usize) -> bool {
        if length < self.min_length() || length > self.max_length() {
            return false;
        }
        // float64 allows the reduced float32 form and nothing in between.
        !matches!(self, Self::Float64) || length == 4 || length == 8
    }

    /// Decodes one field occurrence of exactly `length` bytes.
    ///
    /// Fails without interpreting any bytes when `length` is not legal for
    /// the type or when fewer than `length` bytes remain.
    pub fn decode(
        self,
        name: &str,
        cursor: &mut Cursor<'_>,
        length: usize,
    ) -> Result<Value, DecodeError> {
        if !self.accepts(length) {
            return Err(DecodeError::InvalidLength {
                name: name.to_owned(),
                length,
                min: self.min_length(),
                max: self.max_length(),
            });
        }
        let mut field = cursor.split(length)?;

        let value = match self {
            Self::Unsigned8 | Self::Unsigned16 | Self::Unsigned32 | Self::Unsigned64 => {
                Value::Unsigned(field.uint(length)?)
            }
            Self::Signed8 | Self::Signed16 | Self::Signed32 | Self::Signed64 => {
                Value::Signed(field.int(length)?)
            }
            Self::Float32 => Value::Float(f64::from(f32::from_bits(field.u32()?))),
            Self::Float64 if length == 4 => Value::Float(f64::from(f32::from_bits(field.u32()?))),
            Self::Float64 => Value::Float(f64::from_bits(field.uint(8)?)),
            Self::Boolean => match field.u8()? {
                1 => Value::Boolean(true),
                2 => Value::Boolean(false),
                value => {
                    return Err(DecodeError::InvalidBoolean {
                        name: name.to_owned(),
                        value,
                    });
                }
            },
            Self::MacAddress => Value::MacAddress(field.array()?),
            Self::OctetArray
            | Self::BasicList
            | Self::SubTemplateList
            | Self::SubTemplateMultiList => Value::Octets(field.take(length)?.to_vec()),
            Self::String => {
                Value::String(String::from_utf8_lossy(field.take(length)?).into_owned())
            }
            Self::DateTimeSeconds => Value::DateTimeSeconds(field.u32()?),
            Self::DateTimeMilliseconds => Value::DateTimeMilliseconds(field.uint(8)?),
            Self::DateTimeMicroseconds => Value::DateTimeMicroseconds {
                seconds: field.u32()?,
                fraction: field.u32()? & MICROSECONDS_FRACTION_MASK,
            },
            Self::DateTimeNanoseconds => Value::DateTimeNanoseconds {
                seconds: field.u32()?,
                fraction: field.u32()?,
            },
            Self::Ipv4Address => Value::Ipv4(Ipv4Addr::from(field.array::<4>()?)),
            Self::Ipv6Address => Value::Ipv6(Ipv6Addr::from(field.array::<16>()?)),
        };

        Ok(value)
    }
}

/// The decoded payload of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Boolean(bool),
    #[serde(serialize_with = "serialize_mac")]
    MacAddress([u8; 6]),
    #[serde(serialize_with = "serialize_octets")]
    Octets(Vec<u8>),
    String(String),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    DateTimeSeconds(u32),
    DateTimeMilliseconds(u64),
    DateTimeMicroseconds { seconds: u32, fraction: u32 },
    DateTimeNanoseconds { seconds: u32, fraction: u32 },
}

impl Value {
    /// Converts date-time payloads to a UTC timestamp.
    ///
    /// Second and millisecond payloads count from the Unix epoch, micro and
    /// nanosecond payloads use the NTP timestamp format.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match *self {
            Self::DateTimeSeconds(seconds) => Utc.timestamp_opt(i64::from(seconds), 0).single(),
            Self::DateTimeMilliseconds(millis) => {
                Utc.timestamp_millis_opt(i64::try_from(millis).ok()?).single()
            }
            Self::DateTimeMicroseconds { seconds, fraction }
            | Self::DateTimeNanoseconds { seconds, fraction } => {
                let nanos = ((u64::from(fraction) * 1_000_000_000) >> 32) as u32;
                Utc.timestamp_opt(i64::from(seconds) - NTP_EPOCH_OFFSET, nanos)
                    .single()
            }
            _ => None,
        }
    }

    /// Writes the value back in its wire form using `length` bytes.
    ///
    /// Integers are written in reduced size when `length` is smaller than
    /// their natural width. Octet and string payloads ignore `length` and
    /// write their bytes without a variable-length prefix.
    pub fn encode<B: BufMut>(&self, length: usize, out: &mut B) {
        match self {
            Self::Unsigned(value) => out.put_uint(*value, length),
            Self::Signed(value) => out.put_int(*value, length),
            Self::Float(value) if length == 4 => out.put_f32(*value as f32),
            Self::Float(value) => out.put_f64(*value),
            Self::Boolean(value) => out.put_u8(if *value { 1 } else { 2 }),
            Self::MacAddress(octets) => out.put_slice(octets),
            Self::Octets(octets) => out.put_slice(octets),
            Self::String(value) => out.put_slice(value.as_bytes()),
            Self::Ipv4(address) => out.put_slice(&address.octets()),
            Self::Ipv6(address) => out.put_slice(&address.octets()),
            Self::DateTimeSeconds(seconds) => out.put_u32(*seconds),
            Self::DateTimeMilliseconds(millis) => out.put_u64(*millis),
            Self::DateTimeMicroseconds { seconds, fraction }
            | Self::DateTimeNanoseconds { seconds, fraction } => {
                out.put_u32(*seconds);
                out.put_u32(*fraction);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned(value) => write!(f, "{value}"),
            Self::Signed(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::MacAddress(octets) => f.write_str(&format_mac(octets)),
            Self::Octets(octets) => {
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(octets))
            }
            Self::String(value) => f.write_str(value),
            Self::Ipv4(address) => write!(f, "{address}"),
            Self::Ipv6(address) => write!(f, "{address}"),
            Self::DateTimeSeconds(_)
            | Self::DateTimeMilliseconds(_)
            | Self::DateTimeMicroseconds { .. }
            | Self::DateTimeNanoseconds { .. } => match self.to_datetime() {
                Some(timestamp) => write!(f, "{}", timestamp.to_rfc3339()),
                None => f.write_str("invalid timestamp"),
            },
        }
    }
}

fn format_mac(octets: &[u8; 6]) -> String {
    octets
        .iter()
        .map(|octet| format!("{octet:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

fn serialize_mac<S: Serializer>(octets: &[u8; 6], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_mac(octets))
}

fn serialize_octets<S: Serializer>(octets: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(octets))
}
