//! Helpers for assembling IPFIX messages in tests.

use bytes::BufMut;

use crate::packet::{HEADER_LENGTH, IPFIX_VERSION, SET_HEADER_LENGTH};
use crate::template::{OPTIONS_TEMPLATE_SET_ID, TEMPLATE_SET_ID, VARIABLE_LENGTH};

/// A field specifier as it appears in a Template Record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub id: u16,
    pub enterprise: Option<u32>,
    pub length: u16,
}

impl Field {
    pub const fn iana(id: u16, length: u16) -> Self {
        Self {
            id,
            enterprise: None,
            length,
        }
    }

    pub const fn enterprise(enterprise: u32, id: u16, length: u16) -> Self {
        Self {
            id,
            enterprise: Some(enterprise),
            length,
        }
    }

    pub const fn variable(id: u16) -> Self {
        Self::iana(id, VARIABLE_LENGTH)
    }

    fn write(&self, out: &mut Vec<u8>) {
        match self.enterprise {
            Some(enterprise) => {
                out.put_u16(self.id | 0x8000);
                out.put_u16(self.length);
                out.put_u32(enterprise);
            }
            None => {
                out.put_u16(self.id);
                out.put_u16(self.length);
            }
        }
    }
}

/// Encodes one variable-length field occurrence, prefix included.
pub fn variable(value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len() + 3);
    if value.len() < 255 {
        out.put_u8(value.len() as u8);
    } else {
        out.put_u8(255);
        out.put_u16(value.len() as u16);
    }
    out.put_slice(value);
    out
}

/// Builds an IPFIX message set by set, filling in every length field.
#[derive(Debug, Clone, Default)]
pub struct PacketBuilder {
    version: Option<u16>,
    export_time: u32,
    sequence_number: u32,
    observation_domain_id: u32,
    sets: Vec<Vec<u8>>,
}

impl PacketBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: u16) -> Self {
        self.version = Some(version);
        self
    }

    pub fn export_time(mut self, export_time: u32) -> Self {
        self.export_time = export_time;
        self
    }

    pub fn sequence_number(mut self, sequence_number: u32) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    pub fn observation_domain(mut self, observation_domain_id: u32) -> Self {
        self.observation_domain_id = observation_domain_id;
        self
    }

    /// Appends a Template Set holding one template.
    pub fn template(self, id: u16, fields: &[Field]) -> Self {
        let mut body = Vec::new();
        body.put_u16(id);
        body.put_u16(fields.len() as u16);
        for field in fields {
            field.write(&mut body);
        }
        self.set(TEMPLATE_SET_ID, &body)
    }

    /// Appends an Options Template Set holding one template.
    pub fn options_template(self, id: u16, scope_field_count: u16, fields: &[Field]) -> Self {
        let mut body = Vec::new();
        body.put_u16(id);
        body.put_u16(fields.len() as u16);
        body.put_u16(scope_field_count);
        for field in fields {
            field.write(&mut body);
        }
        self.set(OPTIONS_TEMPLATE_SET_ID, &body)
    }

    /// Appends a withdrawal of `template_id` inside a set with `set_id`.
    pub fn withdraw(self, set_id: u16, template_id: u16) -> Self {
        let mut body = Vec::new();
        body.put_u16(template_id);
        body.put_u16(0);
        self.set(set_id, &body)
    }

    /// Appends a Data Set whose body is the concatenated records.
    pub fn data(self, set_id: u16, records: &[&[u8]]) -> Self {
        let body = records.concat();
        self.set(set_id, &body)
    }

    /// Appends a set with an arbitrary body.
    pub fn set(mut self, set_id: u16, body: &[u8]) -> Self {
        let mut set = Vec::with_capacity(SET_HEADER_LENGTH + body.len());
        set.put_u16(set_id);
        set.put_u16((SET_HEADER_LENGTH + body.len()) as u16);
        set.put_slice(body);
        self.sets.push(set);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let length = HEADER_LENGTH + self.sets.iter().map(Vec::len).sum::<usize>();
        let mut out = Vec::with_capacity(length);
        out.put_u16(self.version.unwrap_or(IPFIX_VERSION));
        out.put_u16(length as u16);
        out.put_u32(self.export_time);
        out.put_u32(self.sequence_number);
        out.put_u32(self.observation_domain_id);
        for set in &self.sets {
            out.put_slice(set);
        }
        out
    }
}
