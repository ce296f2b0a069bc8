//! Templates and the Template Records that define them.

use serde::Serialize;
use snafu::ResultExt;

use crate::buffer::Cursor;
use crate::error::{
    DecodeError, EmptyRecordSnafu, InvalidScopeCountSnafu, ReservedTemplateIdSnafu, TemplateError,
    TruncatedSnafu,
};
use crate::ie::{IANA_ENTERPRISE, InformationElement, InformationElementRegistry};
use crate::value::Value;

/// Field length announcing that each occurrence carries its own length prefix.
pub const VARIABLE_LENGTH: u16 = u16::MAX;

/// Set id of a Template Set.
pub const TEMPLATE_SET_ID: u16 = 2;

/// Set id of an Options Template Set.
pub const OPTIONS_TEMPLATE_SET_ID: u16 = 3;

/// Lowest set id (and template id) usable for data.
pub const MIN_DATA_SET_ID: u16 = 256;

const ENTERPRISE_BIT: u16 = 0x8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Data,
    Options,
}

impl TemplateKind {
    /// The set id that carries templates of this kind.
    pub const fn set_id(self) -> u16 {
        match self {
            Self::Data => TEMPLATE_SET_ID,
            Self::Options => OPTIONS_TEMPLATE_SET_ID,
        }
    }
}

/// One field of a template: which element it holds and how many bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpecifier {
    pub element: InformationElement,
    pub length: u16,
}

impl FieldSpecifier {
    pub const fn new(element: InformationElement, length: u16) -> Self {
        Self { element, length }
    }

    pub const fn is_variable_length(&self) -> bool {
        self.length == VARIABLE_LENGTH
    }

    pub fn name(&self) -> &str {
        &self.element.name
    }

    /// Fewest bytes one occurrence of this field can take in a record.
    pub const fn min_wire_length(&self) -> usize {
        if self.is_variable_length() {
            1
        } else {
            self.length as usize
        }
    }

    /// Decodes one occurrence of the field, reading the length prefix first
    /// when the field is variable length.
    pub fn decode(&self, cursor: &mut Cursor<'_>) -> Result<Value, DecodeError> {
        let length = if self.is_variable_length() {
            cursor.variable_length()?
        } else {
            usize::from(self.length)
        };
        self.element
            .data_type
            .decode(&self.element.name, cursor, length)
    }

    fn parse(
        cursor: &mut Cursor<'_>,
        elements: &InformationElementRegistry,
    ) -> Result<Self, DecodeError> {
        let raw_id = cursor.u16()?;
        let length = cursor.u16()?;
        let (enterprise, id) = if raw_id & ENTERPRISE_BIT != 0 {
            (cursor.u32()?, raw_id & !ENTERPRISE_BIT)
        } else {
            (IANA_ENTERPRISE, raw_id)
        };
        Ok(Self::new(elements.resolve(enterprise, id), length))
    }
}

/// The layout of the Data Records in every Data Set carrying its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: u16,
    pub kind: TemplateKind,
    /// Number of leading fields that are scope fields. Zero for data
    /// templates.
    pub scope_field_count: usize,
    pub fields: Vec<FieldSpecifier>,
}

impl Template {
    pub fn data(id: u16, fields: Vec<FieldSpecifier>) -> Self {
        Self {
            id,
            kind: TemplateKind::Data,
            scope_field_count: 0,
            fields,
        }
    }

    pub fn options(id: u16, scope_field_count: usize, fields: Vec<FieldSpecifier>) -> Self {
        Self {
            id,
            kind: TemplateKind::Options,
            scope_field_count,
            fields,
        }
    }

    /// Size of the smallest record this template can describe. Fewer bytes
    /// than this at the end of a Data Set are padding.
    pub fn min_record_length(&self) -> usize {
        self.fields.iter().map(FieldSpecifier::min_wire_length).sum()
    }

    pub fn scope_fields(&self) -> &[FieldSpecifier] {
        &self.fields[..self.scope_field_count.min(self.fields.len())]
    }
}

/// One record of a Template Set or Options Template Set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateRecord {
    Definition(Template),
    /// Removes the template with this id. When the id equals the set id,
    /// all templates of that kind are removed.
    Withdrawal { template_id: u16 },
}

impl TemplateRecord {
    /// Smallest record a template set can hold: a withdrawal.
    pub const MIN_LENGTH: usize = 4;

    pub fn parse(
        cursor: &mut Cursor<'_>,
        kind: TemplateKind,
        elements: &InformationElementRegistry,
    ) -> Result<Self, TemplateError> {
        let template_id = cursor.u16().context(TruncatedSnafu)?;
        let field_count = cursor.u16().context(TruncatedSnafu)?;

        if field_count == 0 {
            if template_id != kind.set_id() && template_id < MIN_DATA_SET_ID {
                return ReservedTemplateIdSnafu { template_id }.fail();
            }
            return Ok(Self::Withdrawal { template_id });
        }
        if template_id < MIN_DATA_SET_ID {
            return ReservedTemplateIdSnafu { template_id }.fail();
        }

        let scope_field_count = match kind {
            TemplateKind::Data => 0,
            TemplateKind::Options => {
                let scope_field_count = cursor.u16().context(TruncatedSnafu)?;
                if scope_field_count == 0 || scope_field_count > field_count {
                    return InvalidScopeCountSnafu {
                        template_id,
                        scope_field_count,
                        field_count,
                    }
                    .fail();
                }
                scope_field_count
            }
        };

        let fields = (0..field_count)
            .map(|_| FieldSpecifier::parse(cursor, elements))
            .collect::<Result<Vec<_>, _>>()
            .context(TruncatedSnafu)?;

        let template = Template {
            id: template_id,
            kind,
            scope_field_count: usize::from(scope_field_count),
            fields,
        };
        if template.min_record_length() == 0 {
            return EmptyRecordSnafu { template_id }.fail();
        }
        Ok(Self::Definition(template))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ie::REVERSE_ENTERPRISE;
    use crate::value::DataType;

    fn parse(bytes: &[u8], kind: TemplateKind) -> Result<TemplateRecord, TemplateError> {
        TemplateRecord::parse(
            &mut Cursor::new(bytes),
            kind,
            &InformationElementRegistry::iana(),
        )
    }

    #[test]
    fn parses_data_template() {
        let bytes = [
            0x01, 0x00, 0x00, 0x02, // id 256, 2 fields
            0x00, 0x01, 0x00, 0x04, // octetDeltaCount, 4 bytes
            0x00, 0x0A, 0x00, 0x02, // ingressInterface, 2 bytes
        ];
        let Ok(TemplateRecord::Definition(template)) = parse(&bytes, TemplateKind::Data) else {
            panic!("expected a template definition");
        };
        assert_eq!(template.id, 256);
        assert_eq!(template.kind, TemplateKind::Data);
        assert_eq!(
            template.fields.iter().map(FieldSpecifier::name).collect::<Vec<_>>(),
            ["octetDeltaCount", "ingressInterface"]
        );
        assert_eq!(template.min_record_length(), 6);
    }

    #[test]
    fn parses_enterprise_and_variable_length_fields() {
        let bytes = [
            0x01, 0x01, 0x00, 0x02, // id 257, 2 fields
            0x80, 0x02, 0x00, 0x08, 0x00, 0x00, 0x72, 0x79, // reverse packetDeltaCount
            0x00, 0x52, 0xFF, 0xFF, // interfaceName, variable length
        ];
        let Ok(TemplateRecord::Definition(template)) = parse(&bytes, TemplateKind::Data) else {
            panic!("expected a template definition");
        };
        let reverse = &template.fields[0];
        assert_eq!(reverse.element.enterprise, REVERSE_ENTERPRISE);
        assert_eq!(reverse.element.id, 2);
        assert_eq!(reverse.name(), "reversePacketDeltaCount");
        assert!(template.fields[1].is_variable_length());
        assert_eq!(template.fields[1].element.data_type, DataType::String);
        assert_eq!(template.min_record_length(), 9);
    }

    #[test]
    fn parses_options_template_scope() {
        let bytes = [
            0x01, 0x02, 0x00, 0x02, 0x00, 0x01, // id 258, 2 fields, 1 scope
            0x00, 0x95, 0x00, 0x04, // observationDomainId
            0x00, 0x29, 0x00, 0x08, // exportedMessageTotalCount
        ];
        let Ok(TemplateRecord::Definition(template)) = parse(&bytes, TemplateKind::Options) else {
            panic!("expected a template definition");
        };
        assert_eq!(template.kind, TemplateKind::Options);
        assert_eq!(template.scope_field_count, 1);
        assert_eq!(template.scope_fields()[0].name(), "observationDomainId");
    }

    #[test]
    fn zero_field_count_is_a_withdrawal() {
        assert_eq!(
            parse(&[0x01, 0x00, 0x00, 0x00], TemplateKind::Data),
            Ok(TemplateRecord::Withdrawal { template_id: 256 })
        );
        assert_eq!(
            parse(&[0x00, 0x03, 0x00, 0x00], TemplateKind::Options),
            Ok(TemplateRecord::Withdrawal { template_id: 3 })
        );
    }

    #[test]
    fn rejects_reserved_template_ids() {
        assert_eq!(
            parse(&[0x00, 0x10, 0x00, 0x01, 0x00, 0x01, 0x00, 0x04], TemplateKind::Data),
            Err(TemplateError::ReservedTemplateId { template_id: 16 })
        );
        assert_eq!(
            parse(&[0x00, 0x03, 0x00, 0x00], TemplateKind::Data),
            Err(TemplateError::ReservedTemplateId { template_id: 3 })
        );
    }

    #[test]
    fn rejects_invalid_scope_count() {
        let bytes = [0x01, 0x02, 0x00, 0x01, 0x00, 0x02, 0x00, 0x95, 0x00, 0x04];
        assert_eq!(
            parse(&bytes, TemplateKind::Options),
            Err(TemplateError::InvalidScopeCount {
                template_id: 258,
                scope_field_count: 2,
                field_count: 1,
            })
        );
    }

    #[test]
    fn truncated_field_list() {
        let bytes = [0x01, 0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x04, 0x00];
        assert!(matches!(
            parse(&bytes, TemplateKind::Data),
            Err(TemplateError::Truncated { .. })
        ));
    }

    #[test]
    fn rejects_templates_without_record_bytes() {
        let bytes = [0x01, 0x00, 0x00, 0x01, 0x00, 0xD2, 0x00, 0x00];
        assert_eq!(
            parse(&bytes, TemplateKind::Data),
            Err(TemplateError::EmptyRecord { template_id: 256 })
        );
    }
}
