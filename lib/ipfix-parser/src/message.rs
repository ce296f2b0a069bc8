use std::net::IpAddr;

use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::template::{Template, TemplateKind};
use crate::value::Value;

/// One decoded Data Record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub exporter: IpAddr,
    pub observation_domain_id: u32,
    pub export_time: DateTime<Utc>,
    pub sequence_number: u32,
    pub template_id: u16,
    pub kind: TemplateKind,
    /// Names of the scope fields of an Options Template record.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    /// Field values keyed by element name, in template order.
    pub fields: IndexMap<String, Value>,
}

impl Message {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Message fields common to every record of one packet.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MessageContext {
    pub exporter: IpAddr,
    pub observation_domain_id: u32,
    pub export_time: u32,
    pub sequence_number: u32,
}

impl MessageContext {
    pub fn message(&self, template: &Template, values: Vec<Value>) -> Message {
        let mut fields = IndexMap::with_capacity(values.len());
        for (field, value) in template.fields.iter().zip(values) {
            insert_unique(&mut fields, field.name(), value);
        }
        let scopes = fields
            .keys()
            .take(template.scope_field_count)
            .cloned()
            .collect();

        Message {
            exporter: self.exporter,
            observation_domain_id: self.observation_domain_id,
            export_time: Utc
                .timestamp_opt(i64::from(self.export_time), 0)
                .single()
                .unwrap_or_default(),
            sequence_number: self.sequence_number,
            template_id: template.id,
            kind: template.kind,
            scopes,
            fields,
        }
    }
}

/// Templates may repeat an element. Later occurrences get a `_<n>` suffix so
/// none of them is lost.
fn insert_unique(fields: &mut IndexMap<String, Value>, name: &str, value: Value) {
    if !fields.contains_key(name) {
        fields.insert(name.to_owned(), value);
        return;
    }
    let mut occurrence = 2;
    loop {
        let candidate = format!("{name}_{occurrence}");
        if !fields.contains_key(&candidate) {
            fields.insert(candidate, value);
            return;
        }
        occurrence += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::ie::InformationElementRegistry;
    use crate::template::FieldSpecifier;

    fn context() -> MessageContext {
        MessageContext {
            exporter: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
            observation_domain_id: 7,
            export_time: 1_600_000_000,
            sequence_number: 42,
        }
    }

    #[test]
    fn repeated_elements_are_suffixed() {
        let elements = InformationElementRegistry::iana();
        let template = Template::data(
            300,
            vec![
                FieldSpecifier::new(elements.resolve(0, 10), 4),
                FieldSpecifier::new(elements.resolve(0, 10), 4),
            ],
        );
        let message = context().message(&template, vec![Value::Unsigned(1), Value::Unsigned(2)]);

        assert_eq!(
            message.fields.keys().collect::<Vec<_>>(),
            ["ingressInterface", "ingressInterface_2"]
        );
        assert_eq!(message.export_time.timestamp(), 1_600_000_000);
    }

    #[test]
    fn serializes_options_records_with_scopes() {
        let elements = InformationElementRegistry::iana();
        let template = Template::options(
            400,
            1,
            vec![
                FieldSpecifier::new(elements.resolve(0, 149), 4),
                FieldSpecifier::new(elements.resolve(0, 41), 8),
            ],
        );
        let message = context().message(&template, vec![Value::Unsigned(7), Value::Unsigned(9)]);

        let json = serde_json::to_value(&message).expect("serializable");
        similar_asserts::assert_eq!(
            json,
            serde_json::json!({
                "exporter": "192.0.2.1",
                "observation_domain_id": 7,
                "export_time": "2020-09-13T12:26:40Z",
                "sequence_number": 42,
                "template_id": 400,
                "kind": "options",
                "scopes": ["observationDomainId"],
                "fields": {
                    "observationDomainId": 7,
                    "exportedMessageTotalCount": 9,
                },
            })
        );
    }
}
