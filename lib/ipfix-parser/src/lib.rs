//! Decoding of IPFIX messages (RFC 7011).
//!
//! This crate is pure: it turns datagram payloads plus per-exporter template
//! state into [`Message`]s and performs no I/O.

#![deny(missing_debug_implementations)]

pub mod buffer;
pub mod error;
pub mod ie;
pub mod message;
pub mod packet;
pub mod session;
pub mod template;
#[cfg(any(test, feature = "test"))]
pub mod test_util;
pub mod value;

pub use error::{DecodeError, PacketError, SetIssue, TemplateError};
pub use ie::{InformationElement, InformationElementRegistry};
pub use message::Message;
pub use packet::{DecodedPacket, Header, PacketDecoder, RawSet, decode_set, split_sets};
pub use session::{Session, SessionHandle, SessionKey, SessionRegistry};
pub use template::{FieldSpecifier, Template, TemplateKind};
pub use value::{DataType, Value};

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv6Addr};
    use std::sync::Arc;

    use super::*;
    use crate::test_util::{Field, PacketBuilder};

    #[test]
    fn decodes_records_with_a_custom_element_table() {
        let mut elements = InformationElementRegistry::empty();
        elements.register(InformationElement::new(0, 1, "octets", DataType::Unsigned32));
        elements.register(InformationElement::new(0, 10, "ifIndex", DataType::Unsigned16));

        let sessions = Arc::new(SessionRegistry::new());
        let decoder = PacketDecoder::with_elements(Arc::clone(&sessions), Arc::new(elements));
        let exporter = IpAddr::V6(Ipv6Addr::LOCALHOST);

        let packet = PacketBuilder::new()
            .template(256, &[Field::iana(1, 4), Field::iana(10, 2)])
            .data(256, &[&[0x00, 0x00, 0x01, 0x90, 0x00, 0x05]])
            .build();
        let decoded = decoder.decode(exporter, &packet).expect("valid packet");

        let template = sessions
            .resolve_template(&SessionKey::new(exporter, 0), 256)
            .expect("template installed");
        assert_eq!(template.fields.len(), 2);
        assert_eq!(decoded.messages.len(), 1);
        assert_eq!(
            serde_json::to_string(&decoded.messages[0].fields).expect("serializable"),
            r#"{"octets":400,"ifIndex":5}"#
        );
    }
}
