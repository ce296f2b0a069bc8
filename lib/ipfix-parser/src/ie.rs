//! Information Element registry.
//!
//! Maps `(private enterprise number, element id)` to a name and the
//! [`DataType`] used to decode it. The IANA elements are built in; enterprise
//! elements can be registered on top.

use std::collections::HashMap;
use std::sync::Arc;

use crate::value::DataType;

/// Private enterprise number of the IANA element space.
pub const IANA_ENTERPRISE: u32 = 0;

/// Private enterprise number reserved for reverse elements (RFC 5103).
pub const REVERSE_ENTERPRISE: u32 = 29305;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InformationElement {
    pub id: u16,
    pub enterprise: u32,
    pub name: Arc<str>,
    pub data_type: DataType,
}

impl InformationElement {
    pub fn new(enterprise: u32, id: u16, name: impl Into<Arc<str>>, data_type: DataType) -> Self {
        Self {
            id,
            enterprise,
            name: name.into(),
            data_type,
        }
    }

    /// An element the registry knows nothing about. Its bytes are kept
    /// verbatim so that the rest of the record still lines up.
    pub fn undeclared(enterprise: u32, id: u16) -> Self {
        let name = if enterprise == IANA_ENTERPRISE {
            format!("unknown_{id}")
        } else {
            format!("enterprise_{enterprise}_{id}")
        };
        Self::new(enterprise, id, name, DataType::OctetArray)
    }

    pub const fn min_length(&self) -> usize {
        self.data_type.min_length()
    }

    pub const fn max_length(&self) -> usize {
        self.data_type.max_length()
    }
}

#[derive(Debug, Clone)]
pub struct InformationElementRegistry {
    elements: HashMap<(u32, u16), InformationElement>,
}

impl Default for InformationElementRegistry {
    fn default() -> Self {
        Self::iana()
    }
}

impl InformationElementRegistry {
    /// An empty registry. Every lookup yields an undeclared element.
    pub fn empty() -> Self {
        Self {
            elements: HashMap::new(),
        }
    }

    /// The registry preloaded with the IANA element table.
    pub fn iana() -> Self {
        let mut registry = Self::empty();
        for (id, name, data_type) in IANA_ELEMENTS {
            registry.register(InformationElement::new(IANA_ENTERPRISE, *id, *name, *data_type));
        }
        registry
    }

    /// Adds or replaces an element.
    pub fn register(&mut self, element: InformationElement) {
        self.elements
            .insert((element.enterprise, element.id), element);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, enterprise: u32, id: u16) -> Option<&InformationElement> {
        self.elements.get(&(enterprise, id))
    }

    /// Resolves an element, falling back to reverse and undeclared elements.
    pub fn resolve(&self, enterprise: u32, id: u16) -> InformationElement {
        if let Some(element) = self.get(enterprise, id) {
            return element.clone();
        }
        if enterprise == REVERSE_ENTERPRISE {
            if let Some(forward) = self.get(IANA_ENTERPRISE, id) {
                return InformationElement::new(
                    REVERSE_ENTERPRISE,
                    id,
                    reverse_name(&forward.name),
                    forward.data_type,
                );
            }
        }
        InformationElement::undeclared(enterprise, id)
    }
}

fn reverse_name(forward: &str) -> String {
    let mut chars = forward.chars();
    match chars.next() {
        Some(first) => format!("reverse{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "reverse".to_owned(),
    }
}

use DataType::{
    BasicList, Boolean, DateTimeMicroseconds as DtMicro, DateTimeMilliseconds as DtMilli,
    DateTimeNanoseconds as DtNano, DateTimeSeconds as DtSec, Float64, Ipv4Address as Ipv4,
    Ipv6Address as Ipv6, MacAddress as Mac, OctetArray as Octets, Signed32, String as Str,
    SubTemplateList, SubTemplateMultiList, Unsigned8 as U8, Unsigned16 as U16,
    Unsigned32 as U32, Unsigned64 as U64,
};

/// IANA IPFIX Information Elements,
/// <https://www.iana.org/assignments/ipfix/ipfix.xhtml>.
#[rustfmt::skip]
const IANA_ELEMENTS: &[(u16, &str, DataType)] = &[
    (1, "octetDeltaCount", U64),
    (2, "packetDeltaCount", U64),
    (3, "deltaFlowCount", U64),
    (4, "protocolIdentifier", U8),
    (5, "ipClassOfService", U8),
    (6, "tcpControlBits", U16),
    (7, "sourceTransportPort", U16),
    (8, "sourceIPv4Address", Ipv4),
    (9, "sourceIPv4PrefixLength", U8),
    (10, "ingressInterface", U32),
    (11, "destinationTransportPort", U16),
    (12, "destinationIPv4Address", Ipv4),
    (13, "destinationIPv4PrefixLength", U8),
    (14, "egressInterface", U32),
    (15, "ipNextHopIPv4Address", Ipv4),
    (16, "bgpSourceAsNumber", U32),
    (17, "bgpDestinationAsNumber", U32),
    (18, "bgpNextHopIPv4Address", Ipv4),
    (19, "postMCastPacketDeltaCount", U64),
    (20, "postMCastOctetDeltaCount", U64),
    (21, "flowEndSysUpTime", U32),
    (22, "flowStartSysUpTime", U32),
    (23, "postOctetDeltaCount", U64),
    (24, "postPacketDeltaCount", U64),
    (25, "minimumIpTotalLength", U64),
    (26, "maximumIpTotalLength", U64),
    (27, "sourceIPv6Address", Ipv6),
    (28, "destinationIPv6Address", Ipv6),
    (29, "sourceIPv6PrefixLength", U8),
    (30, "destinationIPv6PrefixLength", U8),
    (31, "flowLabelIPv6", U32),
    (32, "icmpTypeCodeIPv4", U16),
    (33, "igmpType", U8),
    (34, "samplingInterval", U32),
    (35, "samplingAlgorithm", U8),
    (36, "flowActiveTimeout", U16),
    (37, "flowIdleTimeout", U16),
    (38, "engineType", U8),
    (39, "engineId", U8),
    (40, "exportedOctetTotalCount", U64),
    (41, "exportedMessageTotalCount", U64),
    (42, "exportedFlowRecordTotalCount", U64),
    (43, "ipv4RouterSc", Ipv4),
    (44, "sourceIPv4Prefix", Ipv4),
    (45, "destinationIPv4Prefix", Ipv4),
    (46, "mplsTopLabelType", U8),
    (47, "mplsTopLabelIPv4Address", Ipv4),
    (48, "samplerId", U8),
    (49, "samplerMode", U8),
    (50, "samplerRandomInterval", U32),
    (51, "classId", U8),
    (52, "minimumTTL", U8),
    (53, "maximumTTL", U8),
    (54, "fragmentIdentification", U32),
    (55, "postIpClassOfService", U8),
    (56, "sourceMacAddress", Mac),
    (57, "postDestinationMacAddress", Mac),
    (58, "vlanId", U16),
    (59, "postVlanId", U16),
    (60, "ipVersion", U8),
    (61, "flowDirection", U8),
    (62, "ipNextHopIPv6Address", Ipv6),
    (63, "bgpNextHopIPv6Address", Ipv6),
    (64, "ipv6ExtensionHeaders", U32),
    (70, "mplsTopLabelStackSection", Octets),
    (71, "mplsLabelStackSection2", Octets),
    (72, "mplsLabelStackSection3", Octets),
    (73, "mplsLabelStackSection4", Octets),
    (74, "mplsLabelStackSection5", Octets),
    (75, "mplsLabelStackSection6", Octets),
    (76, "mplsLabelStackSection7", Octets),
    (77, "mplsLabelStackSection8", Octets),
    (78, "mplsLabelStackSection9", Octets),
    (79, "mplsLabelStackSection10", Octets),
    (80, "destinationMacAddress", Mac),
    (81, "postSourceMacAddress", Mac),
    (82, "interfaceName", Str),
    (83, "interfaceDescription", Str),
    (84, "samplerName", Str),
    (85, "octetTotalCount", U64),
    (86, "packetTotalCount", U64),
    (87, "flagsAndSamplerId", U32),
    (88, "fragmentOffset", U16),
    (89, "forwardingStatus", U32),
    (90, "mplsVpnRouteDistinguisher", Octets),
    (91, "mplsTopLabelPrefixLength", U8),
    (92, "srcTrafficIndex", U32),
    (93, "dstTrafficIndex", U32),
    (94, "applicationDescription", Str),
    (95, "applicationId", Octets),
    (96, "applicationName", Str),
    (98, "postIpDiffServCodePoint", U8),
    (99, "multicastReplicationFactor", U32),
    (100, "className", Str),
    (101, "classificationEngineId", U8),
    (102, "layer2packetSectionOffset", U16),
    (103, "layer2packetSectionSize", U16),
    (104, "layer2packetSectionData", Octets),
    (128, "bgpNextAdjacentAsNumber", U32),
    (129, "bgpPrevAdjacentAsNumber", U32),
    (130, "exporterIPv4Address", Ipv4),
    (131, "exporterIPv6Address", Ipv6),
    (132, "droppedOctetDeltaCount", U64),
    (133, "droppedPacketDeltaCount", U64),
    (134, "droppedOctetTotalCount", U64),
    (135, "droppedPacketTotalCount", U64),
    (136, "flowEndReason", U8),
    (137, "commonPropertiesId", U64),
    (138, "observationPointId", U64),
    (139, "icmpTypeCodeIPv6", U16),
    (140, "mplsTopLabelIPv6Address", Ipv6),
    (141, "lineCardId", U32),
    (142, "portId", U32),
    (143, "meteringProcessId", U32),
    (144, "exportingProcessId", U32),
    (145, "templateId", U16),
    (146, "wlanChannelId", U8),
    (147, "wlanSSID", Str),
    (148, "flowId", U64),
    (149, "observationDomainId", U32),
    (150, "flowStartSeconds", DtSec),
    (151, "flowEndSeconds", DtSec),
    (152, "flowStartMilliseconds", DtMilli),
    (153, "flowEndMilliseconds", DtMilli),
    (154, "flowStartMicroseconds", DtMicro),
    (155, "flowEndMicroseconds", DtMicro),
    (156, "flowStartNanoseconds", DtNano),
    (157, "flowEndNanoseconds", DtNano),
    (158, "flowStartDeltaMicroseconds", U32),
    (159, "flowEndDeltaMicroseconds", U32),
    (160, "systemInitTimeMilliseconds", DtMilli),
    (161, "flowDurationMilliseconds", U32),
    (162, "flowDurationMicroseconds", U32),
    (163, "observedFlowTotalCount", U64),
    (164, "ignoredPacketTotalCount", U64),
    (165, "ignoredOctetTotalCount", U64),
    (166, "notSentFlowTotalCount", U64),
    (167, "notSentPacketTotalCount", U64),
    (168, "notSentOctetTotalCount", U64),
    (169, "destinationIPv6Prefix", Ipv6),
    (170, "sourceIPv6Prefix", Ipv6),
    (171, "postOctetTotalCount", U64),
    (172, "postPacketTotalCount", U64),
    (173, "flowKeyIndicator", U64),
    (174, "postMCastPacketTotalCount", U64),
    (175, "postMCastOctetTotalCount", U64),
    (176, "icmpTypeIPv4", U8),
    (177, "icmpCodeIPv4", U8),
    (178, "icmpTypeIPv6", U8),
    (179, "icmpCodeIPv6", U8),
    (180, "udpSourcePort", U16),
    (181, "udpDestinationPort", U16),
    (182, "tcpSourcePort", U16),
    (183, "tcpDestinationPort", U16),
    (184, "tcpSequenceNumber", U32),
    (185, "tcpAcknowledgementNumber", U32),
    (186, "tcpWindowSize", U16),
    (187, "tcpUrgentPointer", U16),
    (188, "tcpHeaderLength", U8),
    (189, "ipHeaderLength", U8),
    (190, "totalLengthIPv4", U16),
    (191, "payloadLengthIPv6", U16),
    (192, "ipTTL", U8),
    (193, "nextHeaderIPv6", U8),
    (194, "mplsPayloadLength", U32),
    (195, "ipDiffServCodePoint", U8),
    (196, "ipPrecedence", U8),
    (197, "fragmentFlags", U8),
    (198, "octetDeltaSumOfSquares", U64),
    (199, "octetTotalSumOfSquares", U64),
    (200, "mplsTopLabelTTL", U8),
    (201, "mplsLabelStackLength", U32),
    (202, "mplsLabelStackDepth", U32),
    (203, "mplsTopLabelExp", U8),
    (204, "ipPayloadLength", U32),
    (205, "udpMessageLength", U16),
    (206, "isMulticast", U8),
    (207, "ipv4IHL", U8),
    (208, "ipv4Options", U32),
    (209, "tcpOptions", U64),
    (210, "paddingOctets", Octets),
    (211, "collectorIPv4Address", Ipv4),
    (212, "collectorIPv6Address", Ipv6),
    (213, "exportInterface", U32),
    (214, "exportProtocolVersion", U8),
    (215, "exportTransportProtocol", U8),
    (216, "collectorTransportPort", U16),
    (217, "exporterTransportPort", U16),
    (218, "tcpSynTotalCount", U64),
    (219, "tcpFinTotalCount", U64),
    (220, "tcpRstTotalCount", U64),
    (221, "tcpPshTotalCount", U64),
    (222, "tcpAckTotalCount", U64),
    (223, "tcpUrgTotalCount", U64),
    (224, "ipTotalLength", U64),
    (225, "postNATSourceIPv4Address", Ipv4),
    (226, "postNATDestinationIPv4Address", Ipv4),
    (227, "postNAPTSourceTransportPort", U16),
    (228, "postNAPTDestinationTransportPort", U16),
    (229, "natOriginatingAddressRealm", U8),
    (230, "natEvent", U8),
    (231, "initiatorOctets", U64),
    (232, "responderOctets", U64),
    (233, "firewallEvent", U8),
    (234, "ingressVRFID", U32),
    (235, "egressVRFID", U32),
    (236, "VRFname", Str),
    (237, "postMplsTopLabelExp", U8),
    (238, "tcpWindowScale", U16),
    (239, "biflowDirection", U8),
    (240, "ethernetHeaderLength", U8),
    (241, "ethernetPayloadLength", U16),
    (242, "ethernetTotalLength", U16),
    (243, "dot1qVlanId", U16),
    (244, "dot1qPriority", U8),
    (245, "dot1qCustomerVlanId", U16),
    (246, "dot1qCustomerPriority", U8),
    (247, "metroEvcId", Str),
    (248, "metroEvcType", U8),
    (249, "pseudoWireId", U32),
    (250, "pseudoWireType", U16),
    (251, "pseudoWireControlWord", U32),
    (252, "ingressPhysicalInterface", U32),
    (253, "egressPhysicalInterface", U32),
    (254, "postDot1qVlanId", U16),
    (255, "postDot1qCustomerVlanId", U16),
    (256, "ethernetType", U16),
    (257, "postIpPrecedence", U8),
    (258, "collectionTimeMilliseconds", DtMilli),
    (259, "exportSctpStreamId", U16),
    (260, "maxExportSeconds", DtSec),
    (261, "maxFlowEndSeconds", DtSec),
    (262, "messageMD5Checksum", Octets),
    (263, "messageScope", U8),
    (264, "minExportSeconds", DtSec),
    (265, "minFlowStartSeconds", DtSec),
    (266, "opaqueOctets", Octets),
    (267, "sessionScope", U8),
    (268, "maxFlowEndMicroseconds", DtMicro),
    (269, "maxFlowEndMilliseconds", DtMilli),
    (270, "maxFlowEndNanoseconds", DtNano),
    (271, "minFlowStartMicroseconds", DtMicro),
    (272, "minFlowStartMilliseconds", DtMilli),
    (273, "minFlowStartNanoseconds", DtNano),
    (274, "collectorCertificate", Octets),
    (275, "exporterCertificate", Octets),
    (276, "dataRecordsReliability", Boolean),
    (277, "observationPointType", U8),
    (278, "newConnectionDeltaCount", U32),
    (279, "connectionSumDurationSeconds", U64),
    (280, "connectionTransactionId", U64),
    (281, "postNATSourceIPv6Address", Ipv6),
    (282, "postNATDestinationIPv6Address", Ipv6),
    (283, "natPoolId", U32),
    (284, "natPoolName", Str),
    (285, "anonymizationFlags", U16),
    (286, "anonymizationTechnique", U16),
    (287, "informationElementIndex", U16),
    (288, "p2pTechnology", Str),
    (289, "tunnelTechnology", Str),
    (290, "encryptedTechnology", Str),
    (291, "basicList", BasicList),
    (292, "subTemplateList", SubTemplateList),
    (293, "subTemplateMultiList", SubTemplateMultiList),
    (294, "bgpValidityState", U8),
    (295, "IPSecSPI", U32),
    (296, "greKey", U32),
    (297, "natType", U8),
    (298, "initiatorPackets", U64),
    (299, "responderPackets", U64),
    (300, "observationDomainName", Str),
    (301, "selectionSequenceId", U64),
    (302, "selectorId", U64),
    (303, "informationElementId", U16),
    (304, "selectorAlgorithm", U16),
    (305, "samplingPacketInterval", U32),
    (306, "samplingPacketSpace", U32),
    (307, "samplingTimeInterval", U32),
    (308, "samplingTimeSpace", U32),
    (309, "samplingSize", U32),
    (310, "samplingPopulation", U32),
    (311, "samplingProbability", Float64),
    (312, "dataLinkFrameSize", U16),
    (313, "ipHeaderPacketSection", Octets),
    (314, "ipPayloadPacketSection", Octets),
    (315, "dataLinkFrameSection", Octets),
    (316, "mplsLabelStackSection", Octets),
    (317, "mplsPayloadPacketSection", Octets),
    (318, "selectorIdTotalPktsObserved", U64),
    (319, "selectorIdTotalPktsSelected", U64),
    (320, "absoluteError", Float64),
    (321, "relativeError", Float64),
    (322, "observationTimeSeconds", DtSec),
    (323, "observationTimeMilliseconds", DtMilli),
    (324, "observationTimeMicroseconds", DtMicro),
    (325, "observationTimeNanoseconds", DtNano),
    (326, "digestHashValue", U64),
    (327, "hashIPPayloadOffset", U64),
    (328, "hashIPPayloadSize", U64),
    (329, "hashOutputRangeMin", U64),
    (330, "hashOutputRangeMax", U64),
    (331, "hashSelectedRangeMin", U64),
    (332, "hashSelectedRangeMax", U64),
    (333, "hashDigestOutput", Boolean),
    (334, "hashInitialiserValue", U64),
    (335, "selectorName", Str),
    (336, "upperCILimit", Float64),
    (337, "lowerCILimit", Float64),
    (338, "confidenceLevel", Float64),
    (339, "informationElementDataType", U8),
    (340, "informationElementDescription", Str),
    (341, "informationElementName", Str),
    (342, "informationElementRangeBegin", U64),
    (343, "informationElementRangeEnd", U64),
    (344, "informationElementSemantics", U8),
    (345, "informationElementUnits", U16),
    (346, "privateEnterpriseNumber", U32),
    (347, "virtualStationInterfaceId", Octets),
    (348, "virtualStationInterfaceName", Str),
    (349, "virtualStationUUID", Octets),
    (350, "virtualStationName", Str),
    (351, "layer2SegmentId", U64),
    (352, "layer2OctetDeltaCount", U64),
    (353, "layer2OctetTotalCount", U64),
    (354, "ingressUnicastPacketTotalCount", U64),
    (355, "ingressMulticastPacketTotalCount", U64),
    (356, "ingressBroadcastPacketTotalCount", U64),
    (357, "egressUnicastPacketTotalCount", U64),
    (358, "egressBroadcastPacketTotalCount", U64),
    (359, "monitoringIntervalStartMilliSeconds", DtMilli),
    (360, "monitoringIntervalEndMilliSeconds", DtMilli),
    (361, "portRangeStart", U16),
    (362, "portRangeEnd", U16),
    (363, "portRangeStepSize", U16),
    (364, "portRangeNumPorts", U16),
    (365, "staMacAddress", Mac),
    (366, "staIPv4Address", Ipv4),
    (367, "wtpMacAddress", Mac),
    (368, "ingressInterfaceType", U32),
    (369, "egressInterfaceType", U32),
    (370, "rtpSequenceNumber", U16),
    (371, "userName", Str),
    (372, "applicationCategoryName", Str),
    (373, "applicationSubCategoryName", Str),
    (374, "applicationGroupName", Str),
    (375, "originalFlowsPresent", U64),
    (376, "originalFlowsInitiated", U64),
    (377, "originalFlowsCompleted", U64),
    (378, "distinctCountOfSourceIPAddress", U64),
    (379, "distinctCountOfDestinationIPAddress", U64),
    (380, "distinctCountOfSourceIPv4Address", U32),
    (381, "distinctCountOfDestinationIPv4Address", U32),
    (382, "distinctCountOfSourceIPv6Address", U64),
    (383, "distinctCountOfDestinationIPv6Address", U64),
    (384, "valueDistributionMethod", U8),
    (385, "rfc3550JitterMilliseconds", U32),
    (386, "rfc3550JitterMicroseconds", U32),
    (387, "rfc3550JitterNanoseconds", U32),
    (388, "dot1qDEI", Boolean),
    (389, "dot1qCustomerDEI", Boolean),
    (390, "flowSelectorAlgorithm", U16),
    (391, "flowSelectedOctetDeltaCount", U64),
    (392, "flowSelectedPacketDeltaCount", U64),
    (393, "flowSelectedFlowDeltaCount", U64),
    (394, "selectorIDTotalFlowsObserved", U64),
    (395, "selectorIDTotalFlowsSelected", U64),
    (396, "samplingFlowInterval", U64),
    (397, "samplingFlowSpacing", U64),
    (398, "flowSamplingTimeInterval", U64),
    (399, "flowSamplingTimeSpacing", U64),
    (400, "hashFlowDomain", U16),
    (401, "transportOctetDeltaCount", U64),
    (402, "transportPacketDeltaCount", U64),
    (403, "originalExporterIPv4Address", Ipv4),
    (404, "originalExporterIPv6Address", Ipv6),
    (405, "originalObservationDomainId", U32),
    (406, "intermediateProcessId", U32),
    (407, "ignoredDataRecordTotalCount", U64),
    (408, "dataLinkFrameType", U16),
    (409, "sectionOffset", U16),
    (410, "sectionExportedOctets", U16),
    (411, "dot1qServiceInstanceTag", Octets),
    (412, "dot1qServiceInstanceId", U32),
    (413, "dot1qServiceInstancePriority", U8),
    (414, "dot1qCustomerSourceMacAddress", Mac),
    (415, "dot1qCustomerDestinationMacAddress", Mac),
    (417, "postLayer2OctetDeltaCount", U64),
    (418, "postMCastLayer2OctetDeltaCount", U64),
    (420, "postLayer2OctetTotalCount", U64),
    (421, "postMCastLayer2OctetTotalCount", U64),
    (422, "minimumLayer2TotalLength", U64),
    (423, "maximumLayer2TotalLength", U64),
    (424, "droppedLayer2OctetDeltaCount", U64),
    (425, "droppedLayer2OctetTotalCount", U64),
    (426, "ignoredLayer2OctetTotalCount", U64),
    (427, "notSentLayer2OctetTotalCount", U64),
    (428, "layer2OctetDeltaSumOfSquares", U64),
    (429, "layer2OctetTotalSumOfSquares", U64),
    (430, "layer2FrameDeltaCount", U64),
    (431, "layer2FrameTotalCount", U64),
    (432, "pseudoWireDestinationIPv4Address", Ipv4),
    (433, "ignoredLayer2FrameTotalCount", U64),
    (434, "mibObjectValueInteger", Signed32),
    (435, "mibObjectValueOctetString", Octets),
    (436, "mibObjectValueOID", Octets),
    (437, "mibObjectValueBits", Octets),
    (438, "mibObjectValueIPAddress", Ipv4),
    (439, "mibObjectValueCounter", U64),
    (440, "mibObjectValueGauge", U32),
    (441, "mibObjectValueTimeTicks", U32),
    (442, "mibObjectValueUnsigned", U32),
    (443, "mibObjectValueTable", SubTemplateList),
    (444, "mibObjectValueRow", SubTemplateList),
    (445, "mibObjectIdentifier", Octets),
    (446, "mibSubIdentifier", U32),
    (447, "mibIndexIndicator", U64),
    (448, "mibCaptureTimeSemantics", U8),
    (449, "mibContextEngineID", Octets),
    (450, "mibContextName", Str),
    (451, "mibObjectName", Str),
    (452, "mibObjectDescription", Str),
    (453, "mibObjectSyntax", Str),
    (454, "mibModuleName", Str),
    (455, "mobileIMSI", Str),
    (456, "mobileMSISDN", Str),
    (457, "httpStatusCode", U16),
    (458, "sourceTransportPortsLimit", U16),
    (459, "httpRequestMethod", Str),
    (460, "httpRequestHost", Str),
    (461, "httpRequestTarget", Str),
    (462, "httpMessageVersion", Str),
    (463, "natInstanceID", U32),
    (464, "internalAddressRealm", Octets),
    (465, "externalAddressRealm", Octets),
    (466, "natQuotaExceededEvent", U32),
    (467, "natThresholdEvent", U32),
    (468, "httpUserAgent", Str),
    (469, "httpContentType", Str),
    (470, "httpReasonPhrase", Str),
    (471, "maxSessionEntries", U32),
    (472, "maxBIBEntries", U32),
    (473, "maxEntriesPerUser", U32),
    (474, "maxSubscribers", U32),
    (475, "maxFragmentsPendingReassembly", U32),
    (476, "addressPoolHighThreshold", U32),
    (477, "addressPoolLowThreshold", U32),
    (478, "addressPortMappingHighThreshold", U32),
    (479, "addressPortMappingLowThreshold", U32),
    (480, "addressPortMappingPerUserHighThreshold", U32),
    (481, "globalAddressMappingHighThreshold", U32),
    (482, "vpnIdentifier", Octets),
    (483, "bgpCommunity", U32),
    (484, "bgpSourceCommunityList", BasicList),
    (485, "bgpDestinationCommunityList", BasicList),
    (486, "bgpExtendedCommunity", Octets),
    (487, "bgpSourceExtendedCommunityList", BasicList),
    (488, "bgpDestinationExtendedCommunityList", BasicList),
    (489, "bgpLargeCommunity", Octets),
    (490, "bgpSourceLargeCommunityList", BasicList),
    (491, "bgpDestinationLargeCommunityList", BasicList),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_iana_elements() {
        let registry = InformationElementRegistry::iana();
        let element = registry.resolve(IANA_ENTERPRISE, 1);
        assert_eq!(&*element.name, "octetDeltaCount");
        assert_eq!(element.data_type, DataType::Unsigned64);
        assert_eq!((element.min_length(), element.max_length()), (1, 8));

        let element = registry.resolve(IANA_ENTERPRISE, 154);
        assert_eq!(&*element.name, "flowStartMicroseconds");
        assert_eq!((element.min_length(), element.max_length()), (8, 8));
    }

    #[test]
    fn element_ids_are_unique() {
        let registry = InformationElementRegistry::iana();
        assert_eq!(registry.len(), IANA_ELEMENTS.len());
    }

    #[test]
    fn reverse_elements_borrow_forward_decoder() {
        let registry = InformationElementRegistry::iana();
        let element = registry.resolve(REVERSE_ENTERPRISE, 2);
        assert_eq!(&*element.name, "reversePacketDeltaCount");
        assert_eq!(element.data_type, DataType::Unsigned64);
        assert_eq!(element.enterprise, REVERSE_ENTERPRISE);
    }

    #[test]
    fn unknown_elements_are_kept_as_octets() {
        let registry = InformationElementRegistry::iana();

        let element = registry.resolve(9, 12235);
        assert_eq!(&*element.name, "enterprise_9_12235");
        assert_eq!(element.data_type, DataType::OctetArray);

        let element = registry.resolve(IANA_ENTERPRISE, 32000);
        assert_eq!(&*element.name, "unknown_32000");
    }

    #[test]
    fn registered_enterprise_elements_take_precedence() {
        let mut registry = InformationElementRegistry::iana();
        registry.register(InformationElement::new(
            2636,
            137,
            "juniperCommonProperties",
            DataType::Unsigned64,
        ));

        let element = registry.resolve(2636, 137);
        assert_eq!(&*element.name, "juniperCommonProperties");
        assert_eq!(element.data_type, DataType::Unsigned64);
        assert_eq!(&*registry.resolve(IANA_ENTERPRISE, 137).name, "commonPropertiesId");
    }
}
