// [libs/infra/ssrf-guard/src/ip_classify.rs]
//! IP range classification (spec S4.4 step 6): every resolved address must
//! be **public**, or the Guard denies the request.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpClassification {
    Public,
    Loopback,
    PrivateRfc1918,
    LinkLocal,
    Multicast,
    Broadcast,
    CarrierGradeNat,
    Documentation,
    Reserved,
    Ipv4MappedPrivate,
    MetadataService,
}

impl IpClassification {
    pub fn is_public(&self) -> bool {
        matches!(self, IpClassification::Public)
    }

    pub fn reason_code(&self) -> &'static str {
        match self {
            IpClassification::Public => "PUBLIC",
            IpClassification::Loopback => "LOOPBACK_IP",
            IpClassification::PrivateRfc1918 => "PRIVATE_IP",
            IpClassification::LinkLocal => "LINK_LOCAL_IP",
            IpClassification::Multicast => "MULTICAST_IP",
            IpClassification::Broadcast => "BROADCAST_IP",
            IpClassification::CarrierGradeNat => "CARRIER_GRADE_NAT_IP",
            IpClassification::Documentation => "DOCUMENTATION_IP",
            IpClassification::Reserved => "RESERVED_IP",
            IpClassification::Ipv4MappedPrivate => "PRIVATE_IP",
            IpClassification::MetadataService => "METADATA_IP",
        }
    }
}

const METADATA_SERVICE_IP: Ipv4Addr = Ipv4Addr::new(169, 254, 169, 254);

pub fn classify_ip(ip: IpAddr) -> IpClassification {
    match ip {
        IpAddr::V4(v4) => classify_ipv4(v4),
        IpAddr::V6(v6) => classify_ipv6(v6),
    }
}

fn classify_ipv4(ip: Ipv4Addr) -> IpClassification {
    if ip == METADATA_SERVICE_IP {
        return IpClassification::MetadataService;
    }
    if ip.is_loopback() {
        return IpClassification::Loopback;
    }
    if ip.is_private() {
        return IpClassification::PrivateRfc1918;
    }
    if ip.is_link_local() {
        return IpClassification::LinkLocal;
    }
    if ip.is_broadcast() {
        return IpClassification::Broadcast;
    }
    if ip.is_multicast() {
        return IpClassification::Multicast;
    }
    if ip.is_documentation() {
        return IpClassification::Documentation;
    }
    // Carrier-grade NAT: 100.64.0.0/10
    let octets = ip.octets();
    if octets[0] == 100 && (octets[1] & 0b1100_0000) == 0b0100_0000 {
        return IpClassification::CarrierGradeNat;
    }
    if ip.is_unspecified() || ip.octets()[0] == 0 {
        return IpClassification::Reserved;
    }
    IpClassification::Public
}

fn classify_ipv6(ip: Ipv6Addr) -> IpClassification {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        let classification = classify_ipv4(mapped);
        return if classification.is_public() { IpClassification::Public } else { IpClassification::Ipv4MappedPrivate };
    }
    if ip.is_loopback() {
        return IpClassification::Loopback;
    }
    if ip.is_unspecified() {
        return IpClassification::Reserved;
    }
    if ip.is_multicast() {
        return IpClassification::Multicast;
    }
    // fc00::/7 unique local addresses
    if (ip.segments()[0] & 0xfe00) == 0xfc00 {
        return IpClassification::PrivateRfc1918;
    }
    // fe80::/10 link-local
    if (ip.segments()[0] & 0xffc0) == 0xfe80 {
        return IpClassification::LinkLocal;
    }
    IpClassification::Public
}
