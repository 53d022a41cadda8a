// Category classifier: raw port / protocol / TCP-flag values → labels → pie-chart buckets.
// Pure lookups over static tables; no state.

use serde::{Deserialize, Serialize};

/// Well-known destination ports and their service names.
const PORT_SERVICES: &[(u16, &str)] = &[
    (20, "FTP-data"),
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (67, "DHCP-Server"),
    (68, "DHCP-Client"),
    (80, "HTTP"),
    (110, "POP3"),
    (123, "NTP"),
    (143, "IMAP"),
    (161, "SNMP"),
    (443, "HTTPS"),
    (465, "SMTPS"),
    (993, "IMAPS"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (8080, "HTTP-Alt"),
    (8443, "HTTPS-Alt"),
];

/// IANA protocol numbers seen on ordinary networks.
const PROTOCOL_NAMES: &[(u8, &str)] = &[
    (0, "HOPOPT"),
    (1, "ICMP"),
    (2, "IGMP"),
    (6, "TCP"),
    (8, "EGP"),
    (9, "IGP"),
    (17, "UDP"),
    (41, "IPv6"),
    (43, "IPv6-Route"),
    (44, "IPv6-Frag"),
    (47, "GRE"),
    (50, "ESP"),
    (51, "AH"),
    (58, "IPv6-ICMP"),
    (88, "EIGRP"),
    (89, "OSPF"),
    (103, "PIM"),
    (112, "VRRP"),
    (115, "L2TP"),
    (132, "SCTP"),
    (136, "UDPLite"),
];

/// Common TCP flag combinations (FIN=0x01 SYN=0x02 RST=0x04 PSH=0x08 ACK=0x10 URG=0x20).
const TCP_FLAG_NAMES: &[(u8, &str)] = &[
    (0x00, "None"),
    (0x01, "FIN"),
    (0x02, "SYN"),
    (0x03, "SYN+FIN"),
    (0x04, "RST"),
    (0x08, "PSH"),
    (0x10, "ACK"),
    (0x11, "FIN+ACK"),
    (0x12, "SYN+ACK"),
    (0x14, "RST+ACK"),
    (0x18, "PSH+ACK"),
    (0x19, "FIN+PSH+ACK"),
    (0x20, "URG"),
    (0x30, "URG+ACK"),
];

pub const WELL_KNOWN_LABEL: &str = "well-known/system";
pub const REGISTERED_LABEL: &str = "registered";
pub const DYNAMIC_LABEL: &str = "dynamic/private";
pub const COMPOSITE_FLAGS_LABEL: &str = "composite flags";

/// Service name for a destination port; unlisted ports fall back to their IANA range.
pub fn port_service_name(port: u16) -> &'static str {
    if let Some((_, name)) = PORT_SERVICES.iter().find(|(p, _)| *p == port) {
        return name;
    }
    match port {
        0..=1023 => WELL_KNOWN_LABEL,
        1024..=49151 => REGISTERED_LABEL,
        _ => DYNAMIC_LABEL,
    }
}

/// Protocol name for an IP protocol number, or `Protocol-<N>` when unlisted.
pub fn protocol_name(protocol: u8) -> String {
    PROTOCOL_NAMES
        .iter()
        .find(|(p, _)| *p == protocol)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("Protocol-{}", protocol))
}

pub fn tcp_flag_name(flags: u8) -> &'static str {
    TCP_FLAG_NAMES
        .iter()
        .find(|(f, _)| *f == flags)
        .map(|(_, name)| *name)
        .unwrap_or(COMPOSITE_FLAGS_LABEL)
}

/// Fixed protocol buckets for the flattened protocol row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolBucket {
    Tcp,
    Udp,
    Icmp,
    Igmp,
    Other,
}

impl ProtocolBucket {
    /// Bucket for a protocol label produced by [`protocol_name`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "TCP" => ProtocolBucket::Tcp,
            "UDP" => ProtocolBucket::Udp,
            "ICMP" => ProtocolBucket::Icmp,
            "IGMP" => ProtocolBucket::Igmp,
            _ => ProtocolBucket::Other,
        }
    }
}

/// Fixed TCP-flag buckets for the flattened flag row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagBucket {
    Syn,
    SynAck,
    Ack,
    PshAck,
    Fin,
    Rst,
    Other,
}

impl FlagBucket {
    /// Bucket for a flag label produced by [`tcp_flag_name`].
    /// FIN-carrying teardown labels share `Fin`; RST and RST+ACK share `Rst`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "SYN" => FlagBucket::Syn,
            "SYN+ACK" => FlagBucket::SynAck,
            "ACK" => FlagBucket::Ack,
            "PSH+ACK" => FlagBucket::PshAck,
            "FIN" | "FIN+ACK" | "FIN+PSH+ACK" => FlagBucket::Fin,
            "RST" | "RST+ACK" => FlagBucket::Rst,
            _ => FlagBucket::Other,
        }
    }
}

/// Fixed service buckets for the flattened destination-port row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceBucket {
    Http,
    Https,
    Ssh,
    Dns,
    Smtp,
    Ftp,
    Mysql,
    Ntp,
    Telnet,
    Rdp,
    /// Ephemeral (dynamic/private) ports.
    Unknown,
    Other,
}

impl ServiceBucket {
    /// Bucket for a service label produced by [`port_service_name`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "HTTP" | "HTTP-Alt" => ServiceBucket::Http,
            "HTTPS" | "HTTPS-Alt" => ServiceBucket::Https,
            "SSH" => ServiceBucket::Ssh,
            "DNS" => ServiceBucket::Dns,
            "SMTP" | "SMTPS" => ServiceBucket::Smtp,
            "FTP" | "FTP-data" => ServiceBucket::Ftp,
            "MySQL" => ServiceBucket::Mysql,
            "NTP" => ServiceBucket::Ntp,
            "Telnet" => ServiceBucket::Telnet,
            "RDP" => ServiceBucket::Rdp,
            DYNAMIC_LABEL => ServiceBucket::Unknown,
            _ => ServiceBucket::Other,
        }
    }

    pub fn from_port(port: u16) -> Self {
        Self::from_label(port_service_name(port))
    }
}
