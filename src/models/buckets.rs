// Flattened pie-chart rows: one column per fixed bucket plus the total.

use serde::Serialize;

use crate::classify::{FlagBucket, ProtocolBucket, ServiceBucket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProtocolBucketRow {
    pub tcp_count: u64,
    pub udp_count: u64,
    pub icmp_count: u64,
    pub igmp_count: u64,
    pub other_count: u64,
    pub total_packet_count: u64,
}

impl ProtocolBucketRow {
    pub fn add(&mut self, bucket: ProtocolBucket, count: u64) {
        let column = match bucket {
            ProtocolBucket::Tcp => &mut self.tcp_count,
            ProtocolBucket::Udp => &mut self.udp_count,
            ProtocolBucket::Icmp => &mut self.icmp_count,
            ProtocolBucket::Igmp => &mut self.igmp_count,
            ProtocolBucket::Other => &mut self.other_count,
        };
        *column += count;
        self.total_packet_count += count;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FlagBucketRow {
    pub syn_count: u64,
    pub syn_ack_count: u64,
    pub ack_count: u64,
    pub psh_ack_count: u64,
    pub fin_count: u64,
    pub rst_count: u64,
    pub other_count: u64,
    pub total_packet_count: u64,
}

impl FlagBucketRow {
    pub fn add(&mut self, bucket: FlagBucket, count: u64) {
        let column = match bucket {
            FlagBucket::Syn => &mut self.syn_count,
            FlagBucket::SynAck => &mut self.syn_ack_count,
            FlagBucket::Ack => &mut self.ack_count,
            FlagBucket::PshAck => &mut self.psh_ack_count,
            FlagBucket::Fin => &mut self.fin_count,
            FlagBucket::Rst => &mut self.rst_count,
            FlagBucket::Other => &mut self.other_count,
        };
        *column += count;
        self.total_packet_count += count;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ServiceBucketRow {
    pub http_count: u64,
    pub https_count: u64,
    pub ssh_count: u64,
    pub dns_count: u64,
    pub smtp_count: u64,
    pub ftp_count: u64,
    pub mysql_count: u64,
    pub ntp_count: u64,
    pub telnet_count: u64,
    pub rdp_count: u64,
    pub unknown_count: u64,
    pub other_count: u64,
    pub total_packet_count: u64,
}

impl ServiceBucketRow {
    pub fn add(&mut self, bucket: ServiceBucket, count: u64) {
        let column = match bucket {
            ServiceBucket::Http => &mut self.http_count,
            ServiceBucket::Https => &mut self.https_count,
            ServiceBucket::Ssh => &mut self.ssh_count,
            ServiceBucket::Dns => &mut self.dns_count,
            ServiceBucket::Smtp => &mut self.smtp_count,
            ServiceBucket::Ftp => &mut self.ftp_count,
            ServiceBucket::Mysql => &mut self.mysql_count,
            ServiceBucket::Ntp => &mut self.ntp_count,
            ServiceBucket::Telnet => &mut self.telnet_count,
            ServiceBucket::Rdp => &mut self.rdp_count,
            ServiceBucket::Unknown => &mut self.unknown_count,
            ServiceBucket::Other => &mut self.other_count,
        };
        *column += count;
        self.total_packet_count += count;
    }
}
