//! Numeric to symbolic translation tables.
//!
//! Every table degrades an unassigned value to an explicit `Other` variant
//! carrying the raw number, nothing here ever fails.

use std::fmt::{Display, Formatter};

use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum EtherType {
    IPV4,
    ARP,
    Other(u16),
}

impl From<u16> for EtherType {
    fn from(etype: u16) -> Self {
        match etype {
            0x0800 => EtherType::IPV4,
            0x0806 => EtherType::ARP,
            _ => EtherType::Other(etype),
        }
    }
}

impl Display for EtherType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EtherType::IPV4 => write!(f, "IPv4"),
            EtherType::ARP => write!(f, "ARP"),
            EtherType::Other(_) => write!(f, "OTHER"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum IpProtocol {
    TCP,
    UDP,
    Other(u8),
}

impl From<u8> for IpProtocol {
    fn from(proto: u8) -> Self {
        match proto {
            6 => IpProtocol::TCP,
            17 => IpProtocol::UDP,
            _ => IpProtocol::Other(proto),
        }
    }
}

impl Display for IpProtocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            IpProtocol::TCP => write!(f, "TCP"),
            IpProtocol::UDP => write!(f, "UDP"),
            IpProtocol::Other(_) => write!(f, "OTHER"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum ArpOpcode {
    Request,
    Reply,
    Other(u16),
}

impl From<u16> for ArpOpcode {
    fn from(opcode: u16) -> Self {
        match opcode {
            1 => ArpOpcode::Request,
            2 => ArpOpcode::Reply,
            _ => ArpOpcode::Other(opcode),
        }
    }
}

impl Display for ArpOpcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ArpOpcode::Request => write!(f, "ARP Request"),
            ArpOpcode::Reply => write!(f, "ARP Reply"),
            ArpOpcode::Other(_) => write!(f, "OTHER"),
        }
    }
}

/// Application protocols recognised by their well-known port
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum AppProtocol {
    FTP,
    SSH,
    TELNET,
    SMTP,
    DNS,
    HTTP,
    HTTPS,
    Other,
}

impl AppProtocol {
    pub fn from_port(port: u16) -> Self {
        match port {
            20 | 21 => AppProtocol::FTP,
            22 => AppProtocol::SSH,
            23 => AppProtocol::TELNET,
            25 => AppProtocol::SMTP,
            53 => AppProtocol::DNS,
            80 => AppProtocol::HTTP,
            443 => AppProtocol::HTTPS,
            _ => AppProtocol::Other,
        }
    }
}

impl Display for AppProtocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AppProtocol::FTP => "FTP",
            AppProtocol::SSH => "SSH",
            AppProtocol::TELNET => "TELNET",
            AppProtocol::SMTP => "SMTP",
            AppProtocol::DNS => "DNS",
            AppProtocol::HTTP => "HTTP",
            AppProtocol::HTTPS => "HTTPS",
            AppProtocol::Other => "OTHER",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum Direction {
    Request,
    Response,
    NotApplicable,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Request => write!(f, "Request"),
            Direction::Response => write!(f, "Response"),
            Direction::NotApplicable => write!(f, "NA"),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Classification {
    pub kind: AppProtocol,
    pub direction: Direction,
}

impl Default for Classification {
    fn default() -> Self {
        Self {
            kind: AppProtocol::Other,
            direction: Direction::NotApplicable,
        }
    }
}

bitflags! {
    /// TCP control bits, byte 13 of the header
    pub struct TcpFlags: u8 {
        const CWR = 0b1000_0000;
        const ECE = 0b0100_0000;
        const URG = 0b0010_0000;
        const ACK = 0b0001_0000;
        const PSH = 0b0000_1000;
        const RST = 0b0000_0100;
        const SYN = 0b0000_0010;
        const FIN = 0b0000_0001;
    }
}

impl Default for TcpFlags {
    fn default() -> Self {
        TcpFlags::empty()
    }
}

const TCP_FLAG_NAMES: [(TcpFlags, &str); 8] = [
    (TcpFlags::CWR, "CWR"),
    (TcpFlags::ECE, "ECE"),
    (TcpFlags::URG, "URG"),
    (TcpFlags::ACK, "ACK"),
    (TcpFlags::PSH, "PSH"),
    (TcpFlags::RST, "RST"),
    (TcpFlags::SYN, "SYN"),
    (TcpFlags::FIN, "FIN"),
];

impl TcpFlags {
    /// Names of the set flags, most significant bit first
    pub fn names(&self) -> Vec<&'static str> {
        TCP_FLAG_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl Serialize for TcpFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.names();
        let mut seq = serializer.serialize_seq(Some(names.len()))?;
        for name in names {
            seq.serialize_element(name)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ether_type() {
        assert_eq!(EtherType::from(0x0800), EtherType::IPV4);
        assert_eq!(EtherType::from(0x0806), EtherType::ARP);
        assert_eq!(EtherType::from(0x86dd), EtherType::Other(0x86dd));
        assert_eq!(EtherType::Other(0x86dd).to_string(), "OTHER");
    }

    #[test]
    fn ip_protocol() {
        assert_eq!(IpProtocol::from(6), IpProtocol::TCP);
        assert_eq!(IpProtocol::from(17), IpProtocol::UDP);
        assert_eq!(IpProtocol::from(1), IpProtocol::Other(1));
    }

    #[test]
    fn well_known_ports() {
        assert_eq!(AppProtocol::from_port(20), AppProtocol::FTP);
        assert_eq!(AppProtocol::from_port(21), AppProtocol::FTP);
        assert_eq!(AppProtocol::from_port(22), AppProtocol::SSH);
        assert_eq!(AppProtocol::from_port(23), AppProtocol::TELNET);
        assert_eq!(AppProtocol::from_port(25), AppProtocol::SMTP);
        assert_eq!(AppProtocol::from_port(53), AppProtocol::DNS);
        assert_eq!(AppProtocol::from_port(80), AppProtocol::HTTP);
        assert_eq!(AppProtocol::from_port(443), AppProtocol::HTTPS);
        assert_eq!(AppProtocol::from_port(8080), AppProtocol::Other);
    }

    #[test]
    fn tcp_flag_names_msb_first() {
        let flags = TcpFlags::from_bits_truncate(0b0001_0010);
        assert_eq!(flags, TcpFlags::ACK | TcpFlags::SYN);
        assert_eq!(flags.names(), vec!["ACK", "SYN"]);
        assert_eq!(TcpFlags::all().names().len(), 8);
        assert!(TcpFlags::empty().names().is_empty());
    }

    #[test]
    fn tcp_flags_serialize_as_names() {
        let flags = TcpFlags::FIN | TcpFlags::CWR;
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, r#"["CWR","FIN"]"#);
    }
}
