//! Frame to layered record pipeline.
//!
//! Ethernet, then IPv4 or ARP, then TCP or UDP, then DNS or HTTP when the
//! port classification says so. A failing layer stops the descent, the layers
//! decoded before it are kept alongside the error.

use serde::{Serialize, Serializer};
use tracing::debug;

use framesniff_api as api;
use framesniff_utils::dissectors::{link, network, transport};
use api::error::Error;
use api::packet::{AppProtocol, EtherType, IpProtocol};
use link::{arp, ethernet};
use network::ipv4;
use transport::{tcp, udp};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Network<'a> {
    Ipv4(ipv4::Datagram<'a>),
    Arp(arp::Datagram),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Transport<'a> {
    Tcp(tcp::Segment<'a>),
    Udp(udp::Segment<'a>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Application {
    Dns(dns::DnsMessage),
    Http(Vec<String>),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Packet<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethernet: Option<ethernet::Frame<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Network<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    /// First decode failure, the layer it hit is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(serialize_with = "error_text")]
    pub error: Option<Error>,
}

fn error_text<S: Serializer>(error: &Option<Error>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.collect_str(e),
        None => serializer.serialize_none(),
    }
}

impl<'a> Packet<'a> {
    /// Decode every layer of `data` that can be decoded
    pub fn dissect(data: &'a [u8]) -> Self {
        let mut pkt = Packet::default();
        if let Err(e) = pkt.dissect_link(data) {
            pkt.error = Some(e);
        }
        pkt
    }

    fn dissect_link(&mut self, data: &'a [u8]) -> Result<(), Error> {
        let frame = ethernet::dissect(data)?;
        let (ether_type, payload) = (frame.ether_type, frame.payload);
        self.ethernet = Some(frame);

        match ether_type {
            EtherType::IPV4 => {
                let datagram = ipv4::dissect(payload)?;
                let (protocol, payload) = (datagram.protocol, datagram.payload);
                self.network = Some(Network::Ipv4(datagram));
                self.dissect_transport(protocol, payload)
            }
            EtherType::ARP => {
                self.network = Some(Network::Arp(arp::dissect(payload)?));
                Ok(())
            }
            EtherType::Other(etype) => {
                debug!("ether type {:#06x} not decoded", etype);
                Ok(())
            }
        }
    }

    fn dissect_transport(&mut self, protocol: IpProtocol, data: &'a [u8]) -> Result<(), Error> {
        match protocol {
            IpProtocol::UDP => {
                let segment = udp::dissect(data)?;
                let (kind, payload) = (segment.classification.kind, segment.payload);
                self.transport = Some(Transport::Udp(segment));
                if kind == AppProtocol::DNS {
                    self.application = Some(Application::Dns(dns::parse_dns_message(payload)?));
                }
            }
            IpProtocol::TCP => {
                let segment = tcp::dissect(data)?;
                let (kind, payload) = (segment.classification.kind, segment.payload);
                self.transport = Some(Transport::Tcp(segment));
                match kind {
                    AppProtocol::HTTP if !payload.is_empty() => {
                        self.application =
                            Some(Application::Http(http::split_header_lines(payload)));
                    }
                    AppProtocol::DNS if !payload.is_empty() => {
                        self.application =
                            Some(Application::Dns(dns::parse_tcp_dns_message(payload)?));
                    }
                    _ => {}
                }
            }
            IpProtocol::Other(proto) => debug!("ip protocol {} not decoded", proto),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use api::packet::{ArpOpcode, Direction, TcpFlags};

    use super::*;

    const ETH_IPV4: &[u8] = &[
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0x08, 0x00,
    ];
    const ETH_ARP: &[u8] = &[
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x0c, 0x29, 0x3e, 0x5c, 0x71, 0x08, 0x06,
    ];
    const ARP_REQUEST: &[u8] = &[
        0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 0x00, 0x0c, 0x29, 0x3e, 0x5c, 0x71, 0xc0,
        0xa8, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc0, 0xa8, 0x01, 0x64,
    ];
    /// www.github.com A query, id 0xe039
    const DNS_QUERY: &[u8] = &[
        0xe0, 0x39, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x77, 0x77,
        0x77, 0x06, 0x67, 0x69, 0x74, 0x68, 0x75, 0x62, 0x03, 0x63, 0x6f, 0x6d, 0x00, 0x00, 0x01,
        0x00, 0x01,
    ];
    const HTTP_GET: &[u8] = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

    fn ipv4(protocol: u8, payload: &[u8]) -> Vec<u8> {
        let total = (20 + payload.len()) as u16;
        let mut buf = vec![0x45, 0x00];
        buf.extend_from_slice(&total.to_be_bytes());
        buf.extend_from_slice(&[0x00, 0x00, 0x40, 0x00, 0x40, protocol, 0x00, 0x00]);
        buf.extend_from_slice(&[192, 168, 1, 10, 8, 8, 8, 8]);
        buf.extend_from_slice(payload);
        buf
    }

    fn udp(src: u16, dst: u16, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![];
        buf.extend_from_slice(&src.to_be_bytes());
        buf.extend_from_slice(&dst.to_be_bytes());
        buf.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
        buf.extend_from_slice(&[0x00, 0x00]);
        buf.extend_from_slice(payload);
        buf
    }

    fn tcp(src: u16, dst: u16, flags: u8, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![];
        buf.extend_from_slice(&src.to_be_bytes());
        buf.extend_from_slice(&dst.to_be_bytes());
        buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
        buf.extend_from_slice(&[0x50, flags, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00]);
        buf.extend_from_slice(payload);
        buf
    }

    fn frame(eth: &[u8], rest: &[u8]) -> Vec<u8> {
        let mut buf = eth.to_vec();
        buf.extend_from_slice(rest);
        buf
    }

    #[test]
    fn dns_over_udp() {
        let data = frame(ETH_IPV4, &ipv4(17, &udp(51000, 53, DNS_QUERY)));
        let pkt = Packet::dissect(&data);
        assert!(pkt.error.is_none());

        let eth = pkt.ethernet.as_ref().map(|f| f.src_mac.to_string());
        assert_eq!(eth.as_deref(), Some("66:77:88:99:aa:bb"));
        assert!(matches!(
            &pkt.network,
            Some(Network::Ipv4(ip)) if ip.dst_addr == Ipv4Addr::new(8, 8, 8, 8)
        ));
        match &pkt.transport {
            Some(Transport::Udp(seg)) => {
                assert_eq!(seg.classification.kind, AppProtocol::DNS);
                assert_eq!(seg.classification.direction, Direction::Request);
            }
            _ => panic!("expecting udp"),
        }
        match &pkt.application {
            Some(Application::Dns(msg)) => {
                assert_eq!(msg.query_id, 0xe039);
                assert_eq!(msg.questions[0].name, "www.github.com");
            }
            _ => panic!("expecting dns"),
        }
    }

    #[test]
    fn http_over_tcp() {
        let data = frame(ETH_IPV4, &ipv4(6, &tcp(80, 40000, 0x18, HTTP_GET)));
        let pkt = Packet::dissect(&data);
        assert!(pkt.error.is_none());
        match &pkt.transport {
            Some(Transport::Tcp(seg)) => {
                assert_eq!(seg.flags, TcpFlags::ACK | TcpFlags::PSH);
                assert_eq!(seg.classification.direction, Direction::Response);
            }
            _ => panic!("expecting tcp"),
        }
        assert_eq!(
            pkt.application,
            Some(Application::Http(vec![
                "GET / HTTP/1.1".to_string(),
                "Host: example.com".to_string()
            ]))
        );
    }

    #[test]
    fn empty_http_segment() -> anyhow::Result<()> {
        let data = frame(ETH_IPV4, &ipv4(6, &tcp(40000, 80, 0x10, &[])));
        let pkt = Packet::dissect(&data);
        assert!(pkt.error.is_none());
        assert!(matches!(&pkt.transport, Some(Transport::Tcp(_))));
        assert!(pkt.application.is_none());

        let value = serde_json::to_value(&pkt)?;
        assert!(value.get("application").is_none());
        Ok(())
    }

    #[test]
    fn dns_over_tcp() {
        let mut msg = (DNS_QUERY.len() as u16).to_be_bytes().to_vec();
        msg.extend_from_slice(DNS_QUERY);
        let data = frame(ETH_IPV4, &ipv4(6, &tcp(40000, 53, 0x18, &msg)));
        let pkt = Packet::dissect(&data);
        assert!(matches!(&pkt.application, Some(Application::Dns(m)) if m.query_id == 0xe039));

        // handshake segments carry nothing to decode
        let data = frame(ETH_IPV4, &ipv4(6, &tcp(40000, 53, 0x02, &[])));
        let pkt = Packet::dissect(&data);
        assert!(pkt.error.is_none());
        assert!(pkt.application.is_none());
    }

    #[test]
    fn unclassified_tcp() {
        let data = frame(ETH_IPV4, &ipv4(6, &tcp(40000, 5555, 0x02, &[])));
        let pkt = Packet::dissect(&data);
        assert!(pkt.transport.is_some());
        assert!(pkt.application.is_none());
    }

    #[test]
    fn arp() {
        let data = frame(ETH_ARP, ARP_REQUEST);
        let pkt = Packet::dissect(&data);
        assert!(pkt.error.is_none());
        match &pkt.network {
            Some(Network::Arp(arp)) => assert_eq!(arp.opcode(), ArpOpcode::Request),
            _ => panic!("expecting arp"),
        }
        assert!(pkt.transport.is_none());
    }

    #[test]
    fn unknown_ether_type() {
        let mut data = frame(ETH_IPV4, &[0u8; 40]);
        data[12] = 0x86;
        data[13] = 0xdd;
        let pkt = Packet::dissect(&data);
        assert!(pkt.error.is_none());
        assert!(pkt.ethernet.is_some());
        assert!(pkt.network.is_none());
    }

    #[test]
    fn partial_decode_keeps_outer_layers() {
        // DNS header cut short
        let data = frame(ETH_IPV4, &ipv4(17, &udp(53, 51000, &DNS_QUERY[..6])));
        let pkt = Packet::dissect(&data);
        assert!(pkt.ethernet.is_some());
        assert!(pkt.network.is_some());
        assert!(pkt.transport.is_some());
        assert!(pkt.application.is_none());
        assert!(matches!(pkt.error, Some(Error::TruncatedInput { .. })));
    }

    #[test]
    fn short_frame() {
        let pkt = Packet::dissect(&ETH_IPV4[..10]);
        assert!(pkt.ethernet.is_none());
        assert_eq!(
            pkt.error,
            Some(Error::TruncatedInput {
                needed: 14,
                available: 10
            })
        );
    }

    #[test]
    fn json() -> anyhow::Result<()> {
        let data = frame(ETH_IPV4, &ipv4(6, &tcp(40000, 80, 0x12, &[])));
        let value = serde_json::to_value(&Packet::dissect(&data))?;
        assert_eq!(value["transport"]["Tcp"]["flags"], serde_json::json!(["ACK", "SYN"]));
        assert!(value.get("error").is_none());

        let value = serde_json::to_value(&Packet::dissect(&ETH_IPV4[..10]))?;
        assert_eq!(
            value["error"],
            "Truncated input, needed 14 bytes, available 10 bytes"
        );
        Ok(())
    }

    #[test]
    fn idempotent() {
        let data = frame(ETH_IPV4, &ipv4(17, &udp(51000, 53, DNS_QUERY)));
        assert_eq!(Packet::dissect(&data), Packet::dissect(&data));
    }
}
