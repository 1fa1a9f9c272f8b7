use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use framesniff_utils::dissectors::link::arp;
use dns::{DnsMessage, RecordData};

use crate::capture::Frame;
use crate::packet::{Application, Network, Packet, Transport};

/// Writes decoded packets to a stream, as text blocks or JSON lines
#[derive(Clone, Copy, Debug)]
pub struct Printer {
    json: bool,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    index: u64,
    timestamp: f64,
    #[serde(flatten)]
    packet: &'a Packet<'a>,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn print<W: Write>(&self, w: &mut W, index: u64, frame: &Frame, pkt: &Packet) -> Result<()> {
        if self.json {
            let record = JsonRecord {
                index,
                timestamp: frame.ts.as_secs_f64(),
                packet: pkt,
            };
            serde_json::to_writer(&mut *w, &record)?;
            writeln!(w)?;
            return Ok(());
        }

        writeln!(w, "Packet: {}", index)?;
        if let Some(eth) = &pkt.ethernet {
            writeln!(
                w,
                "  Ethernet, Type: {}  Src MAC: {}  Dst MAC: {}",
                eth.ether_type, eth.src_mac, eth.dst_mac
            )?;
        }

        match &pkt.network {
            Some(Network::Ipv4(ip)) => writeln!(
                w,
                "  Internet Protocol v4, Protocol: {}  Src IP: {}  Dst IP: {}",
                ip.protocol, ip.src_addr, ip.dst_addr
            )?,
            Some(Network::Arp(datagram)) => print_arp(w, datagram)?,
            None => {}
        }

        match &pkt.transport {
            Some(Transport::Udp(seg)) => writeln!(
                w,
                "  User Datagram Protocol ({}) Type: {}  Src Port: {}  Dst Port: {}",
                seg.classification.direction,
                seg.classification.kind,
                seg.src_port,
                seg.dst_port
            )?,
            Some(Transport::Tcp(seg)) => {
                writeln!(
                    w,
                    "  Transmission Control Protocol ({}) Type: {}",
                    seg.classification.direction, seg.classification.kind
                )?;
                writeln!(w, "\tSeq num: {}  Ack num: {}", seg.seq, seg.ack)?;
                writeln!(
                    w,
                    "\tSrc Port: {}  Dst Port: {}  Flags: [{}]",
                    seg.src_port,
                    seg.dst_port,
                    seg.flags.names().join(", ")
                )?;
            }
            None => {}
        }

        match &pkt.application {
            Some(Application::Dns(msg)) => print_dns(w, msg)?,
            Some(Application::Http(lines)) if !lines.is_empty() => {
                writeln!(w, "  HyperText Transfer Protocol:")?;
                for line in lines {
                    writeln!(w, "\t {}", line)?;
                }
            }
            _ => {}
        }

        Ok(())
    }
}

fn print_arp<W: Write>(w: &mut W, datagram: &arp::Datagram) -> Result<()> {
    writeln!(w, "  Address Resolution Protocol ({})", datagram.opcode())?;
    match datagram {
        arp::Datagram::Full {
            sender_mac,
            sender_ip,
            target_mac,
            target_ip,
            ..
        } => {
            writeln!(w, "    Sender MAC: {} Sender IP: {}", sender_mac, sender_ip)?;
            writeln!(w, "    Target MAC: {} Target IP: {}", target_mac, target_ip)?;
        }
        arp::Datagram::OpcodeOnly { .. } => {
            writeln!(w, "    Sender MAC: NA Sender IP: NA")?;
            writeln!(w, "    Target MAC: NA Target IP: NA")?;
        }
    }
    Ok(())
}

fn print_dns<W: Write>(w: &mut W, msg: &DnsMessage) -> Result<()> {
    writeln!(
        w,
        "  Domain Name System ({}) Query ID: {}",
        msg.msg_type, msg.query_id
    )?;
    writeln!(
        w,
        "\tQuestions: {}  Answer RRs: {}  Authority RRs: {}  Additional RRs: {}",
        msg.qry_num, msg.answer_num, msg.authority_rec_num, msg.additional_rec_num
    )?;
    let opcode = match msg.op_code() {
        Some(op) => format!("{:?}", op),
        None => msg.opcode.to_string(),
    };
    let rcode = match msg.reply_code() {
        Some(rc) => format!("{:?}", rc),
        None => msg.rcode.to_string(),
    };
    writeln!(w, "\tOpcode: {}  Rcode: {}", opcode, rcode)?;

    if !msg.questions.is_empty() {
        writeln!(w, "\tQueries:")?;
        for q in &msg.questions {
            writeln!(w, "\t  {}  Type: {}", q.name, q.qtype)?;
        }
    }

    if !msg.answers.is_empty() {
        writeln!(w, "\tAnswers:")?;
        for a in &msg.answers {
            let addr = match &a.data {
                RecordData::A(ip) => ip.to_string(),
                RecordData::AAAA(ip) => ip.clone(),
                RecordData::CNAME(name) => name.clone(),
                RecordData::Opaque(data) => format!("<{} bytes>", data.len()),
            };
            writeln!(w, "\t  {}  Type: {}  Addr: {}", a.name, a.rr_type, addr)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const ARP_FRAME: &[u8] = &[
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x0c, 0x29, 0x3e, 0x5c, 0x71, 0x08, 0x06, 0x00,
        0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 0x00, 0x0c, 0x29, 0x3e, 0x5c, 0x71, 0xc0, 0xa8,
        0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc0, 0xa8, 0x01, 0x64,
    ];

    fn frame(data: &[u8]) -> Frame {
        Frame {
            data: data.to_vec(),
            ts: Duration::new(1, 500_000_000),
        }
    }

    #[test]
    fn text_arp() -> Result<()> {
        let frame = frame(ARP_FRAME);
        let pkt = Packet::dissect(&frame.data);
        let mut out = vec![];
        Printer::new(false).print(&mut out, 3, &frame, &pkt)?;

        let text = String::from_utf8(out)?;
        let expected = "Packet: 3\n\
            \x20 Ethernet, Type: ARP  Src MAC: 00:0c:29:3e:5c:71  Dst MAC: ff:ff:ff:ff:ff:ff\n\
            \x20 Address Resolution Protocol (ARP Request)\n\
            \x20   Sender MAC: 00:0c:29:3e:5c:71 Sender IP: 192.168.1.1\n\
            \x20   Target MAC: 00:00:00:00:00:00 Target IP: 192.168.1.100\n";
        assert_eq!(text, expected);
        Ok(())
    }

    #[test]
    fn text_opcode_only_arp() -> Result<()> {
        let mut data = ARP_FRAME.to_vec();
        // token ring hardware address length
        data[18] = 2;
        let frame = frame(&data);
        let pkt = Packet::dissect(&frame.data);
        let mut out = vec![];
        Printer::new(false).print(&mut out, 0, &frame, &pkt)?;

        let text = String::from_utf8(out)?;
        assert!(text.contains("Sender MAC: NA Sender IP: NA"));
        Ok(())
    }

    #[test]
    fn text_dns_codes() -> Result<()> {
        let mut msg = DnsMessage {
            query_id: 0x1234,
            rcode: 3,
            ..Default::default()
        };
        let mut out = vec![];
        print_dns(&mut out, &msg)?;
        let text = String::from_utf8(out)?;
        assert!(text.contains("\tOpcode: Query  Rcode: NXDomain\n"));

        // unassigned codes fall back to the raw number
        msg.opcode = 3;
        msg.rcode = 15;
        let mut out = vec![];
        print_dns(&mut out, &msg)?;
        let text = String::from_utf8(out)?;
        assert!(text.contains("\tOpcode: 3  Rcode: 15\n"));
        Ok(())
    }

    #[test]
    fn json_line() -> Result<()> {
        let frame = frame(ARP_FRAME);
        let pkt = Packet::dissect(&frame.data);
        let mut out = vec![];
        Printer::new(true).print(&mut out, 7, &frame, &pkt)?;

        let text = String::from_utf8(out)?;
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);

        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value["index"], 7);
        assert_eq!(value["timestamp"], 1.5);
        assert_eq!(value["ethernet"]["src_mac"], "00:0c:29:3e:5c:71");
        assert_eq!(value["ethernet"]["ether_type"], "ARP");
        assert!(value["network"]["Arp"]["Full"].is_object());
        Ok(())
    }
}
