use std::net::Ipv4Addr;

use nom::bytes::complete::take;
use nom::number::complete::be_u16;
use nom::sequence::tuple;
use nom::IResult;
use serde::Serialize;
use tracing::debug;

use crate::dissectors::{api, Error};
use api::packet::ArpOpcode;
use api::utils::addr::{ipv4_from_slice, MacAddr};

/// Hardware/protocol address lengths of Ethernet/IPv4 ARP
const ETHERNET_ADDR_LEN: u8 = 6;
const IPV4_ADDR_LEN: u8 = 4;

/// Bytes needed to reach the opcode
const FIXED_LEN: usize = 8;
/// Full Ethernet/IPv4 ARP packet
const FULL_LEN: usize = 28;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Datagram {
    /// Ethernet/IPv4 ARP with every address decoded
    Full {
        opcode: ArpOpcode,
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    },
    /// Any other address sizes, only the opcode is meaningful
    OpcodeOnly {
        opcode: ArpOpcode,
        hw_addr_len: u8,
        proto_addr_len: u8,
    },
}

impl Datagram {
    pub fn opcode(&self) -> ArpOpcode {
        match self {
            Datagram::Full { opcode, .. } | Datagram::OpcodeOnly { opcode, .. } => *opcode,
        }
    }
}

fn addresses(data: &[u8]) -> IResult<&[u8], (u16, &[u8], &[u8], &[u8], &[u8]), Error> {
    tuple((
        be_u16,
        take(6usize),
        take(4usize),
        take(6usize),
        take(4usize),
    ))(data)
}

fn opcode(data: &[u8]) -> IResult<&[u8], u16, Error> {
    be_u16(data)
}

pub fn dissect(data: &[u8]) -> Result<Datagram, Error> {
    Error::check_len(data, FIXED_LEN)?;
    let hw_addr_len = data[4];
    let proto_addr_len = data[5];

    if hw_addr_len == ETHERNET_ADDR_LEN && proto_addr_len == IPV4_ADDR_LEN {
        Error::check_len(data, FULL_LEN)?;
        let (_, (op, smac, sip, tmac, tip)) = addresses(&data[6..]).map_err(Error::from)?;
        return Ok(Datagram::Full {
            opcode: ArpOpcode::from(op),
            sender_mac: MacAddr::from_slice(smac),
            sender_ip: ipv4_from_slice(sip),
            target_mac: MacAddr::from_slice(tmac),
            target_ip: ipv4_from_slice(tip),
        });
    }

    debug!(
        "arp with hardware/protocol address length {}/{}, decoding opcode only",
        hw_addr_len, proto_addr_len
    );
    let (_, op) = opcode(&data[6..]).map_err(Error::from)?;
    Ok(Datagram::OpcodeOnly {
        opcode: ArpOpcode::from(op),
        hw_addr_len,
        proto_addr_len,
    })
}
