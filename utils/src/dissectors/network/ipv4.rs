use std::net::Ipv4Addr;

use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u8};
use nom::sequence::tuple;
use nom::IResult;
use serde::Serialize;
use tracing::debug;

use crate::dissectors::{api, Error};
use api::packet::IpProtocol;
use api::utils::addr::ipv4_from_slice;

/// Header length for IHL 5
pub const MIN_HEADER_LEN: usize = 20;
/// Header length assumed for every other IHL value
pub const OPTIONS_HEADER_LEN: usize = 24;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Datagram<'a> {
    pub header_len: usize,
    pub total_len: usize,
    pub ttl: u8,
    pub protocol: IpProtocol,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    /// From the end of the header up to the declared total length
    #[serde(skip)]
    pub payload: &'a [u8],
}

fn total_len(data: &[u8]) -> IResult<&[u8], u16, Error> {
    be_u16(data)
}

/// ttl, protocol, checksum, source and destination, bytes 8..20
fn fields(data: &[u8]) -> IResult<&[u8], (u8, u8, u16, &[u8], &[u8]), Error> {
    tuple((be_u8, be_u8, be_u16, take(4usize), take(4usize)))(data)
}

/// Decode an IPv4 header.
///
/// Only two header sizes are recognised: IHL 5 is a plain 20 byte header,
/// any other IHL is taken to be a 24 byte header carrying one option word.
pub fn dissect(data: &[u8]) -> Result<Datagram<'_>, Error> {
    Error::check_len(data, 4)?;

    let ihl = data[0] & 0x0f;
    let header_len = match ihl {
        5 => MIN_HEADER_LEN,
        6 => OPTIONS_HEADER_LEN,
        _ => {
            debug!("ipv4 ihl {}, assuming a {} byte header", ihl, OPTIONS_HEADER_LEN);
            OPTIONS_HEADER_LEN
        }
    };

    let (_, total) = total_len(&data[2..]).map_err(Error::from)?;
    let total = total as usize;
    Error::check_len(data, total)?;
    if total < header_len {
        return Err(Error::MalformedHeader(
            "ipv4 total length is shorter than its header",
        ));
    }

    let (_, (ttl, protocol, _checksum, src, dst)) =
        fields(&data[8..MIN_HEADER_LEN]).map_err(Error::from)?;

    Ok(Datagram {
        header_len,
        total_len: total,
        ttl,
        protocol: IpProtocol::from(protocol),
        src_addr: ipv4_from_slice(src),
        dst_addr: ipv4_from_slice(dst),
        payload: &data[header_len..total],
    })
}
