use nom::number::complete::{be_u16, be_u32, be_u8};
use nom::sequence::tuple;
use nom::IResult;
use serde::Serialize;

use super::classify;
use crate::dissectors::{api, Error};
use api::packet::{Classification, TcpFlags};

pub const MIN_HEADER_LEN: usize = 20;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Segment<'a> {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub header_len: usize,
    pub flags: TcpFlags,
    pub window: u16,
    pub classification: Classification,
    #[serde(skip)]
    pub payload: &'a [u8],
}

type Header = (u16, u16, u32, u32, u8, u8, u16);

/// Fixed part of the header up to the window field
fn header(data: &[u8]) -> IResult<&[u8], Header, Error> {
    tuple((be_u16, be_u16, be_u32, be_u32, be_u8, be_u8, be_u16))(data)
}

pub fn dissect(data: &[u8]) -> Result<Segment<'_>, Error> {
    Error::check_len(data, MIN_HEADER_LEN)?;

    let (_, (src_port, dst_port, seq, ack, data_offset, flags, window)) =
        header(data).map_err(Error::from)?;

    let data_offset = data_offset >> 4;
    if data_offset < 5 {
        return Err(Error::MalformedHeader("tcp data offset is less than 5"));
    }
    let header_len = data_offset as usize * 4;
    if header_len > data.len() {
        return Err(Error::MalformedHeader(
            "tcp header length exceeds segment length",
        ));
    }

    Ok(Segment {
        src_port,
        dst_port,
        seq,
        ack,
        header_len,
        flags: TcpFlags::from_bits_truncate(flags),
        window,
        classification: classify(src_port, dst_port),
        payload: &data[header_len..],
    })
}
