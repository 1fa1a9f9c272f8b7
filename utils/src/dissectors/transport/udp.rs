use nom::number::complete::be_u16;
use nom::sequence::tuple;
use nom::IResult;
use serde::Serialize;

use super::classify;
use crate::dissectors::{api, Error};
use api::packet::Classification;

pub const HEADER_LEN: usize = 8;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Segment<'a> {
    pub src_port: u16,
    pub dst_port: u16,
    /// Length field, header included
    pub length: u16,
    pub classification: Classification,
    #[serde(skip)]
    pub payload: &'a [u8],
}

fn header(data: &[u8]) -> IResult<&[u8], (u16, u16, u16, u16), Error> {
    tuple((be_u16, be_u16, be_u16, be_u16))(data)
}

pub fn dissect(data: &[u8]) -> Result<Segment<'_>, Error> {
    Error::check_len(data, HEADER_LEN)?;
    let (payload, (src_port, dst_port, length, _checksum)) = header(data).map_err(Error::from)?;

    Ok(Segment {
        src_port,
        dst_port,
        length,
        classification: classify(src_port, dst_port),
        payload,
    })
}
