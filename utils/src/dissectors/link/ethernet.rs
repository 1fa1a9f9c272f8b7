use nom::bytes::complete::take;
use nom::number::complete::be_u16;
use nom::sequence::tuple;
use nom::IResult;
use serde::Serialize;

use crate::dissectors::{api, Error};
use api::packet::EtherType;
use api::utils::addr::MacAddr;

pub const HEADER_LEN: usize = 14;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame<'a> {
    pub dst_mac: MacAddr,
    pub src_mac: MacAddr,
    pub ether_type: EtherType,
    /// Everything from byte 14 on
    #[serde(skip)]
    pub payload: &'a [u8],
}

fn header(data: &[u8]) -> IResult<&[u8], (&[u8], &[u8], u16), Error> {
    tuple((take(6usize), take(6usize), be_u16))(data)
}

pub fn dissect(data: &[u8]) -> Result<Frame<'_>, Error> {
    Error::check_len(data, HEADER_LEN)?;
    let (payload, (dst, src, etype)) = header(data).map_err(Error::from)?;

    Ok(Frame {
        dst_mac: MacAddr::from_slice(dst),
        src_mac: MacAddr::from_slice(src),
        ether_type: EtherType::from(etype),
        payload,
    })
}
