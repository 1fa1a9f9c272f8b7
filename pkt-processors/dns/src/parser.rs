use std::net::Ipv4Addr;

use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u32, be_u8};
use nom::sequence::tuple;
use nom::IResult;
use num_traits::FromPrimitive;
use serde::{Serialize, Serializer};
use tracing::debug;

use framesniff_api as api;
use api::error::Error;
use api::utils::addr::{format_ipv6, ipv4_from_slice};

use crate::consts::*;

pub const HEADER_LEN: usize = 12;
/// Upper bound on labels in one name, a 255 byte name holds at most 127
pub const MAX_LABELS: usize = 127;

/// Length byte with both top bits set starts a compression pointer
const POINTER_MASK: u8 = 0xc0;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DnsMessage {
    pub query_id: u16,
    pub msg_type: MessageType,
    #[serde(skip)]
    pub flags: Flags,
    #[serde(serialize_with = "opcode_symbol")]
    pub opcode: u8,
    #[serde(serialize_with = "rcode_symbol")]
    pub rcode: u8,
    pub qry_num: u16,
    pub answer_num: u16,
    pub authority_rec_num: u16,
    pub additional_rec_num: u16,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
}

impl DnsMessage {
    pub fn op_code(&self) -> Option<OpCode> {
        OpCode::from_u8(self.opcode)
    }

    pub fn reply_code(&self) -> Option<RCode> {
        RCode::from_u8(self.rcode)
    }
}

/// Symbol name when assigned, the raw number otherwise
fn opcode_symbol<S: Serializer>(opcode: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    match OpCode::from_u8(*opcode) {
        Some(op) => op.serialize(serializer),
        None => serializer.serialize_u8(*opcode),
    }
}

fn rcode_symbol<S: Serializer>(rcode: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    match RCode::from_u8(*rcode) {
        Some(rc) => rc.serialize(serializer),
        None => serializer.serialize_u8(*rcode),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Question {
    pub name: String,
    pub qtype: RecordType,
    pub class: u16,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// A DNS answer
pub struct ResourceRecord {
    pub name: String,
    /// Resource record type
    pub rr_type: RecordType,
    pub class: u16,
    pub ttl: u32,
    pub data: RecordData,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum RecordData {
    A(Ipv4Addr),
    /// Compressed IPv6 text
    AAAA(String),
    /// Target name
    CNAME(String),
    Opaque(Vec<u8>),
}

/// Cursor and name carried from one question/record to the next.
///
/// `offset` is relative to the message body, the 12 byte header is not part
/// of it. `last_name` is what a record whose name decodes to nothing inherits.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecoderState {
    pub offset: usize,
    pub last_name: String,
}

#[derive(Debug, Default)]
struct Header {
    query_id: u16,
    flags: Flags,
    qry_num: u16,
    answer_num: u16,
    authority_rec_num: u16,
    additional_rec_num: u16,
}

fn parse_header(s: &[u8]) -> IResult<&[u8], Header, Error> {
    let (s, (query_id, flags, qry_num, answer_num, authority_rec_num, additional_rec_num)) =
        tuple((be_u16, be_u16, be_u16, be_u16, be_u16, be_u16))(s)?;
    Ok((
        s,
        Header {
            query_id,
            flags: Flags::from_bits_truncate(flags),
            qry_num,
            answer_num,
            authority_rec_num,
            additional_rec_num,
        },
    ))
}

/// Read labels until a terminator or a compression pointer.
///
/// Pointers end the name without being followed, the labels read so far are
/// the whole result.
fn labels(mut s: &[u8]) -> IResult<&[u8], Vec<String>, Error> {
    let mut labels = vec![];

    loop {
        let (tmp, len) = be_u8(s)?;
        if len == 0 {
            return Ok((tmp, labels));
        }
        if len & POINTER_MASK == POINTER_MASK {
            let (tmp, _) = take(1usize)(tmp)?;
            return Ok((tmp, labels));
        }

        let (tmp, part) = take(len)(tmp)?;
        labels.push(String::from_utf8_lossy(part).into_owned());
        if labels.len() > MAX_LABELS {
            return Err(nom::Err::Failure(Error::MalformedHeader(
                "dns name has too many labels",
            )));
        }
        s = tmp;
    }
}

/// Decode the name starting at `offset`, returning its labels and the offset
/// just past it.
pub fn parse_name(buf: &[u8], offset: usize) -> Result<(Vec<String>, usize), Error> {
    let s = buf.get(offset..).ok_or(Error::TruncatedInput {
        needed: offset + 1,
        available: buf.len(),
    })?;
    let (remain, labels) = labels(s).map_err(Error::from)?;
    Ok((labels, buf.len() - remain.len()))
}

fn rest(body: &[u8], offset: usize) -> Result<&[u8], Error> {
    body.get(offset..).ok_or(Error::TruncatedInput {
        needed: offset,
        available: body.len(),
    })
}

fn type_class(s: &[u8]) -> IResult<&[u8], (u16, u16), Error> {
    tuple((be_u16, be_u16))(s)
}

/// Type, class, ttl and data of a resource record
fn rr_trailer(s: &[u8]) -> IResult<&[u8], (u16, u16, u32, &[u8]), Error> {
    let (s, (rr_type, class, ttl, data_len)) = tuple((be_u16, be_u16, be_u32, be_u16))(s)?;
    let (s, data) = take(data_len)(s)?;
    Ok((s, (rr_type, class, ttl, data)))
}

pub fn parse_question(body: &[u8], state: DecoderState) -> Result<(Question, DecoderState), Error> {
    let (labels, offset) = parse_name(body, state.offset)?;
    let s = rest(body, offset)?;
    let (remain, (qtype, class)) = type_class(s).map_err(Error::from)?;

    let name = labels.join(".");
    let state = DecoderState {
        offset: body.len() - remain.len(),
        last_name: name.clone(),
    };
    let question = Question {
        name,
        qtype: RecordType::from(qtype),
        class,
    };
    Ok((question, state))
}

pub fn parse_resource_record(
    body: &[u8],
    state: DecoderState,
) -> Result<(ResourceRecord, DecoderState), Error> {
    let DecoderState { offset, last_name } = state;

    let (labels, offset) = parse_name(body, offset)?;
    let name = if labels.is_empty() {
        last_name.clone()
    } else {
        labels.join(".")
    };

    let s = rest(body, offset)?;
    let (remain, (rr_type, class, ttl, data)) = rr_trailer(s).map_err(Error::from)?;
    let rr_type = RecordType::from(rr_type);

    let mut last_name = last_name;
    let data = match rr_type {
        RecordType::CNAME => {
            let (target, _) = parse_name(data, 0)?;
            let target = target.join(".");
            last_name = target.clone();
            RecordData::CNAME(target)
        }
        RecordType::A => {
            if data.len() != 4 {
                return Err(Error::MalformedHeader("dns A record data is not 4 bytes"));
            }
            RecordData::A(ipv4_from_slice(data))
        }
        RecordType::AAAA => {
            let mut addr = [0u8; 16];
            if data.len() != addr.len() {
                return Err(Error::MalformedHeader(
                    "dns AAAA record data is not 16 bytes",
                ));
            }
            addr.copy_from_slice(data);
            RecordData::AAAA(format_ipv6(&addr))
        }
        RecordType::Other(_) => RecordData::Opaque(data.to_vec()),
    };

    let record = ResourceRecord {
        name,
        rr_type,
        class,
        ttl,
        data,
    };
    let state = DecoderState {
        offset: body.len() - remain.len(),
        last_name,
    };
    Ok((record, state))
}

/// Decode a DNS message carried over UDP.
///
/// Answers are only decoded when the last question has a recognised type,
/// authority and additional records are counted but never decoded.
pub fn parse_dns_message(msg: &[u8]) -> Result<DnsMessage, Error> {
    Error::check_len(msg, HEADER_LEN)?;
    let (body, header) = parse_header(msg).map_err(Error::from)?;

    let mut dns = DnsMessage {
        query_id: header.query_id,
        msg_type: MessageType::from(header.flags),
        flags: header.flags,
        opcode: header.flags.op_code(),
        rcode: header.flags.reply_code(),
        qry_num: header.qry_num,
        answer_num: header.answer_num,
        authority_rec_num: header.authority_rec_num,
        additional_rec_num: header.additional_rec_num,
        ..Default::default()
    };

    let mut state = DecoderState::default();
    for _ in 0..header.qry_num {
        let (question, tmp) = parse_question(body, state)?;
        dns.questions.push(question);
        state = tmp;
    }

    if header.answer_num == 0 {
        return Ok(dns);
    }

    let recognised = match dns.questions.last() {
        Some(q) => !matches!(q.qtype, RecordType::Other(_)),
        None => false,
    };
    if !recognised {
        debug!(
            "dns message {:#06x}: skipping {} answers, last question type is not recognised",
            dns.query_id, header.answer_num
        );
        return Ok(dns);
    }

    for _ in 0..header.answer_num {
        let (answer, tmp) = parse_resource_record(body, state)?;
        dns.answers.push(answer);
        state = tmp;
    }

    Ok(dns)
}

/// Decode a DNS message carried over TCP, prefixed with its 2 byte length
pub fn parse_tcp_dns_message(s: &[u8]) -> Result<DnsMessage, Error> {
    let (s, total_len) = be_u16::<_, Error>(s).map_err(Error::from)?;
    let (_, msg) = take::<_, _, Error>(total_len)(s).map_err(Error::from)?;
    parse_dns_message(msg)
}
