#![allow(non_camel_case_types)]

use std::fmt::{Display, Formatter};

use serde::Serialize;

bitflags! {
    pub struct Flags: u16 {
        const RESPONSE = 0b1000000000000000;
        const AUTHORITATIVE_ANSWER = 0b0000010000000000;
        const TRUNCATED = 0b0000001000000000;
        const RECURSION_DESIRED = 0b0000000100000000;
        const RECURSION_AVALIABLE = 0b0000000010000000;
        const Z = 0b0000000001000000;
        const ANSWER_AUTHENCATED = 0b0000000000100000;
        const NO_AUTH_ACCEPTABLE = 0b0000000000010000;
        // multi-bit fields, kept so from_bits_truncate preserves them
        const OPCODE = 0b0111100000000000;
        const RCODE = 0b0000000000001111;
    }
}

impl Default for Flags {
    fn default() -> Self {
        Flags::from_bits_truncate(0)
    }
}

impl Flags {
    #[inline]
    /// Get Op Code
    pub fn op_code(&self) -> u8 {
        ((self.bits() & Self::OPCODE.bits()) >> 11) as u8
    }

    #[inline]
    /// Get Reply Code
    pub fn reply_code(&self) -> u8 {
        (self.bits() & Self::RCODE.bits()) as u8
    }
}

/// QR bit of the header flags
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum MessageType {
    Query,
    Response,
}

impl From<Flags> for MessageType {
    fn from(flags: Flags) -> Self {
        if flags.contains(Flags::RESPONSE) {
            MessageType::Response
        } else {
            MessageType::Query
        }
    }
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Query
    }
}

impl Display for MessageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageType::Query => write!(f, "Query"),
            MessageType::Response => write!(f, "Response"),
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Primitive, Serialize)]
pub enum OpCode {
    Query = 0,
    IQuery = 1,
    Status = 2,
    Notify = 4,
    Update = 5,
    DSO = 6,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Primitive, Serialize)]
pub enum RCode {
    NoError = 0,
    FormErr = 1,
    ServFail = 2,
    NXDomain = 3,
    NotImp = 4,
    Refused = 5,
    YXDomain = 6,
    YXRRSet = 7,
    NXRRSet = 8,
    NotAuth = 9,
    NotZone = 10,
    DSOTYPENI = 11,
}

/// Record types the decoder knows how to interpret
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum RecordType {
    A,
    CNAME,
    AAAA,
    Other(u16),
}

impl From<u16> for RecordType {
    fn from(code: u16) -> Self {
        match code {
            1 => RecordType::A,
            5 => RecordType::CNAME,
            28 => RecordType::AAAA,
            _ => RecordType::Other(code),
        }
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::CNAME => write!(f, "CNAME"),
            RecordType::AAAA => write!(f, "AAAA"),
            RecordType::Other(_) => write!(f, "OTHER"),
        }
    }
}
