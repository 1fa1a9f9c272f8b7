#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate enum_primitive_derive;

mod consts;
mod parser;

pub use parser::{
    parse_dns_message, parse_name, parse_question, parse_resource_record,
    parse_tcp_dns_message, DecoderState, DnsMessage, Question, RecordData, ResourceRecord,
    HEADER_LEN, MAX_LABELS,
};
pub use consts::{Flags, MessageType, OpCode, RCode, RecordType};
