use crate::dissectors::api;
use api::packet::{AppProtocol, Classification, Direction};

pub mod tcp;
pub mod udp;

/// Guess the application protocol from the port pair.
///
/// A well-known source port means the segment comes from the server, so it
/// wins over the destination port and is labelled a response.
pub fn classify(src_port: u16, dst_port: u16) -> Classification {
    match AppProtocol::from_port(src_port) {
        AppProtocol::Other => {}
        kind => {
            return Classification {
                kind,
                direction: Direction::Response,
            }
        }
    };

    match AppProtocol::from_port(dst_port) {
        AppProtocol::Other => Classification::default(),
        kind => Classification {
            kind,
            direction: Direction::Request,
        },
    }
}
