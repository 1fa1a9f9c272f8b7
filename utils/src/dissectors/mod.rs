//! Per-layer dissectors.
//!
//! Each dissector decodes one header out of the slice handed to it by the
//! layer below and returns a record borrowing that slice, with the payload to
//! pass to the next layer. Nothing is copied except the decoded fields.

use framesniff_api as api;

pub use api::error::Error;

pub mod link;
pub mod network;
pub mod transport;
