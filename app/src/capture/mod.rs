use std::time::Duration;

use anyhow::Result;
use tracing::info;

use framesniff_api as api;
use api::config::Config;

pub mod libpcap;

pub use libpcap::{NetworkInterface, Offline};

/// One captured link-layer frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub data: Vec<u8>,
    /// Capture time since the unix epoch
    pub ts: Duration,
}

pub trait CaptureSource: Send {
    /// Next frame, `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Open the capture source selected by the configuration, an offline file
/// when one is given, otherwise a live interface.
pub fn open(cfg: &Config) -> Result<Box<dyn CaptureSource>> {
    if !cfg.pcap_file.is_empty() {
        info!("reading packets from {}", cfg.pcap_file);
        return Ok(Box::new(Offline::try_from_path(&cfg.pcap_file)?));
    }

    let cap = NetworkInterface::try_from_str(&cfg.interface, cfg.snaplen, cfg.exit.clone())?;
    info!("capturing on {}", cap.name());
    Ok(Box::new(cap))
}
