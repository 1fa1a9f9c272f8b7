use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};

use super::{CaptureSource, Frame};

/// Only ethernet framed captures are decoded
const LINKTYPE_ETHERNET: i32 = 1;

/// Read timeout of a live capture, the exit flag is checked in between
const READ_TIMEOUT_MS: i32 = 200;

fn check_link_type(link_type: pcap::Linktype) -> Result<()> {
    if link_type.0 != LINKTYPE_ETHERNET {
        return Err(anyhow!(
            "Unsupported link type {}, only ethernet is supported",
            link_type.0
        ));
    }
    Ok(())
}

fn to_frame(pkt: &pcap::Packet) -> Frame {
    let ts = &pkt.header.ts;
    Frame {
        data: pkt.data.to_vec(),
        ts: Duration::from_secs(ts.tv_sec as u64) + Duration::from_micros(ts.tv_usec as u64),
    }
}

/// Offline pcap file
pub struct Offline {
    cap: pcap::Capture<pcap::Offline>,
}

impl Offline {
    pub fn try_from_path<P: AsRef<Path>>(path: P) -> Result<Offline> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(anyhow!("File {} does not exist", path.display()));
        }

        let cap = pcap::Capture::from_file(path)
            .map_err(|e| anyhow!("Failed to open {}: {}", path.display(), e))?;
        check_link_type(cap.get_datalink())?;
        Ok(Offline { cap })
    }
}

impl CaptureSource for Offline {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        match self.cap.next() {
            Ok(pkt) => Ok(Some(to_frame(&pkt))),
            Err(pcap::Error::NoMorePackets) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Live capture on one network interface
pub struct NetworkInterface {
    name: String,
    cap: pcap::Capture<pcap::Active>,
    exit: Arc<AtomicBool>,
}

impl NetworkInterface {
    /// Open `interface` in promiscuous mode, the default device when it is empty
    pub fn try_from_str<S: AsRef<str>>(
        interface: S,
        snaplen: u32,
        exit: Arc<AtomicBool>,
    ) -> Result<NetworkInterface> {
        let device = match interface.as_ref() {
            "" => pcap::Device::lookup()?,
            name => pcap::Device::from(name),
        };
        let name = device.name.clone();

        let cap = pcap::Capture::from_device(device)?
            .promisc(true)
            .snaplen(snaplen as i32)
            .timeout(READ_TIMEOUT_MS)
            .open()
            .map_err(|e| anyhow!("Failed to open {}: {}", name, e))?;
        check_link_type(cap.get_datalink())?;

        Ok(NetworkInterface { name, cap, exit })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CaptureSource for NetworkInterface {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        while !self.exit.load(Ordering::Relaxed) {
            match self.cap.next() {
                Ok(pkt) => return Ok(Some(to_frame(&pkt))),
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(e) => return Err(anyhow!("Failed to capture on {}: {}", self.name, e)),
            }
        }
        Ok(None)
    }
}
