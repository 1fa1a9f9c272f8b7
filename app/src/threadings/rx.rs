use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use crossbeam_channel::Sender;
use tracing::info;

use crate::capture::{CaptureSource, Frame};

/// RX Thread
pub struct RxThread {
    /// Exit flag
    exit: Arc<AtomicBool>,
    /// Stop after this many frames, 0 means never
    max_packets: u64,
    /// Total received packet count
    pub rx_count: u64,
    /// Packet channel sender
    sender: Sender<Frame>,
}

impl RxThread {
    pub fn new(exit: Arc<AtomicBool>, sender: Sender<Frame>, max_packets: u64) -> Self {
        Self {
            exit,
            max_packets,
            rx_count: 0,
            sender,
        }
    }

    pub fn name(&self) -> String {
        "framesniff-rx".to_string()
    }

    /// Forward frames until the source runs dry, the packet count is reached
    /// or the exit flag is raised. The channel closes when this returns.
    pub fn spawn(mut self, mut source: Box<dyn CaptureSource>) -> Result<u64> {
        info!("{} started", self.name());

        while !self.exit.load(Ordering::Relaxed) {
            if self.max_packets > 0 && self.rx_count >= self.max_packets {
                break;
            }

            let frame = match source.next_frame()? {
                Some(frame) => frame,
                None => break,
            };

            if self.sender.send(frame).is_err() {
                // packet thread is gone
                break;
            }
            self.rx_count += 1;
        }

        info!("{} exit, {} packets received", self.name(), self.rx_count);
        Ok(self.rx_count)
    }
}
