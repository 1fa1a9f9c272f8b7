use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use crossbeam_channel::Receiver;
use tracing::{info, warn};

use crate::capture::Frame;
use crate::output::Printer;
use crate::packet::Packet;

pub struct PktThread {
    exit: Arc<AtomicBool>,
    receiver: Receiver<Frame>,
    printer: Printer,
}

impl PktThread {
    pub fn new(exit: Arc<AtomicBool>, receiver: Receiver<Frame>, printer: Printer) -> Self {
        Self {
            exit,
            receiver,
            printer,
        }
    }

    pub fn name(&self) -> String {
        "framesniff-pkt".to_string()
    }

    /// Decode and print frames in arrival order until the channel closes
    pub fn spawn<W: Write>(&self, out: &mut W) -> Result<u64> {
        info!("{} started", self.name());

        let mut index = 0;
        while !self.exit.load(Ordering::Relaxed) {
            let frame = match self.receiver.recv() {
                Err(_) => break,
                Ok(frame) => frame,
            };

            let pkt = Packet::dissect(&frame.data);
            if let Some(e) = &pkt.error {
                warn!("packet {}: {}", index, e);
            }
            self.printer.print(out, index, &frame, &pkt)?;
            index += 1;
        }
        out.flush()?;

        info!("{} exit, {} packets decoded", self.name(), index);
        Ok(index)
    }
}
