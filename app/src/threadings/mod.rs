mod pkt;
mod rx;

pub use pkt::PktThread;
pub use rx::RxThread;
