#[macro_use]
extern crate clap;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use crossbeam_channel::bounded;
use tracing::{error, info};

mod capture;
mod commands;
mod config;
mod output;
mod packet;
mod threadings;

fn main() -> Result<()> {
    let root_cmd = commands::new_root_command();
    let matches = root_cmd.get_matches();

    let cfg = config::parse_args(&matches)?;

    tracing_subscriber::fmt()
        .with_max_level(config::log_level(&cfg))
        .with_writer(std::io::stderr)
        .init();

    if !cfg.fpath.is_empty() {
        info!("loaded configuration from {}", cfg.fpath);
    }

    signal_hook::flag::register(signal_hook::consts::SIGTERM, cfg.exit.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, cfg.exit.clone())?;

    let cfg = Arc::new(cfg);
    let source = capture::open(&cfg)?;

    let (sender, receiver) = bounded(cfg.pkt_channel_size as usize);
    let rx_thread = threadings::RxThread::new(cfg.exit.clone(), sender, cfg.max_packets);
    let pkt_thread = threadings::PktThread::new(
        cfg.exit.clone(),
        receiver,
        output::Printer::new(cfg.json),
    );

    let builder = std::thread::Builder::new().name(pkt_thread.name());
    let pkt_handle = builder.spawn(move || {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        pkt_thread.spawn(&mut out)
    })?;

    let builder = std::thread::Builder::new().name(rx_thread.name());
    let rx_handle = builder.spawn(move || rx_thread.spawn(source))?;

    let mut result = Ok(());
    for (name, joined) in vec![
        ("rx", rx_handle.join()),
        ("pkt", pkt_handle.join()),
    ] {
        match joined {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                cfg.exit.store(true, Ordering::SeqCst);
                error!("{} thread failed: {}", name, e);
                result = Err(anyhow!("{} thread failed: {}", name, e));
            }
            Err(e) => {
                cfg.exit.store(true, Ordering::SeqCst);
                error!("{} thread panicked: {:?}", name, e);
                result = Err(anyhow!("{} thread panicked", name));
            }
        }
    }

    result
}
