use anyhow::{anyhow, Result};
use tracing::Level;

use framesniff_api as api;
use api::config::Config;

use super::commands::CliArg;

/// Parse command line arguments and set configuration
pub fn parse_args(matches: &clap::ArgMatches) -> Result<Config> {
    let mut config = match matches.value_of(CliArg::Config.as_str()) {
        Some(config_file) => Config::from_file(config_file)?,
        None => Config::default(),
    };

    set_config_by_cli_args(&mut config, matches)?;

    Ok(config)
}

/// Use command arguments overrides config file settings
fn set_config_by_cli_args(config: &mut Config, matches: &clap::ArgMatches) -> Result<()> {
    config.quiet = matches.is_present(CliArg::Quiet.as_str());
    config.verbose_mode = matches.is_present(CliArg::Verbose.as_str());

    if matches.is_present(CliArg::Json.as_str()) {
        config.json = true;
    }

    if let Some(interface) = matches.value_of(CliArg::Interface.as_str()) {
        config.interface = String::from(interface);
    }

    if let Some(pcap_file) = matches.value_of(CliArg::PcapFile.as_str()) {
        config.pcap_file = String::from(pcap_file);
    }

    if let Some(count) = matches.value_of(CliArg::Count.as_str()) {
        config.max_packets = count
            .parse()
            .map_err(|_| anyhow!("Invalid packet count: {}", count))?;
    }

    Ok(())
}

/// Log level selected by -q/-v
pub fn log_level(config: &Config) -> Level {
    if config.verbose_mode {
        Level::DEBUG
    } else if config.quiet {
        Level::WARN
    } else {
        Level::INFO
    }
}
