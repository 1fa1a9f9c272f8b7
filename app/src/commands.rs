use clap::{App, Arg};

/// Avaliable command line arguments
pub enum CliArg {
    Config,
    Count,
    Interface,
    Json,
    PcapFile,
    Quiet,
    Verbose,
}

impl CliArg {
    pub fn as_str(&self) -> &str {
        match self {
            &CliArg::Config => "config",
            &CliArg::Count => "count",
            &CliArg::Interface => "interface",
            &CliArg::Json => "json",
            &CliArg::PcapFile => "pcap-file",
            &CliArg::Quiet => "quiet",
            &CliArg::Verbose => "verbose",
        }
    }
}

/// Construct a new clap root command
pub fn new_root_command<'a>() -> clap::App<'a, 'static> {
    let root_cmd = App::new(crate_name!())
        .version(crate_version!())
        .about("Decode Ethernet frames down to DNS and HTTP")
        .args(&[
            Arg::with_name(CliArg::Config.as_str())
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Use a specific config file")
                .takes_value(true),
            Arg::with_name(CliArg::Count.as_str())
                .short("n")
                .long("count")
                .value_name("N")
                .help("Stop after N packets, 0 means never")
                .takes_value(true),
            Arg::with_name(CliArg::Interface.as_str())
                .short("i")
                .long("interface")
                .value_name("IFACE")
                .help("Capture on this interface only")
                .takes_value(true)
                .conflicts_with(CliArg::PcapFile.as_str()),
            Arg::with_name(CliArg::Json.as_str())
                .long("json")
                .help("Print one JSON object per packet"),
            Arg::with_name(CliArg::PcapFile.as_str())
                .short("r")
                .long("pcap-file")
                .value_name("PCAP-FILE")
                .help("Offline pcap file")
                .takes_value(true)
                .conflicts_with(CliArg::Interface.as_str()),
            Arg::with_name(CliArg::Quiet.as_str())
                .short("q")
                .long("quiet")
                .help("Turn off info level logging"),
            Arg::with_name(CliArg::Verbose.as_str())
                .short("v")
                .long("verbose")
                .help("Turn on all debugging")
                .conflicts_with(CliArg::Quiet.as_str()),
        ]);

    return root_cmd;
}
