use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::{atomic::AtomicBool, Arc};

use anyhow::{anyhow, Result};
use tracing::warn;
use yaml_rust::YamlLoader;

pub const DEFAULT_SNAPLEN: u32 = 65536;
pub const DEFAULT_PKT_CHANNEL_SIZE: u32 = 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub exit: Arc<AtomicBool>,
    /// Configure file dist location
    pub fpath: String,
    /// Live capture interface, empty means every interface
    pub interface: String,
    /// Offline pcap file, takes precedence over live capture
    pub pcap_file: String,
    /// Stop after this many packets, 0 means never
    pub max_packets: u64,
    pub snaplen: u32,
    pub pkt_channel_size: u32,
    pub json: bool,
    pub quiet: bool,
    pub verbose_mode: bool,
    pub doc: Yaml,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exit: Arc::new(AtomicBool::new(false)),
            fpath: String::new(),
            interface: String::new(),
            pcap_file: String::new(),
            max_packets: 0,
            snaplen: DEFAULT_SNAPLEN,
            pkt_channel_size: DEFAULT_PKT_CHANNEL_SIZE,
            json: false,
            quiet: false,
            verbose_mode: false,
            doc: Yaml::default(),
        }
    }
}

impl Config {
    /// Load settings from a yaml configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut s = String::new();
        File::open(path)
            .map_err(|e| anyhow!("Failed to open {}: {}", path.display(), e))?
            .read_to_string(&mut s)?;

        let mut config = Self::from_yaml_str(&s)?;
        config.fpath = path.display().to_string();
        Ok(config)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let mut docs = YamlLoader::load_from_str(s)?;
        if docs.is_empty() {
            return Ok(Self::default());
        }

        let mut config = Self::default();
        config.doc = Yaml(docs.remove(0));

        config.interface = config.get_str("capture.interface", "");
        config.snaplen =
            config.get_integer("capture.snaplen", DEFAULT_SNAPLEN as i64, 64, 262144) as u32;
        config.max_packets = config.get_integer("capture.max.packets", 0, 0, i64::MAX) as u64;
        config.pkt_channel_size = config.get_integer(
            "channel.pkt.size",
            DEFAULT_PKT_CHANNEL_SIZE as i64,
            1,
            1048576,
        ) as u32;
        config.json = config.get_boolean("output.json", false);

        Ok(config)
    }

    pub fn get_integer(&self, key: &str, default: i64, min: i64, max: i64) -> i64 {
        get_integer(self.doc.as_ref(), key, default, min, max)
    }

    pub fn get_str(&self, key: &str, default: &str) -> String {
        get_str(self.doc.as_ref(), key, default)
    }

    pub fn get_boolean(&self, key: &str, default: bool) -> bool {
        get_boolean(self.doc.as_ref(), key, default)
    }
}

#[derive(Clone, Debug)]
/// Simple wrapper struct to implement Default trait for yaml_rust::Yaml
pub struct Yaml(pub yaml_rust::Yaml);

impl Default for Yaml {
    fn default() -> Self {
        Self(yaml_rust::Yaml::Null)
    }
}

impl AsRef<yaml_rust::Yaml> for Yaml {
    fn as_ref(&self) -> &yaml_rust::Yaml {
        &self.0
    }
}

fn get_str(doc: &yaml_rust::Yaml, key: &str, default: &str) -> String {
    match &doc[key] {
        yaml_rust::Yaml::String(s) => s.clone(),
        yaml_rust::Yaml::BadValue => {
            warn!(
                "Option {} not found or bad string value, set {} to {:?}",
                key, key, default
            );
            default.to_string()
        }
        _ => {
            warn!(
                "Wrong value type for {}, expecting string, set {} to {:?}",
                key, key, default
            );
            default.to_string()
        }
    }
}

fn get_integer(doc: &yaml_rust::Yaml, key: &str, default: i64, min: i64, max: i64) -> i64 {
    match doc[key] {
        yaml_rust::Yaml::Integer(i) => {
            if i < min || i > max {
                warn!(
                    "Option {} is less/greater than min/max value {}/{}, set {} to {}",
                    key, min, max, key, default
                );
                default
            } else {
                i
            }
        }
        yaml_rust::Yaml::BadValue => {
            warn!(
                "Option {} not found or bad integer value, set {} to {}",
                key, key, default
            );
            default
        }
        _ => {
            warn!(
                "Wrong value type for {}, expecting integer, set {} to {}",
                key, key, default
            );
            default
        }
    }
}

fn get_boolean(doc: &yaml_rust::Yaml, key: &str, default: bool) -> bool {
    match doc[key] {
        yaml_rust::Yaml::Boolean(b) => b,
        yaml_rust::Yaml::BadValue => {
            warn!(
                "Option {} not found or bad boolean value, set {} to {}",
                key, key, default
            );
            default
        }
        _ => {
            warn!(
                "Wrong value type for {}, expecting boolean, set {} to {}",
                key, key, default
            );
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.snaplen, 65536);
        assert_eq!(cfg.max_packets, 0);
        assert!(!cfg.json);
    }

    #[test]
    fn from_yaml() -> Result<()> {
        let cfg = Config::from_yaml_str(
            r#"
capture.interface: "eth0"
capture.snaplen: 1518
capture.max.packets: 20
channel.pkt.size: 64
output.json: true
"#,
        )?;
        assert_eq!(cfg.interface, "eth0");
        assert_eq!(cfg.snaplen, 1518);
        assert_eq!(cfg.max_packets, 20);
        assert_eq!(cfg.pkt_channel_size, 64);
        assert!(cfg.json);
        Ok(())
    }

    #[test]
    fn bad_values_fall_back() -> Result<()> {
        let cfg = Config::from_yaml_str("capture.snaplen: 1\nchannel.pkt.size: \"big\"")?;
        assert_eq!(cfg.snaplen, DEFAULT_SNAPLEN);
        assert_eq!(cfg.pkt_channel_size, DEFAULT_PKT_CHANNEL_SIZE);
        Ok(())
    }

    #[test]
    fn empty_document() -> Result<()> {
        let cfg = Config::from_yaml_str("")?;
        assert_eq!(cfg.snaplen, DEFAULT_SNAPLEN);
        Ok(())
    }

    #[test]
    fn integer_out_of_range_falls_back() -> Result<()> {
        let cfg = Config::from_yaml_str("capture.snaplen: 10\ncapture.max.packets: -1")?;
        assert_eq!(cfg.snaplen, DEFAULT_SNAPLEN);
        assert_eq!(cfg.max_packets, 0);
        assert_eq!(cfg.get_integer("capture.snaplen", 1500, 1, 100), 10);
        Ok(())
    }

    #[test]
    fn wrong_type_falls_back() -> Result<()> {
        let cfg = Config::from_yaml_str("output.json: \"yes\"\ncapture.interface: 3")?;
        assert!(!cfg.json);
        assert!(cfg.interface.is_empty());
        Ok(())
    }

    #[test]
    fn missing_key_falls_back() -> Result<()> {
        let cfg = Config::from_yaml_str("other: 1")?;
        assert_eq!(cfg.get_str("capture.interface", "eth0"), "eth0");
        assert!(cfg.get_boolean("output.json", true));
        assert_eq!(cfg.get_integer("capture.snaplen", 1500, 64, 262144), 1500);
        Ok(())
    }

    #[test]
    fn missing_file() {
        assert!(Config::from_file("/nonexistent/framesniff.yaml").is_err());
    }
}
