//! Human readable rendering of fixed width addresses.

use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

use serde::{Serialize, Serializer};

/// Ethernet hardware address
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Build from the first 6 bytes of `buf`, caller guarantees the length
    #[inline]
    pub fn from_slice(buf: &[u8]) -> Self {
        let mut addr = [0u8; 6];
        addr.copy_from_slice(&buf[..6]);
        Self(addr)
    }
}

impl Display for MacAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Build an IPv4 address from the first 4 bytes of `buf`, caller guarantees the length
#[inline]
pub fn ipv4_from_slice(buf: &[u8]) -> Ipv4Addr {
    Ipv4Addr::new(buf[0], buf[1], buf[2], buf[3])
}

/// Render 16 raw bytes as compressed IPv6 text.
///
/// Groups lose their leading zeros, the first longest run of two or more zero
/// groups is blanked out, and finally every run of three or more identical
/// characters is squeezed down to two. The last pass is what turns the blanked
/// groups into `::`; it is applied to the whole string, hex digits included.
pub fn format_ipv6(addr: &[u8; 16]) -> String {
    let mut groups = addr
        .chunks(2)
        .map(|g| format!("{:x}", u16::from_be_bytes([g[0], g[1]])))
        .collect::<Vec<_>>();

    if let Some((start, len)) = longest_zero_run(&groups) {
        for g in &mut groups[start..start + len] {
            g.clear();
        }
    }

    reduce_lengthening(&groups.join(":"))
}

/// Start and length of the first longest run of "0" groups, if it is at least 2 long
fn longest_zero_run(groups: &[String]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut run_start = 0;
    let mut run_len = 0;

    for (i, g) in groups.iter().enumerate() {
        if g == "0" {
            if run_len == 0 {
                run_start = i;
            }
            run_len += 1;
            // strictly longer, so ties keep the leftmost run
            if run_len > best.map_or(0, |(_, len)| len) {
                best = Some((run_start, run_len));
            }
        } else {
            run_len = 0;
        }
    }

    best.filter(|(_, len)| *len >= 2)
}

/// Collapse every run of 3+ identical characters down to 2
fn reduce_lengthening(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev = None;
    let mut repeat = 0;

    for c in s.chars() {
        if Some(c) == prev {
            repeat += 1;
        } else {
            prev = Some(c);
            repeat = 1;
        }
        if repeat <= 2 {
            out.push(c);
        }
    }
    out
}
