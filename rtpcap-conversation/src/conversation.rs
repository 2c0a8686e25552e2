//! Parser for the UDP conversation table of the capture summary tool.
//!
//! The table is framed by two lines of `=` characters:
//!
//! ```text
//! ================================================================================
//! UDP Conversations
//! Filter:<No Filter>
//!                                |       <-      | |       ->      | |     Total     |    Relative    |   Duration   |
//!                                | Frames  Bytes | | Frames  Bytes | | Frames  Bytes |      Start     |              |
//! 192.168.0.4:48588 <-> 157.240.22.60:40003    1 106bytes    1 150bytes    2 256bytes    20.469660000    0.0738
//! ================================================================================
//! ```
//!
//! Every data line becomes one [`UdpConversation`]. Counters are kept as the
//! original strings, see [`parse_byte_count`](crate::units::parse_byte_count)
//! for converting them.

use crate::units::parse_byte_count;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static CONVERSATION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(?P<laddr>\S+):(?P<lport>\d+)\s+<->\s+(?P<raddr>\S+):(?P<rport>\d+)",
        r"\s+(?P<rpkts>[\d,]+)\s+(?P<rbytes>\S+)",
        r"\s+(?P<lpkts>[\d,]+)\s+(?P<lbytes>\S+)",
        r"\s+(?P<tpkts>[\d,]+)\s+(?P<tbytes>\S+)",
        r"\s+(?P<start>[\d.]+)\s+(?P<duration>[\d.]+)\s*$",
    ))
    .expect("conversation line regex is valid")
});

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    #[default]
    Ip,
    Ipv6,
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::Ip => write!(f, "ip"),
            IpFamily::Ipv6 => write!(f, "ipv6"),
        }
    }
}

/// One line of the UDP conversation table.
///
/// The `r*` counters are the `<-` columns, `l*` the `->` columns and `t*`
/// the totals.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdpConversation {
    pub proto: IpFamily,
    pub laddr: String,
    pub lport: String,
    pub raddr: String,
    pub rport: String,
    pub rpkts: String,
    pub rbytes: String,
    pub lpkts: String,
    pub lbytes: String,
    pub tpkts: String,
    pub tbytes: String,
    /// Relative start time in seconds
    pub start: String,
    /// Duration in seconds
    pub duration: String,
}

impl UdpConversation {
    /// Parse a single data line of the table.
    pub fn parse_line(line: &str) -> Option<Self> {
        let caps = CONVERSATION_LINE.captures(line)?;
        let field = |name: &str| caps[name].to_owned();

        let laddr = field("laddr");
        let proto = if laddr.contains(':') {
            IpFamily::Ipv6
        } else {
            IpFamily::Ip
        };

        Some(Self {
            proto,
            laddr,
            lport: field("lport"),
            raddr: field("raddr"),
            rport: field("rport"),
            rpkts: field("rpkts"),
            rbytes: field("rbytes"),
            lpkts: field("lpkts"),
            lbytes: field("lbytes"),
            tpkts: field("tpkts"),
            tbytes: field("tbytes"),
            start: field("start"),
            duration: field("duration"),
        })
    }

    /// `(rbytes, lbytes, tbytes)` converted to byte counts.
    pub fn byte_counts(&self) -> (Option<u64>, Option<u64>, Option<u64>) {
        (
            parse_byte_count(&self.rbytes),
            parse_byte_count(&self.lbytes),
            parse_byte_count(&self.tbytes),
        )
    }
}

fn is_separator(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c == '=')
}

/// Parse the conversation table out of a report.
///
/// Only lines between the first two `=` separator lines are looked at.
/// Header lines and anything that does not look like a conversation are
/// skipped.
pub fn parse_udp_conversations(report: &str) -> Vec<UdpConversation> {
    report
        .lines()
        .skip_while(|line| !is_separator(line))
        .skip(1)
        .take_while(|line| !is_separator(line))
        .filter_map(|line| {
            let conv = UdpConversation::parse_line(line);
            if conv.is_none() && !line.trim().is_empty() {
                debug!("skipping conversation table line: {}", line.trim());
            }
            conv
        })
        .collect()
}
