#![warn(rust_2018_idioms)]

pub mod conversation;
pub mod units;

pub use conversation::{IpFamily, UdpConversation, parse_udp_conversations};
pub use units::parse_byte_count;
