#![warn(rust_2018_idioms)]

pub mod packet;
pub mod sequence;

pub use packet::PacketRecord;
pub use sequence::{SequenceStats, classify};
