//! Video frame reconstruction.
//!
//! - [`FrameReconstructor`]: groups a stream's packets into frames and
//!   derives latency, size and sequence metrics per frame.
//! - [`FrameConfig`]: output separator and [`FrameTypePolicy`].
//! - [`FrameRecord`]: one output row per reconstructed frame.

mod config;
mod reconstructor;
mod record;

pub use config::{FrameConfig, FrameConfigBuilder, FrameType, FrameTypePolicy};
pub use reconstructor::{FrameReconstructor, reconstruct_frames};
pub use record::FrameRecord;
