//! rtpcap analyzer - per-stream quality metrics over parsed RTP captures.
//!
//! The crate takes packet records that an external parser already extracted
//! from a capture, groups them into streams keyed by source address and
//! SSRC, and reconstructs application video frames out of each stream.
//!
//! # Frames
//!
//! Consecutive packets sharing an RTP timestamp form one frame. For every
//! frame a [`FrameRecord`] is emitted carrying
//!
//! | Column | Meaning |
//! |--------|---------|
//! | `frame_time_relative`, `frame_time_epoch` | capture time of the first packet |
//! | `frame_time_intra_latency` | last packet epoch time minus first packet epoch time |
//! | `frame_time_inter_latency` | first packet epoch time minus the previous frame's |
//! | `rtp_timestamp`, `rtp_timestamp_inter_latency` | media timestamp and its delta |
//! | `packets`, `bytes` | packet count and summed wire length |
//! | `ploss`, `porder`, `pdups` | sequence classification against the running cursor |
//! | `frame_video_type` | `I` or `P`, see [`FrameTypePolicy`] |
//! | `rtp_seq_list` | sequence numbers in arrival order, pipe separated |
//!
//! # Quick Start
//!
//! ```ignore
//! use rtpcap_analyzer::{FrameConfig, StreamMap, reconstruct_frames};
//!
//! let streams = StreamMap::from_packets(packets);
//! let frames = reconstruct_frames(&streams, "192.0.2.1", 564448287, &FrameConfig::default())?;
//! ```
//!
//! Every function here is pure over its inputs; analyzing several streams
//! of one [`StreamMap`] in parallel only needs shared references.

#![warn(rust_2018_idioms)]

pub mod frame;
pub mod report;
pub mod stream;

pub use frame::{
    FrameConfig, FrameConfigBuilder, FrameRecord, FrameReconstructor, FrameType,
    FrameTypePolicy, reconstruct_frames,
};
pub use report::{StreamReport, StreamSummary, analyze_all, analyze_streams};
pub use stream::{StreamKey, StreamMap};
