//! Per-stream analysis over a whole capture.
//!
//! Failures are scoped to the stream they occur in: one stream that cannot
//! be analyzed is reported as such and does not stop the others.

use crate::frame::{FrameConfig, FrameRecord, reconstruct_frames};
use crate::stream::{StreamKey, StreamMap};
use log::warn;
use serde::{Deserialize, Serialize};
use shared::error::Result;

/// Outcome of analyzing one stream.
#[derive(Debug, PartialEq)]
pub struct StreamReport {
    pub key: StreamKey,
    pub frames: Result<Vec<FrameRecord>>,
}

impl StreamReport {
    /// Totals over the stream's frames, `None` when analysis failed.
    pub fn summary(&self) -> Option<StreamSummary> {
        self.frames.as_ref().ok().map(|f| StreamSummary::from_frames(f))
    }
}

/// Aggregated quality metrics of one stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
    pub frames: usize,
    pub packets: usize,
    pub bytes: u64,
    pub loss: u64,
    pub out_of_order: u64,
    pub duplicates: u64,
}

impl StreamSummary {
    pub fn from_frames(frames: &[FrameRecord]) -> Self {
        frames.iter().fold(
            StreamSummary {
                frames: frames.len(),
                ..Default::default()
            },
            |mut acc, f| {
                acc.packets += f.packets;
                acc.bytes += f.bytes;
                acc.loss += f.ploss;
                acc.out_of_order += f.porder;
                acc.duplicates += f.pdups;
                acc
            },
        )
    }
}

/// Analyze the requested streams, one report per key in request order.
pub fn analyze_streams(
    streams: &StreamMap,
    keys: &[StreamKey],
    config: &FrameConfig,
) -> Vec<StreamReport> {
    keys.iter()
        .map(|key| {
            let frames = reconstruct_frames(streams, &key.address, key.ssrc, config);
            if let Err(err) = &frames {
                warn!("skipping stream {} ssrc {}: {}", key.address, key.ssrc, err);
            }
            StreamReport {
                key: key.clone(),
                frames,
            }
        })
        .collect()
}

/// Analyze every stream of the capture.
pub fn analyze_all(streams: &StreamMap, config: &FrameConfig) -> Vec<StreamReport> {
    let keys: Vec<StreamKey> = streams.keys().collect();
    analyze_streams(streams, &keys, config)
}
