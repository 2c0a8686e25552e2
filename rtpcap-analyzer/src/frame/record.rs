use super::config::FrameType;
use serde::{Deserialize, Serialize};
use shared::error::Result;
use shared::util::split_seq_list;

/// One reconstructed video frame.
///
/// Fields are declared in output column order, see [`FrameRecord::FIELDS`].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Relative capture time of the first packet
    pub frame_time_relative: f64,
    /// Epoch capture time of the first packet
    pub frame_time_epoch: f64,
    /// Epoch time between the first and the last packet of the frame
    pub frame_time_intra_latency: f64,
    /// Epoch time since the first packet of the previous frame
    pub frame_time_inter_latency: f64,
    pub rtp_timestamp: u32,
    /// RTP timestamp delta to the previous frame, 0 for the first one
    pub rtp_timestamp_inter_latency: i64,
    pub packets: usize,
    pub ploss: u64,
    pub porder: u64,
    pub pdups: u64,
    /// Sum of wire lengths
    pub bytes: u64,
    pub frame_video_type: FrameType,
    /// Sequence numbers in arrival order, joined by the configured separator
    pub rtp_seq_list: String,
}

impl FrameRecord {
    pub const FIELDS: [&'static str; 13] = [
        "frame_time_relative",
        "frame_time_epoch",
        "frame_time_intra_latency",
        "frame_time_inter_latency",
        "rtp_timestamp",
        "rtp_timestamp_inter_latency",
        "packets",
        "ploss",
        "porder",
        "pdups",
        "bytes",
        "frame_video_type",
        "rtp_seq_list",
    ];

    /// Render the record as one row of [`FrameRecord::FIELDS`] values.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.frame_time_relative.to_string(),
            self.frame_time_epoch.to_string(),
            self.frame_time_intra_latency.to_string(),
            self.frame_time_inter_latency.to_string(),
            self.rtp_timestamp.to_string(),
            self.rtp_timestamp_inter_latency.to_string(),
            self.packets.to_string(),
            self.ploss.to_string(),
            self.porder.to_string(),
            self.pdups.to_string(),
            self.bytes.to_string(),
            self.frame_video_type.to_string(),
            self.rtp_seq_list.clone(),
        ]
    }

    /// Parse the rendered sequence list back into sequence numbers.
    pub fn seq_list(&self, separator: char) -> Result<Vec<u16>> {
        split_seq_list(&self.rtp_seq_list, separator)
    }
}
