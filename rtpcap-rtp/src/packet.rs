//! Parsed RTP packet records as delivered by the capture parser.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::{Error, Result};

use crate::sequence;

/// Attributes every packet record must carry.
pub const REQUIRED_ATTRIBUTES: &[&str] = &[
    "frame_number",
    "frame_time_relative",
    "frame_time_epoch",
    "ip_src",
    "ip_len",
    "rtp_p_type",
    "rtp_ssrc",
    "rtp_seq",
    "rtp_timestamp",
    "rtp_marker",
];

/// One captured RTP packet.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Capture frame number
    pub frame_number: u64,
    /// Capture time in seconds, relative to the start of the capture
    pub frame_time_relative: f64,
    /// Capture time in seconds since the unix epoch
    pub frame_time_epoch: f64,
    /// Source address
    pub ip_src: String,
    /// Wire length in bytes
    pub ip_len: u32,
    pub rtp_p_type: u8,
    pub rtp_ssrc: u32,
    pub rtp_seq: u16,
    /// Media clock timestamp
    pub rtp_timestamp: u32,
    pub rtp_marker: u8,
    /// RFC 5285 header extension data, when the packet carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtp_ext_rfc5285_data: Option<u64>,
}

impl PacketRecord {
    pub fn marker(&self) -> bool {
        self.rtp_marker != 0
    }

    pub fn has_extension(&self) -> bool {
        self.rtp_ext_rfc5285_data.is_some()
    }

    /// Build a record from a loosely-typed JSON object, reporting missing
    /// attributes and out of range sequence numbers before anything else.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::InvalidPacketRecord(format!("expected object, got {value}")))?;

        for &attr in REQUIRED_ATTRIBUTES {
            if obj.get(attr).is_none_or(Value::is_null) {
                return Err(Error::MissingAttribute(attr));
            }
        }

        if let Some(seq) = obj.get("rtp_seq").and_then(Value::as_i64) {
            sequence::validate(seq)?;
        }

        PacketRecord::deserialize(value).map_err(|e| Error::InvalidPacketRecord(e.to_string()))
    }

    /// Source address and SSRC of a loosely-typed record, when both are
    /// present and well formed. Used to pin a rejected record on its stream.
    pub fn stream_of(value: &Value) -> Option<(&str, u32)> {
        let address = value.get("ip_src")?.as_str()?;
        let ssrc = u32::try_from(value.get("rtp_ssrc")?.as_u64()?).ok()?;
        Some((address, ssrc))
    }

    /// Parse a JSON array of packet records, in capture order. Fails on the
    /// first invalid record; see `StreamMap::from_json` in the analyzer for
    /// ingestion that keeps failures per stream.
    pub fn parse_list(json: &str) -> Result<Vec<Self>> {
        let value: Value = serde_json::from_str(json)?;
        let items = value
            .as_array()
            .ok_or_else(|| Error::InvalidPacketRecord("expected an array of records".to_owned()))?;
        items.iter().map(Self::from_json_value).collect()
    }
}
