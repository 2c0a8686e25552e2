//! Packet records demultiplexed by source address and SSRC.

use log::warn;
use rtp::PacketRecord;
use serde_json::Value;
use shared::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Identifies one RTP stream of a capture.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamKey {
    pub address: String,
    pub ssrc: u32,
}

impl StreamKey {
    pub fn new(address: impl Into<String>, ssrc: u32) -> Self {
        Self {
            address: address.into(),
            ssrc,
        }
    }
}

/// Capture-ordered packet records keyed first by source address, then by SSRC.
///
/// Iteration order over streams is deterministic (sorted by address, then
/// SSRC) so that reports built from the same capture always line up.
///
/// A stream with a record rejected at ingestion stays listed but is marked
/// failed: looking it up yields [`Error::InvalidStream`], the other streams
/// are unaffected.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StreamMap {
    streams: BTreeMap<String, BTreeMap<u32, Vec<PacketRecord>>>,
    failed: BTreeMap<StreamKey, String>,
}

impl StreamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group a capture-ordered packet list into streams, keeping the
    /// relative order of packets within each stream.
    pub fn from_packets(packets: impl IntoIterator<Item = PacketRecord>) -> Self {
        let mut map = Self::new();
        for pkt in packets {
            map.push(pkt);
        }
        map
    }

    /// Ingest a JSON array of loosely-typed packet records.
    ///
    /// Only a document that is not an array of records fails as a whole.
    /// Each invalid record marks its own stream failed, and records that
    /// cannot even be attributed to a stream are logged and dropped.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let items = value
            .as_array()
            .ok_or_else(|| Error::InvalidPacketRecord("expected an array of records".to_owned()))?;
        Ok(Self::from_json_values(items))
    }

    pub fn from_json_values(items: &[Value]) -> Self {
        let mut map = Self::new();
        for (index, item) in items.iter().enumerate() {
            match PacketRecord::from_json_value(item) {
                Ok(pkt) => map.push(pkt),
                Err(err) => match PacketRecord::stream_of(item) {
                    Some((address, ssrc)) => {
                        warn!("record {index} of {address} ssrc {ssrc} rejected: {err}");
                        map.mark_failed(StreamKey::new(address, ssrc), &err);
                    }
                    None => warn!("record {index} dropped, no stream to attribute it to: {err}"),
                },
            }
        }
        map
    }

    /// Mark a stream failed. The first reason recorded is kept.
    pub fn mark_failed(&mut self, key: StreamKey, err: &Error) {
        self.failed.entry(key).or_insert_with(|| err.to_string());
    }

    /// Append a packet to the end of its stream.
    pub fn push(&mut self, pkt: PacketRecord) {
        self.streams
            .entry(pkt.ip_src.clone())
            .or_default()
            .entry(pkt.rtp_ssrc)
            .or_default()
            .push(pkt);
    }

    /// Insert a whole stream, replacing any packets already stored under
    /// the same key.
    pub fn insert(&mut self, address: impl Into<String>, ssrc: u32, packets: Vec<PacketRecord>) {
        self.streams
            .entry(address.into())
            .or_default()
            .insert(ssrc, packets);
    }

    /// Packets of the stream `(address, ssrc)`.
    pub fn get(&self, address: &str, ssrc: u32) -> Result<&[PacketRecord]> {
        if let Some(reason) = self.failed.get(&StreamKey::new(address, ssrc)) {
            return Err(Error::InvalidStream {
                address: address.to_owned(),
                ssrc,
                reason: reason.clone(),
            });
        }
        self.streams
            .get(address)
            .and_then(|by_ssrc| by_ssrc.get(&ssrc))
            .map(Vec::as_slice)
            .ok_or_else(|| Error::StreamNotFound {
                address: address.to_owned(),
                ssrc,
            })
    }

    pub fn contains(&self, address: &str, ssrc: u32) -> bool {
        self.get(address, ssrc).is_ok()
    }

    /// Keys of all streams, failed ones included.
    pub fn keys(&self) -> impl Iterator<Item = StreamKey> + '_ {
        let keys: BTreeSet<StreamKey> = self
            .streams
            .iter()
            .flat_map(|(address, by_ssrc)| {
                by_ssrc
                    .keys()
                    .map(move |&ssrc| StreamKey::new(address.as_str(), ssrc))
            })
            .chain(self.failed.keys().cloned())
            .collect();
        keys.into_iter()
    }

    /// Number of streams, failed ones included.
    pub fn len(&self) -> usize {
        self.keys().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<BTreeMap<String, BTreeMap<u32, Vec<PacketRecord>>>> for StreamMap {
    fn from(streams: BTreeMap<String, BTreeMap<u32, Vec<PacketRecord>>>) -> Self {
        Self {
            streams,
            failed: BTreeMap::new(),
        }
    }
}
