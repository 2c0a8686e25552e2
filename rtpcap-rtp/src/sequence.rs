//! Loss, reordering and duplicate classification over RTP sequence numbers.
//!
//! The analysis is a pure function of a cursor (the highest sequence number
//! seen before the batch) and the batch itself, in arrival order. The
//! returned [`SequenceStats::max_seq`] is the cursor for the next batch of
//! the same stream, so callers thread it explicitly instead of keeping
//! state around.

use serde::{Deserialize, Serialize};
use shared::error::{Error, Result};
use std::collections::HashSet;

/// Half of the 16-bit sequence space. A forward distance below this is
/// "ahead" of the high-water mark, anything else is "behind" it.
const UINT16_SIZE_HALF: u16 = 1 << 15;

/// Result of classifying a batch of sequence numbers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStats {
    /// Packets missing between the cursor and the high-water mark, net of
    /// late arrivals that filled a gap.
    pub loss: u64,
    /// Packets that arrived behind the high-water mark.
    pub out_of_order: u64,
    /// Packets repeating the high-water mark or the packet just before them.
    pub duplicates: u64,
    /// High-water mark after the batch, to be passed as the next cursor.
    /// `None` only when both the cursor and the batch were empty.
    pub max_seq: Option<u16>,
}

/// Classify `batch` against `cursor`.
///
/// Without a cursor the first element of the batch becomes the baseline and
/// is never counted as lost, reordered or duplicated.
///
/// A packet is a duplicate when it equals the current high-water mark or
/// the packet that arrived right before it. Older repeats are counted as
/// out of order; a wider dedup window would need the full arrival history.
pub fn classify(cursor: Option<u16>, batch: &[u16]) -> SequenceStats {
    let (base, rest) = match (cursor, batch.split_first()) {
        (Some(cursor), _) => (cursor, batch),
        (None, Some((first, rest))) => (*first, rest),
        (None, None) => return SequenceStats::default(),
    };

    let mut stats = SequenceStats::default();
    let mut high = base;
    let mut prev = base;
    // unwrapped forward distance from base to high
    let mut span: u64 = 0;
    // sequence numbers received in this batch, so a gap is only filled once
    let mut received = HashSet::from([base]);

    for &seq in rest {
        let diff = seq.wrapping_sub(high);
        if diff == 0 || seq == prev {
            stats.duplicates += 1;
        } else if diff < UINT16_SIZE_HALF {
            stats.loss += u64::from(diff - 1);
            span += u64::from(diff);
            high = seq;
            received.insert(seq);
        } else {
            stats.out_of_order += 1;
            // the first late copy inside (base, high) fills one of the counted gaps
            let behind = u64::from(high.wrapping_sub(seq));
            if behind < span && received.insert(seq) && stats.loss > 0 {
                stats.loss -= 1;
            }
        }
        prev = seq;
    }

    stats.max_seq = Some(high);
    stats
}

/// Validate a raw integer as a 16-bit sequence number.
pub fn validate(value: i64) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::InvalidSequenceNumber(value))
}

/// [`classify`] over unchecked integers, failing on the first value that is
/// not a valid sequence number.
pub fn classify_raw(cursor: Option<i64>, batch: &[i64]) -> Result<SequenceStats> {
    let cursor = cursor.map(validate).transpose()?;
    let batch = batch
        .iter()
        .map(|&v| validate(v))
        .collect::<Result<Vec<u16>>>()?;
    Ok(classify(cursor, &batch))
}
