use super::config::FrameConfig;
use super::record::FrameRecord;
use crate::stream::StreamMap;
use log::{debug, trace};
use rtp::PacketRecord;
use rtp::sequence::classify;
use shared::error::Result;
use shared::util::join_seq_list;

/// Reference point of the previously emitted frame.
struct PreviousFrame {
    time_epoch: f64,
    rtp_timestamp: u32,
    loss: u64,
}

/// Groups the packets of one stream into video frames.
///
/// Consecutive packets sharing an RTP timestamp form a frame; a timestamp
/// change starts the next one. Packets of one frame are expected to be
/// contiguous in capture order, which holds once the capture has been split
/// by source address and SSRC.
#[derive(Debug, Default, Clone)]
pub struct FrameReconstructor {
    config: FrameConfig,
}

impl FrameReconstructor {
    pub fn new(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Reconstruct the frames of a capture-ordered packet list.
    ///
    /// The sequence cursor runs across frames: each frame is classified
    /// against the highest sequence number seen up to the previous frame,
    /// and the first frame starts without a cursor.
    pub fn reconstruct(&self, packets: &[PacketRecord]) -> Vec<FrameRecord> {
        let mut frames = Vec::new();
        let mut cursor = None;
        let mut previous: Option<PreviousFrame> = None;

        for (index, group) in packets
            .chunk_by(|a, b| a.rtp_timestamp == b.rtp_timestamp)
            .enumerate()
        {
            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };

            let seqs: Vec<u16> = group.iter().map(|p| p.rtp_seq).collect();
            let stats = classify(cursor, &seqs);
            cursor = stats.max_seq;

            // latencies are measured on epoch capture time
            let intra_latency = last.frame_time_epoch - first.frame_time_epoch;
            let (inter_latency, rtp_inter_latency, previous_loss) = match &previous {
                Some(prev) => (
                    first.frame_time_epoch - prev.time_epoch,
                    i64::from(first.rtp_timestamp) - i64::from(prev.rtp_timestamp),
                    prev.loss,
                ),
                None => (intra_latency, 0, 0),
            };

            let frame = FrameRecord {
                frame_time_relative: first.frame_time_relative,
                frame_time_epoch: first.frame_time_epoch,
                frame_time_intra_latency: intra_latency,
                frame_time_inter_latency: inter_latency,
                rtp_timestamp: first.rtp_timestamp,
                rtp_timestamp_inter_latency: rtp_inter_latency,
                packets: group.len(),
                ploss: stats.loss,
                porder: stats.out_of_order,
                pdups: stats.duplicates,
                bytes: group.iter().map(|p| u64::from(p.ip_len)).sum(),
                frame_video_type: self
                    .config
                    .video_type
                    .frame_type(index, group.len(), previous_loss),
                rtp_seq_list: join_seq_list(&seqs, self.config.separator),
            };
            trace!(
                "frame {} ts={} packets={} loss={} order={} dups={} type={}",
                index,
                frame.rtp_timestamp,
                frame.packets,
                frame.ploss,
                frame.porder,
                frame.pdups,
                frame.frame_video_type
            );

            previous = Some(PreviousFrame {
                time_epoch: first.frame_time_epoch,
                rtp_timestamp: first.rtp_timestamp,
                loss: stats.loss,
            });
            frames.push(frame);
        }

        frames
    }
}

/// Reconstruct the frames of the stream `(address, ssrc)`.
///
/// Fails with [`StreamNotFound`](shared::error::Error::StreamNotFound) when
/// the stream is not part of `streams`, and with
/// [`InvalidSeparator`](shared::error::Error::InvalidSeparator) for a
/// separator that would break the sequence list. An empty stream yields no
/// frames.
pub fn reconstruct_frames(
    streams: &StreamMap,
    address: &str,
    ssrc: u32,
    config: &FrameConfig,
) -> Result<Vec<FrameRecord>> {
    config.validate()?;
    let packets = streams.get(address, ssrc)?;
    let frames = FrameReconstructor::new(*config).reconstruct(packets);
    debug!(
        "stream {} ssrc {}: {} packets, {} frames",
        address,
        ssrc,
        packets.len(),
        frames.len()
    );
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameType, FrameTypePolicy};

    fn pkt(time: f64, seq: u16, timestamp: u32, len: u32) -> PacketRecord {
        PacketRecord {
            frame_time_relative: time,
            frame_time_epoch: 1_600_000_000.0 + time,
            ip_src: "192.0.2.1".to_owned(),
            ip_len: len,
            rtp_ssrc: 1,
            rtp_seq: seq,
            rtp_timestamp: timestamp,
            ..Default::default()
        }
    }

    #[test]
    fn test_reconstruct_empty() {
        assert!(FrameReconstructor::default().reconstruct(&[]).is_empty());
    }

    #[test]
    fn test_reconstruct_single_packet_frame() {
        let frames = FrameReconstructor::default().reconstruct(&[pkt(1.5, 10, 3000, 200)]);
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.frame_time_intra_latency, 0.0);
        assert_eq!(frame.frame_time_inter_latency, 0.0);
        assert_eq!(frame.rtp_timestamp_inter_latency, 0);
        assert_eq!(frame.packets, 1);
        assert_eq!(frame.bytes, 200);
        assert_eq!(frame.frame_video_type, FrameType::I);
        assert_eq!(frame.rtp_seq_list, "10");
    }

    #[test]
    fn test_reconstruct_groups_by_timestamp() {
        let packets = vec![
            pkt(0.0, 1, 3000, 100),
            pkt(0.5, 2, 3000, 100),
            pkt(1.0, 3, 6000, 50),
            pkt(2.0, 4, 9000, 60),
            pkt(2.25, 5, 9000, 70),
        ];
        let frames = FrameReconstructor::default().reconstruct(&packets);

        assert_eq!(frames.len(), 3);
        assert_eq!(
            frames.iter().map(|f| f.packets).collect::<Vec<_>>(),
            vec![2, 1, 2]
        );
        assert_eq!(
            frames.iter().map(|f| f.bytes).collect::<Vec<_>>(),
            vec![200, 50, 130]
        );
        assert_eq!(frames[0].frame_time_inter_latency, 0.5);
        assert_eq!(frames[1].frame_time_inter_latency, 1.0);
        assert_eq!(frames[2].frame_time_inter_latency, 1.0);
        assert_eq!(frames[2].frame_time_intra_latency, 0.25);
        assert_eq!(frames[1].rtp_timestamp_inter_latency, 3000);
        assert_eq!(frames[2].rtp_timestamp_inter_latency, 3000);
        assert_eq!(
            frames
                .iter()
                .map(|f| f.frame_video_type)
                .collect::<Vec<_>>(),
            vec![FrameType::I, FrameType::P, FrameType::P]
        );
        assert_eq!(frames[2].rtp_seq_list, "4|5");
    }

    #[test]
    fn test_reconstruct_threads_cursor_across_frames() {
        let packets = vec![
            pkt(0.0, 100, 3000, 10),
            pkt(0.1, 101, 3000, 10),
            // 102 lost at the frame boundary
            pkt(0.2, 103, 6000, 10),
            pkt(0.3, 104, 6000, 10),
            // 101 again, behind the cursor
            pkt(0.4, 101, 9000, 10),
            pkt(0.5, 105, 9000, 10),
        ];
        let frames = FrameReconstructor::default().reconstruct(&packets);

        assert_eq!(frames.len(), 3);
        assert_eq!((frames[0].ploss, frames[0].porder, frames[0].pdups), (0, 0, 0));
        assert_eq!((frames[1].ploss, frames[1].porder, frames[1].pdups), (1, 0, 0));
        assert_eq!((frames[2].ploss, frames[2].porder, frames[2].pdups), (0, 1, 0));
    }

    #[test]
    fn test_reconstruct_latency_uses_epoch_time() {
        let mut first = pkt(0.0, 1, 3000, 10);
        let mut second = pkt(0.0, 2, 3000, 10);
        let mut third = pkt(0.0, 3, 6000, 10);
        first.frame_time_epoch = 100.0;
        second.frame_time_epoch = 100.5;
        third.frame_time_epoch = 102.0;

        let frames = FrameReconstructor::default().reconstruct(&[first, second, third]);
        assert_eq!(frames[0].frame_time_intra_latency, 0.5);
        assert_eq!(frames[0].frame_time_inter_latency, 0.5);
        assert_eq!(frames[1].frame_time_intra_latency, 0.0);
        assert_eq!(frames[1].frame_time_inter_latency, 2.0);
        assert_eq!(frames[1].frame_time_relative, 0.0);
    }

    #[test]
    fn test_reconstruct_rtp_timestamp_regression() {
        let packets = vec![pkt(0.0, 1, 9000, 10), pkt(0.1, 2, 6000, 10)];
        let frames = FrameReconstructor::default().reconstruct(&packets);
        assert_eq!(frames[1].rtp_timestamp_inter_latency, -3000);
    }

    #[test]
    fn test_reconstruct_after_loss_policy() {
        let config = FrameConfig {
            video_type: FrameTypePolicy::AfterLoss,
            ..Default::default()
        };
        let packets = vec![
            pkt(0.0, 1, 3000, 10),
            pkt(0.1, 3, 6000, 10),
            pkt(0.2, 4, 9000, 10),
            pkt(0.3, 5, 12000, 10),
        ];
        let types: Vec<FrameType> = FrameReconstructor::new(config)
            .reconstruct(&packets)
            .iter()
            .map(|f| f.frame_video_type)
            .collect();
        assert_eq!(types, vec![FrameType::I, FrameType::P, FrameType::I, FrameType::P]);
    }

    #[test]
    fn test_reconstruct_custom_separator() {
        let config = FrameConfig {
            separator: ':',
            ..Default::default()
        };
        let packets = vec![pkt(0.0, 65535, 3000, 10), pkt(0.1, 0, 3000, 10)];
        let frames = FrameReconstructor::new(config).reconstruct(&packets);
        assert_eq!(frames[0].rtp_seq_list, "65535:0");
        assert_eq!(frames[0].seq_list(':').unwrap(), vec![65535, 0]);
        assert_eq!(frames[0].ploss, 0);
    }
}
