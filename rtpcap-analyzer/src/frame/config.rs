use serde::{Deserialize, Serialize};
use shared::SEP;
use shared::error::Result;
use shared::util::validate_separator;
use std::fmt;
use std::str::FromStr;

/// Coarse video frame category.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameType {
    /// Key frame, decodable on its own.
    #[default]
    I,
    /// Delta frame, depends on earlier frames.
    P,
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameType::I => write!(f, "I"),
            FrameType::P => write!(f, "P"),
        }
    }
}

/// How frames get tagged as [`FrameType::I`] or [`FrameType::P`].
///
/// The first frame of a stream is always a key frame: nothing before it can
/// be referenced. What else counts as a resynchronization point depends on
/// the codec, which is not known here, so the extra signals are opt-in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameTypePolicy {
    /// Only the first frame is a key frame.
    #[default]
    FirstFrame,
    /// Frames of at least this many packets are key frames too.
    MinPackets(usize),
    /// The frame following one that saw packet loss is a key frame too.
    AfterLoss,
}

impl FrameTypePolicy {
    /// Tag the frame at `index` of a stream.
    pub fn frame_type(&self, index: usize, packets: usize, previous_loss: u64) -> FrameType {
        if index == 0 {
            return FrameType::I;
        }
        let resync = match *self {
            FrameTypePolicy::FirstFrame => false,
            FrameTypePolicy::MinPackets(min) => min > 0 && packets >= min,
            FrameTypePolicy::AfterLoss => previous_loss > 0,
        };
        if resync { FrameType::I } else { FrameType::P }
    }
}

impl FromStr for FrameTypePolicy {
    type Err = String;

    /// Accepts `first-frame`, `after-loss` and `min-packets=N`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first-frame" => Ok(FrameTypePolicy::FirstFrame),
            "after-loss" => Ok(FrameTypePolicy::AfterLoss),
            _ => match s.strip_prefix("min-packets=") {
                Some(n) => n
                    .parse()
                    .map(FrameTypePolicy::MinPackets)
                    .map_err(|e| format!("invalid packet count {n:?}: {e}")),
                None => Err(format!("unknown frame type policy {s:?}")),
            },
        }
    }
}

/// Configuration for the [`FrameReconstructor`](super::FrameReconstructor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Separator of the rendered sequence number list, see
    /// [`validate_separator`].
    pub separator: char,
    pub video_type: FrameTypePolicy,
}

impl FrameConfig {
    pub fn validate(&self) -> Result<()> {
        validate_separator(self.separator)?;
        Ok(())
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            separator: SEP,
            video_type: FrameTypePolicy::default(),
        }
    }
}

/// Builder for [`FrameConfig`].
///
/// # Example
///
/// ```ignore
/// use rtpcap_analyzer::{FrameConfigBuilder, FrameTypePolicy};
///
/// let config = FrameConfigBuilder::new()
///     .with_separator(':')
///     .with_video_type(FrameTypePolicy::MinPackets(20))
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct FrameConfigBuilder {
    config: FrameConfig,
}

impl FrameConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.config.separator = separator;
        self
    }

    pub fn with_video_type(mut self, policy: FrameTypePolicy) -> Self {
        self.config.video_type = policy;
        self
    }

    /// Build the configuration, rejecting an unusable separator.
    pub fn build(self) -> Result<FrameConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_policy() {
        let policy = FrameTypePolicy::FirstFrame;
        assert_eq!(policy.frame_type(0, 1, 0), FrameType::I);
        assert_eq!(policy.frame_type(1, 100, 5), FrameType::P);
        assert_eq!(policy.frame_type(7, 1, 0), FrameType::P);
    }

    #[test]
    fn test_min_packets_policy() {
        let policy = FrameTypePolicy::MinPackets(10);
        assert_eq!(policy.frame_type(0, 1, 0), FrameType::I);
        assert_eq!(policy.frame_type(3, 9, 0), FrameType::P);
        assert_eq!(policy.frame_type(3, 10, 0), FrameType::I);
        assert_eq!(FrameTypePolicy::MinPackets(0).frame_type(3, 10, 0), FrameType::P);
    }

    #[test]
    fn test_after_loss_policy() {
        let policy = FrameTypePolicy::AfterLoss;
        assert_eq!(policy.frame_type(1, 2, 0), FrameType::P);
        assert_eq!(policy.frame_type(1, 2, 1), FrameType::I);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("first-frame".parse::<FrameTypePolicy>(), Ok(FrameTypePolicy::FirstFrame));
        assert_eq!("after-loss".parse::<FrameTypePolicy>(), Ok(FrameTypePolicy::AfterLoss));
        assert_eq!("min-packets=12".parse::<FrameTypePolicy>(), Ok(FrameTypePolicy::MinPackets(12)));
        assert!("min-packets=x".parse::<FrameTypePolicy>().is_err());
        assert!("keyframe".parse::<FrameTypePolicy>().is_err());
    }

    #[test]
    fn test_builder() {
        assert_eq!(FrameConfigBuilder::new().build(), Ok(FrameConfig::default()));
        let config = FrameConfigBuilder::new()
            .with_separator(':')
            .with_video_type(FrameTypePolicy::AfterLoss)
            .build()
            .unwrap();
        assert_eq!(config.separator, ':');
        assert_eq!(config.video_type, FrameTypePolicy::AfterLoss);
    }

    #[test]
    fn test_builder_rejects_separator() {
        for sep in [',', '5', '-'] {
            assert_eq!(
                FrameConfigBuilder::new().with_separator(sep).build(),
                Err(shared::error::Error::InvalidSeparator(sep))
            );
        }
    }

    #[test]
    fn test_frame_type_display() {
        assert_eq!(FrameType::I.to_string(), "I");
        assert_eq!(FrameType::P.to_string(), "P");
    }
}
