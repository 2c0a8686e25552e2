use std::io;
use std::num::ParseIntError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Sequence number outside the 16-bit RTP space.
    #[error("sequence number {0} out of range [0, 65535]")]
    InvalidSequenceNumber(i64),
    /// Token of a rendered sequence list that is not an integer.
    #[error("invalid sequence token {0:?}: {1}")]
    InvalidSequenceToken(String, ParseIntError),
    /// Packet record without a required attribute.
    #[error("packet record missing attribute: {0}")]
    MissingAttribute(&'static str),
    /// Packet record whose attributes have the wrong shape.
    #[error("invalid packet record: {0}")]
    InvalidPacketRecord(String),
    #[error("stream not found: address {address} ssrc {ssrc}")]
    StreamNotFound { address: String, ssrc: u32 },
    /// Stream with at least one packet record rejected at ingestion.
    #[error("stream address {address} ssrc {ssrc} has invalid packet records: {reason}")]
    InvalidStream {
        address: String,
        ssrc: u32,
        reason: String,
    },
    /// Sequence list separator that cannot be told apart from the numbers
    /// or the row it is written into.
    #[error("invalid sequence list separator {0:?}")]
    InvalidSeparator(char),

    #[error("{0}")]
    Io(#[source] IoError),
    #[error("json: {0}")]
    Json(String),
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error belongs to the invalid input class, i.e. the
    /// caller handed over malformed sequence numbers or packet records.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidSequenceNumber(_)
                | Error::InvalidSequenceToken(..)
                | Error::MissingAttribute(_)
                | Error::InvalidPacketRecord(_)
                | Error::InvalidStream { .. }
                | Error::InvalidSeparator(_)
        )
    }
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

// Workaround for wanting PartialEq for io::Error.
impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(IoError(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e.to_string())
    }
}
