use crate::message::MessageKind;

/// Crate level errors.
///
/// These stop a replay or stream context. Per-telegram problems are reported as
/// [DecodeError]s on the decoded [Message](crate::Message) instead.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The stream reassembler could not find a telegram within its attempt budget.
    #[error("gave up resynchronizing after {attempts} attempts")]
    RetryBudgetExhausted { attempts: usize },

    /// A declared telegram size larger than the configured maximum buffer.
    #[error("declared telegram size {declared} exceeds maximum {max}")]
    Oversized { declared: usize, max: usize },

    /// A declared telegram size too small to even hold the header.
    #[error("declared telegram size {declared} is smaller than the minimum {minimum}")]
    Undersized { declared: usize, minimum: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a single telegram failed to decode, or decoded but is not valid.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeError {
    /// No `IX` sync marker at the start of the buffer.
    #[error("sync marker not found")]
    NotSynchronized,

    #[error("unsupported message kind {0}")]
    UnsupportedMessageKind(MessageKind),

    #[error("unknown protocol version {0}")]
    UnknownProtocolVersion(u8),

    /// Extended navigation bitmask other than 0 or 0b111.
    #[error("anomalous extended navigation bitmask {0:#010x}")]
    AnomalousExtendedMask(u32),

    #[error("bad checksum: claimed {claimed}, calculated {calculated}")]
    BadChecksum { claimed: u32, calculated: u32 },

    /// Not enough bytes for a required field.
    #[error("short read: needed {needed} bytes but only {available} available")]
    ShortRead {
        /// Width of the field being read
        needed: usize,
        /// Bytes that were left in the buffer
        available: usize,
    },
}

impl DecodeError {
    #[must_use]
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            Self::NotSynchronized => DecodeErrorKind::NotSynchronized,
            Self::UnsupportedMessageKind(_) => DecodeErrorKind::UnsupportedMessageKind,
            Self::UnknownProtocolVersion(_) => DecodeErrorKind::UnknownProtocolVersion,
            Self::AnomalousExtendedMask(_) => DecodeErrorKind::AnomalousExtendedMask,
            Self::BadChecksum { .. } => DecodeErrorKind::BadChecksum,
            Self::ShortRead { .. } => DecodeErrorKind::ShortRead,
        }
    }

    /// Number of bytes missing for a [DecodeError::ShortRead], otherwise `None`.
    #[must_use]
    pub fn shortfall(&self) -> Option<usize> {
        match self {
            Self::ShortRead { needed, available } => Some(needed - available),
            _ => None,
        }
    }
}

/// Field-less tag for a [DecodeError], useful as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeErrorKind {
    NotSynchronized,
    UnsupportedMessageKind,
    UnknownProtocolVersion,
    AnomalousExtendedMask,
    BadChecksum,
    ShortRead,
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotSynchronized => "not-synchronized",
            Self::UnsupportedMessageKind => "unsupported-message-kind",
            Self::UnknownProtocolVersion => "unknown-protocol-version",
            Self::AnomalousExtendedMask => "anomalous-extended-mask",
            Self::BadChecksum => "bad-checksum",
            Self::ShortRead => "short-read",
        };
        write!(f, "{s}")
    }
}
