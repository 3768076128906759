use super::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::message::{MessageKind, ValidityTime};

/// Marker at the start of every navigation output telegram.
pub const SYNC_MARKER: [u8; 2] = *b"IX";

/// Bytes consumed by the marker and protocol version byte.
pub const PREFIX_LEN: usize = 3;

/// Protocol version 2 header; has no extended navigation bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderV2 {
    pub nav_block_mask: u32,
    pub external_block_mask: u32,
    pub total_telegram_size: u16,
    pub validity_time: ValidityTime,
    pub counter: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderV3 {
    pub nav_block_mask: u32,
    pub extended_nav_block_mask: u32,
    pub external_block_mask: u32,
    pub total_telegram_size: u16,
    pub validity_time: ValidityTime,
    pub counter: u32,
}

/// Protocol version 5 header, the only version currently produced by devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderV5 {
    pub nav_block_mask: u32,
    pub extended_nav_block_mask: u32,
    pub external_block_mask: u32,
    pub navigation_data_size: u16,
    pub total_telegram_size: u16,
    pub validity_time: ValidityTime,
    pub counter: u32,
}

/// Navigation output telegram header.
///
/// Each protocol version has its own layout, and each variant only carries the fields
/// its layout has. Use the accessors to get at the common fields regardless of version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    V2(HeaderV2),
    V3(HeaderV3),
    V5(HeaderV5),
}

impl HeaderV2 {
    pub const LEN: usize = PREFIX_LEN + 18;

    fn decode(cur: &mut ByteCursor) -> Result<Self, DecodeError> {
        Ok(Self {
            nav_block_mask: cur.read_u32()?,
            external_block_mask: cur.read_u32()?,
            total_telegram_size: cur.read_u16()?,
            validity_time: ValidityTime(cur.read_u32()?),
            counter: cur.read_u32()?,
        })
    }
}

impl HeaderV3 {
    pub const LEN: usize = PREFIX_LEN + 22;

    fn decode(cur: &mut ByteCursor) -> Result<Self, DecodeError> {
        Ok(Self {
            nav_block_mask: cur.read_u32()?,
            extended_nav_block_mask: cur.read_u32()?,
            external_block_mask: cur.read_u32()?,
            total_telegram_size: cur.read_u16()?,
            validity_time: ValidityTime(cur.read_u32()?),
            counter: cur.read_u32()?,
        })
    }
}

impl HeaderV5 {
    pub const LEN: usize = PREFIX_LEN + 24;
    /// Offset from the start of the telegram to the total telegram size field.
    pub const TOTAL_SIZE_OFFSET: usize = 17;

    fn decode(cur: &mut ByteCursor) -> Result<Self, DecodeError> {
        Ok(Self {
            nav_block_mask: cur.read_u32()?,
            extended_nav_block_mask: cur.read_u32()?,
            external_block_mask: cur.read_u32()?,
            navigation_data_size: cur.read_u16()?,
            total_telegram_size: cur.read_u16()?,
            validity_time: ValidityTime(cur.read_u32()?),
            counter: cur.read_u32()?,
        })
    }
}

impl Header {
    /// Parse a header from the current cursor position.
    ///
    /// The 2-byte marker decides the [MessageKind]. Only navigation output (`IX`) is
    /// parsed further; the other known kinds are rejected after the version byte has
    /// been read, and anything else means the cursor is not at a telegram boundary.
    ///
    /// # Errors
    /// * [DecodeError::NotSynchronized] if the marker is not a known kind. Nothing is
    ///   consumed in this case.
    /// * [DecodeError::UnsupportedMessageKind] for `CM` and `AN` telegrams.
    /// * [DecodeError::UnknownProtocolVersion] for versions other than 2, 3 and 5.
    /// * [DecodeError::ShortRead] if the buffer ends inside the header.
    pub fn parse(cur: &mut ByteCursor) -> Result<Self, DecodeError> {
        let start = cur.clone();
        let marker: [u8; 2] = match cur.read_bytes(2) {
            Ok(b) => [b[0], b[1]],
            Err(_) => return Err(DecodeError::NotSynchronized),
        };
        let kind = MessageKind::from_marker(marker);
        if kind == MessageKind::Unknown {
            *cur = start;
            return Err(DecodeError::NotSynchronized);
        }
        let version = cur.read_u8()?;
        if kind != MessageKind::OutputNav {
            return Err(DecodeError::UnsupportedMessageKind(kind));
        }

        match version {
            2 => Ok(Self::V2(HeaderV2::decode(cur)?)),
            3 => Ok(Self::V3(HeaderV3::decode(cur)?)),
            5 => Ok(Self::V5(HeaderV5::decode(cur)?)),
            v => Err(DecodeError::UnknownProtocolVersion(v)),
        }
    }

    #[must_use]
    pub fn version(&self) -> u8 {
        match self {
            Self::V2(_) => 2,
            Self::V3(_) => 3,
            Self::V5(_) => 5,
        }
    }

    /// Length of this header on the wire, including the marker and version.
    #[must_use]
    pub fn wire_len(&self) -> usize {
        match self {
            Self::V2(_) => HeaderV2::LEN,
            Self::V3(_) => HeaderV3::LEN,
            Self::V5(_) => HeaderV5::LEN,
        }
    }

    #[must_use]
    pub fn nav_block_mask(&self) -> u32 {
        match self {
            Self::V2(h) => h.nav_block_mask,
            Self::V3(h) => h.nav_block_mask,
            Self::V5(h) => h.nav_block_mask,
        }
    }

    /// Extended navigation bitmask; always 0 for v2.
    #[must_use]
    pub fn extended_nav_block_mask(&self) -> u32 {
        match self {
            Self::V2(_) => 0,
            Self::V3(h) => h.extended_nav_block_mask,
            Self::V5(h) => h.extended_nav_block_mask,
        }
    }

    #[must_use]
    pub fn external_block_mask(&self) -> u32 {
        match self {
            Self::V2(h) => h.external_block_mask,
            Self::V3(h) => h.external_block_mask,
            Self::V5(h) => h.external_block_mask,
        }
    }

    /// Navigation data size; only v5 carries one.
    #[must_use]
    pub fn navigation_data_size(&self) -> Option<u16> {
        match self {
            Self::V5(h) => Some(h.navigation_data_size),
            _ => None,
        }
    }

    #[must_use]
    pub fn total_telegram_size(&self) -> u16 {
        match self {
            Self::V2(h) => h.total_telegram_size,
            Self::V3(h) => h.total_telegram_size,
            Self::V5(h) => h.total_telegram_size,
        }
    }

    #[must_use]
    pub fn validity_time(&self) -> ValidityTime {
        match self {
            Self::V2(h) => h.validity_time,
            Self::V3(h) => h.validity_time,
            Self::V5(h) => h.validity_time,
        }
    }

    #[must_use]
    pub fn counter(&self) -> u32 {
        match self {
            Self::V2(h) => h.counter,
            Self::V3(h) => h.counter,
            Self::V5(h) => h.counter,
        }
    }
}
