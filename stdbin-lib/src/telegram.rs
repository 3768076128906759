//! Wire level pieces of a navigation telegram.
//!
//! A telegram is a header followed by up to three bitmask-selected runs of data blocks
//! and a 4 byte additive checksum trailer. Everything on the wire is big-endian.
pub mod blocks;
pub mod checksum;
pub mod cursor;
pub mod header;

pub use blocks::{
    Attitude, CourseSpeed, ExtendedBlock, ExtendedNavigationData, ExternalBlock, ExternalData,
    Geographic, GnssQuality, GnssRecord, HeaveSurgeSwaySpeed, Horizontal, NavBlock,
    NavigationData, Position, PositionStdDev, Quaternion, RealTimeHeave, SmartHeave, SystemDate,
    Temperatures, Utc, Vec3,
};
pub use checksum::{checksum, Checksum, CHECKSUM_LEN};
pub use cursor::ByteCursor;
pub use header::{Header, HeaderV2, HeaderV3, HeaderV5, PREFIX_LEN, SYNC_MARKER};
