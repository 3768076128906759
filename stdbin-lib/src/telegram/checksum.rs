use crate::error::DecodeError;

/// Size of the checksum trailer in bytes.
pub const CHECKSUM_LEN: usize = 4;

/// Sum of all bytes in `dat`, wrapping on overflow.
#[must_use]
pub fn checksum(dat: &[u8]) -> u32 {
    dat.iter()
        .fold(0u32, |sum, b| sum.wrapping_add(u32::from(*b)))
}

/// Claimed and calculated checksums for a telegram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksum {
    pub claimed: u32,
    pub calculated: u32,
}

impl Checksum {
    /// Compute the checksum of `telegram`, which must not include the trailer, and compare
    /// it to the trailer value.
    #[must_use]
    pub fn new(telegram: &[u8], trailer: u32) -> Self {
        Self {
            claimed: trailer,
            calculated: checksum(telegram),
        }
    }

    /// # Errors
    /// [DecodeError::BadChecksum] if the calculated value does not match the trailer.
    pub fn verify(telegram: &[u8], trailer: u32) -> Result<Self, DecodeError> {
        Self::new(telegram, trailer).check()
    }

    /// # Errors
    /// [DecodeError::BadChecksum] if the checksums differ.
    pub fn check(self) -> Result<Self, DecodeError> {
        if self.claimed == self.calculated {
            Ok(self)
        } else {
            Err(DecodeError::BadChecksum {
                claimed: self.claimed,
                calculated: self.calculated,
            })
        }
    }
}
