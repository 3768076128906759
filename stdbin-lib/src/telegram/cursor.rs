use crate::error::DecodeError;

type Result<T> = std::result::Result<T, DecodeError>;

/// Bounds-checked big-endian reader over a byte slice.
///
/// Every read advances the cursor by the width of the type read. A read that would go
/// past the end of the data fails with [DecodeError::ShortRead] and leaves the cursor
/// where it was, so [ByteCursor::position] is always the number of bytes actually
/// consumed.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    dat: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    #[must_use]
    pub fn new(dat: &'a [u8]) -> Self {
        Self { dat, pos: 0 }
    }

    /// Create a cursor starting at `offset`. An offset past the end is clamped to the end.
    #[must_use]
    pub fn at(dat: &'a [u8], offset: usize) -> Self {
        Self {
            dat,
            pos: offset.min(dat.len()),
        }
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.dat.len() - self.pos
    }

    /// All bytes that have been consumed so far.
    #[must_use]
    pub fn consumed(&self) -> &'a [u8] {
        &self.dat[..self.pos]
    }

    /// Take the next `n` bytes.
    ///
    /// # Errors
    /// [DecodeError::ShortRead] if fewer than `n` bytes remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(DecodeError::ShortRead {
                needed: n,
                available: self.remaining(),
            });
        }
        let buf = &self.dat[self.pos..self.pos + n];
        self.pos += n;
        Ok(buf)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.read_bytes(N)?);
        Ok(arr)
    }

    /// Skip `n` bytes.
    ///
    /// # Errors
    /// [DecodeError::ShortRead] if fewer than `n` bytes remain.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// # Errors
    /// [DecodeError::ShortRead] if no bytes remain.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// # Errors
    /// [DecodeError::ShortRead] if fewer than 2 bytes remain.
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    /// # Errors
    /// [DecodeError::ShortRead] if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// # Errors
    /// [DecodeError::ShortRead] if fewer than 4 bytes remain.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_array().map(i32::from_be_bytes)
    }

    /// IEEE-754 single, most significant byte first.
    ///
    /// # Errors
    /// [DecodeError::ShortRead] if fewer than 4 bytes remain.
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_array().map(f32::from_be_bytes)
    }

    /// IEEE-754 double, most significant byte first.
    ///
    /// # Errors
    /// [DecodeError::ShortRead] if fewer than 8 bytes remain.
    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_array().map(f64::from_be_bytes)
    }
}
