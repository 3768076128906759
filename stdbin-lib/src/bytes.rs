use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};

/// Peek-and-push byte reader.
///
/// Bytes read from the underlying reader can be pushed back and will be returned again,
/// in their original order, before any new bytes are read.
pub(crate) struct Bytes<R>
where
    R: Read + Send,
{
    reader: R,
    num_read: usize,
    pushed: VecDeque<u8>,
}

impl<R> Bytes<R>
where
    R: Read + Send,
{
    pub fn new(reader: R) -> Self {
        Bytes {
            reader,
            num_read: 0,
            pushed: VecDeque::new(),
        }
    }

    /// Next byte, or `None` at end of input.
    pub fn next(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.pushed.pop_front() {
            return Ok(Some(b));
        }
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.num_read += 1;
                    return Ok(Some(buf[0]));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Fill as much of `buf` as possible, returning the number of bytes filled. Fewer than
    /// `buf.len()` bytes means the end of input was reached.
    pub fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let Some(b) = self.pushed.pop_front() else {
                break;
            };
            buf[filled] = b;
            filled += 1;
        }
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => {
                    self.num_read += n;
                    filled += n;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(filled)
    }

    /// Push `dat` back so it is returned by the next reads, ahead of anything already
    /// pushed back.
    pub fn push(&mut self, dat: &[u8]) {
        for b in dat.iter().rev() {
            self.pushed.push_front(*b);
        }
    }

    /// Offset of the next byte to be returned, relative to the start of input.
    pub fn offset(&self) -> usize {
        self.num_read - self.pushed.len()
    }
}
