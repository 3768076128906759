use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};

use tracing::debug;

use crate::bytes::Bytes;
use crate::prelude::*;
use crate::telegram::{HeaderV5, CHECKSUM_LEN, SYNC_MARKER};

/// Default upper bound on the size of a single telegram read from a file.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512;

/// Smallest declared size that can hold a v5 header and checksum trailer.
pub const MIN_MESSAGE_SIZE: usize = HeaderV5::LEN + CHECKSUM_LEN;

/// Raw telegram bytes located by a [Framer].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telegram {
    /// Offset of the sync marker from the start of input.
    pub offset: usize,
    /// Size declared in the header, before any clamping.
    pub declared_size: usize,
    /// The telegram from the sync marker on; at most the maximum message size.
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub enum FramerEvent {
    Telegram(Telegram),
    /// A problem framing a telegram. Framing continues with the next sync marker unless
    /// followed by [FramerEvent::NoFurtherData].
    Error(Error),
    /// End of input. Terminal; every later call produces this again.
    NoFurtherData,
}

/// Locates telegrams in recorded data using the sync marker and the declared telegram
/// size from the v5 header.
///
/// The sync search is byte-at-a-time. Once a marker is found the fixed v5 header is read
/// and the remainder of the telegram is read according to its declared total size, which
/// is clamped to the maximum message size so a corrupt size can never cause a huge read.
pub struct Framer<R>
where
    R: Read + Send,
{
    bytes: Bytes<R>,
    max_message_size: usize,
    pending: VecDeque<FramerEvent>,
    finished: bool,
    exhausted: bool,
    /// Total bytes skipped while searching for sync markers.
    pub bytes_skipped: usize,
}

impl<R> Framer<R>
where
    R: Read + Send,
{
    /// Create a new `Framer`. `max_message_size` is raised to [MIN_MESSAGE_SIZE] if smaller.
    pub fn new(reader: R, max_message_size: usize) -> Self {
        Framer {
            bytes: Bytes::new(reader),
            max_message_size: max_message_size.max(MIN_MESSAGE_SIZE),
            pending: VecDeque::new(),
            finished: false,
            exhausted: false,
            bytes_skipped: 0,
        }
    }

    /// Produce the next event.
    ///
    /// I/O errors, including the input ending inside a telegram, are reported as a
    /// [FramerEvent::Error] followed by [FramerEvent::NoFurtherData].
    pub fn next_event(&mut self) -> FramerEvent {
        if let Some(event) = self.pending.pop_front() {
            return event;
        }
        if self.finished {
            return FramerEvent::NoFurtherData;
        }
        match self.frame() {
            Ok(FramerEvent::NoFurtherData) => {
                self.finished = true;
                FramerEvent::NoFurtherData
            }
            Ok(event) => event,
            Err(err) => {
                self.finished = true;
                FramerEvent::Error(err)
            }
        }
    }

    /// Scan for the next sync marker, returning the offset of its first byte.
    fn sync(&mut self) -> io::Result<Option<usize>> {
        let mut skipped = 0;
        let mut prev: Option<u8> = None;
        loop {
            let Some(b) = self.bytes.next()? else {
                if prev.is_some() {
                    skipped += 1;
                }
                self.bytes_skipped += skipped;
                return Ok(None);
            };
            if prev == Some(SYNC_MARKER[0]) && b == SYNC_MARKER[1] {
                if skipped > 0 {
                    debug!(skipped, "skipped bytes before sync marker");
                }
                self.bytes_skipped += skipped;
                return Ok(Some(self.bytes.offset() - SYNC_MARKER.len()));
            }
            if prev.is_some() {
                skipped += 1;
            }
            prev = Some(b);
        }
    }

    fn frame(&mut self) -> Result<FramerEvent> {
        let Some(offset) = self.sync()? else {
            return Ok(FramerEvent::NoFurtherData);
        };

        let mut buf = vec![0u8; HeaderV5::LEN];
        buf[..SYNC_MARKER.len()].copy_from_slice(&SYNC_MARKER);
        let n = self.bytes.fill(&mut buf[SYNC_MARKER.len()..])?;
        if n < HeaderV5::LEN - SYNC_MARKER.len() {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("input ended inside telegram header at offset {offset}"),
            )
            .into());
        }

        let at = HeaderV5::TOTAL_SIZE_OFFSET;
        let declared_size = usize::from(u16::from_be_bytes([buf[at], buf[at + 1]]));
        if declared_size < MIN_MESSAGE_SIZE {
            debug!(offset, declared_size, "undersized telegram; resyncing");
            // Resume the sync search right after this marker
            self.bytes.push(&buf[SYNC_MARKER.len()..]);
            return Ok(FramerEvent::Error(Error::Undersized {
                declared: declared_size,
                minimum: MIN_MESSAGE_SIZE,
            }));
        }

        let oversized = declared_size > self.max_message_size;
        let size = declared_size.min(self.max_message_size);
        buf.resize(size, 0);
        let n = self.bytes.fill(&mut buf[HeaderV5::LEN..])?;
        if n < size - HeaderV5::LEN {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "input ended inside telegram at offset {offset}; expected {size} bytes, got {}",
                    HeaderV5::LEN + n
                ),
            )
            .into());
        }

        let telegram = FramerEvent::Telegram(Telegram {
            offset,
            declared_size,
            data: buf,
        });
        if oversized {
            debug!(offset, declared_size, max = self.max_message_size, "clamped telegram");
            self.pending.push_back(telegram);
            return Ok(FramerEvent::Error(Error::Oversized {
                declared: declared_size,
                max: self.max_message_size,
            }));
        }
        Ok(telegram)
    }
}

/// Yields events up to and including the first [FramerEvent::NoFurtherData].
impl<R> Iterator for Framer<R>
where
    R: Read + Send,
{
    type Item = FramerEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let event = self.next_event();
        if matches!(event, FramerEvent::NoFurtherData) {
            self.exhausted = true;
        }
        Some(event)
    }
}
