//! Reassembly of telegrams from an arbitrarily chunked byte stream.
use std::sync::{Mutex, PoisonError};

use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

use crate::decoder::{Decoded, Decoder};
use crate::prelude::*;

/// Result of pushing a chunk into a [StreamReassembler].
#[derive(Debug, Default)]
pub struct PushOutcome {
    /// Messages decoded, in stream order, valid or not, including one
    /// [NotSynchronized](crate::DecodeError::NotSynchronized) message per skipped byte.
    pub decoded: Vec<Decoded>,
    /// Set when the retry budget ran out; the unread bytes were discarded.
    pub error: Option<Error>,
}

impl PushOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Decodes telegrams from a byte stream delivered in chunks of any size.
///
/// A chunk may contain zero, one or many telegrams, and a telegram may span chunks.
/// Bytes not yet decoded are kept until the next [push](Self::push). When the data at
/// the read offset is not a telegram the offset advances one byte at a time until the
/// next sync marker. Every decode is emitted except one waiting for the rest of its
/// telegram, so each skipped byte yields a [DecodeError::NotSynchronized] message. Every
/// decode that does not produce a valid message counts against `max_attempts`, per push.
///
/// [DecodeError::NotSynchronized]: crate::DecodeError::NotSynchronized
///
/// # Example
/// ```
/// use stdbin::stream::StreamReassembler;
///
/// let mut stream = StreamReassembler::builder().build();
/// let outcome = stream.push(&[0u8; 350]);
/// assert!(outcome.decoded.iter().all(|d| !d.message.valid));
/// ```
#[derive(TypedBuilder, Debug)]
pub struct StreamReassembler {
    /// Decoding is only attempted while at least this many unread bytes are buffered.
    #[builder(default = 300)]
    min_telegram_size: usize,
    /// Decode attempts allowed per push without producing a valid message.
    #[builder(default = 393)]
    max_attempts: usize,
    #[builder(default, setter(skip))]
    buf: Vec<u8>,
    /// Offset of the first unread byte in `buf`
    #[builder(default, setter(skip))]
    offset: usize,
    #[builder(default, setter(skip))]
    decoder: Decoder,
    #[builder(default, setter(skip))]
    bytes_skipped: usize,
}

impl Default for StreamReassembler {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl StreamReassembler {
    /// Number of buffered bytes not yet decoded.
    #[must_use]
    pub fn unread(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Total bytes skipped while resynchronizing.
    #[must_use]
    pub fn bytes_skipped(&self) -> usize {
        self.bytes_skipped
    }

    /// Add `chunk` to the stream and decode as many telegrams as possible.
    pub fn push(&mut self, chunk: &[u8]) -> PushOutcome {
        self.compact();
        self.buf.extend_from_slice(chunk);
        self.decode_available(self.min_telegram_size.max(1), false)
    }

    /// Decode whatever is buffered, regardless of the minimum telegram size. A trailing
    /// incomplete telegram is emitted as an invalid message and the buffer is emptied.
    pub fn flush(&mut self) -> PushOutcome {
        let outcome = self.decode_available(1, true);
        self.clear();
        outcome
    }

    /// Discard all buffered bytes.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.offset = 0;
    }

    fn compact(&mut self) {
        if self.offset > 0 {
            self.buf.drain(..self.offset);
            self.offset = 0;
        }
    }

    fn decode_available(&mut self, min_size: usize, flushing: bool) -> PushOutcome {
        let mut outcome = PushOutcome::default();
        let mut attempts = 0;
        let mut skipped = 0;

        while self.unread() >= min_size {
            if attempts >= self.max_attempts {
                warn!(
                    attempts,
                    discarded = self.unread(),
                    "retry budget exhausted; discarding buffered bytes"
                );
                self.clear();
                outcome.error = Some(Error::RetryBudgetExhausted { attempts });
                break;
            }

            let decoded = self.decoder.decode(&self.buf[self.offset..]);
            if decoded.consumed == 0 {
                attempts += 1;
                skipped += 1;
                self.offset += 1;
                outcome.decoded.push(decoded);
                continue;
            }
            if decoded.is_incomplete() && !flushing {
                trace!(
                    unread = self.unread(),
                    shortfall = decoded.message.shortfall(),
                    "waiting for rest of telegram"
                );
                break;
            }
            if !decoded.message.valid {
                attempts += 1;
            }
            self.offset += decoded.consumed;
            outcome.decoded.push(decoded);
        }

        if skipped > 0 {
            debug!(skipped, "skipped bytes resynchronizing");
            self.bytes_skipped += skipped;
        }
        outcome
    }
}

/// A [StreamReassembler] shared with a transport callback.
///
/// Each chunk is buffered and decoded under a single lock, so chunks from concurrent
/// callers never interleave.
#[derive(Debug, Default)]
pub struct LiveStream {
    inner: Mutex<StreamReassembler>,
}

impl LiveStream {
    #[must_use]
    pub fn new(reassembler: StreamReassembler) -> Self {
        Self {
            inner: Mutex::new(reassembler),
        }
    }

    /// Hand newly received bytes to the stream.
    pub fn on_data(&self, chunk: &[u8]) -> PushOutcome {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(chunk)
    }

    pub fn flush(&self) -> PushOutcome {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }

    #[must_use]
    pub fn into_inner(self) -> StreamReassembler {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
