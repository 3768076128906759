use tracing::{debug, field, span, trace, warn, Level};

use crate::error::DecodeError;
use crate::message::{Message, MessageKind};
use crate::sequence::SequenceTracker;
use crate::telegram::blocks::{
    self, EXTENDED_BLOCKS, EXTENDED_MASK_ALL, EXTENDED_MASK_NONE, EXTERNAL_BLOCKS, NAV_BLOCKS,
};
use crate::telegram::{ByteCursor, Checksum, Header, CHECKSUM_LEN};

/// A decoded [Message] and the number of bytes the decode consumed from the input.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decoded {
    pub message: Message,
    /// Bytes actually read from the start of the input.
    ///
    /// 0 when the input does not start with a known marker, the 3 byte prefix when the
    /// kind or version is rejected, the whole telegram including the checksum trailer on
    /// a complete decode, and the bytes read before the failing field on a short read.
    pub consumed: usize,
}

impl Decoded {
    /// True when the input ended before the telegram did, i.e., more bytes may complete it.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.message.shortfall().is_some()
    }
}

/// Decodes navigation telegrams and tracks counter continuity between them.
///
/// Each source of telegrams should use its own `Decoder`, otherwise drop counts will
/// be meaningless.
///
/// # Example
/// ```
/// use stdbin::Decoder;
///
/// let mut decoder = Decoder::new();
/// let decoded = decoder.decode(b"not a telegram");
/// assert!(!decoded.message.valid);
/// assert_eq!(decoded.consumed, 0);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Decoder {
    tracker: SequenceTracker,
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the telegram at the start of `buf`.
    ///
    /// Every message whose header could be parsed is annotated with its drop count and
    /// regression flag relative to the previous one seen by this decoder. A telegram cut
    /// short by the end of `buf` is not recorded, so decoding it again once the rest has
    /// arrived does not count its own counter as a repeat.
    pub fn decode(&mut self, buf: &[u8]) -> Decoded {
        let (mut decoded, header) = decode_parts(buf);
        if decoded.is_incomplete() {
            return decoded;
        }
        if let Some(hdr) = header {
            let continuity = self.tracker.observe(hdr.counter());
            decoded.message.dropped_count = continuity.dropped;
            decoded.message.counter_regressed = continuity.regressed;
        }
        decoded
    }

    /// Forget counter history, e.g., after reconnecting to a device.
    pub fn reset(&mut self) {
        self.tracker.reset();
    }
}

/// Decode the telegram at the start of `buf` without any counter tracking.
///
/// The same input always produces the same output.
#[must_use]
pub fn decode_telegram(buf: &[u8]) -> Decoded {
    decode_parts(buf).0
}

fn decode_parts(buf: &[u8]) -> (Decoded, Option<Header>) {
    let span = span!(Level::TRACE, "telegram", counter = field::Empty);
    let _guard = span.enter();

    let mut message = Message::default();
    if buf.len() >= 2 {
        message.kind = MessageKind::from_marker([buf[0], buf[1]]);
    }
    let mut cur = ByteCursor::new(buf);

    let hdr = match Header::parse(&mut cur) {
        Ok(hdr) => hdr,
        Err(err) => {
            trace!("header rejected: {err}");
            message.errors.push(err);
            let decoded = Decoded {
                message,
                consumed: cur.position(),
            };
            return (decoded, None);
        }
    };
    span.record("counter", hdr.counter());

    message.protocol_version = hdr.version();
    message.nav_block_mask = hdr.nav_block_mask();
    message.extended_nav_block_mask = hdr.extended_nav_block_mask();
    message.external_block_mask = hdr.external_block_mask();
    message.navigation_data_size = hdr.navigation_data_size().unwrap_or_default();
    message.total_telegram_size = hdr.total_telegram_size();
    message.validity_time = hdr.validity_time();
    message.counter = hdr.counter();

    let ext_mask = message.extended_nav_block_mask;
    if ext_mask != EXTENDED_MASK_NONE && ext_mask != EXTENDED_MASK_ALL {
        debug!(mask = ext_mask, "anomalous extended navigation bitmask");
        message.errors.push(DecodeError::AnomalousExtendedMask(ext_mask));
    }

    if let Err(err) = decode_body(&hdr, &mut cur, &mut message) {
        trace!("body decode failed: {err}");
        message.errors.push(err);
    }

    message.valid = message.errors.is_empty();
    let decoded = Decoded {
        message,
        consumed: cur.position(),
    };
    (decoded, Some(hdr))
}

/// Walk the block bitmasks and verify the checksum trailer.
///
/// The trailer is the last 4 bytes of the declared telegram when `cur` holds exactly the
/// declared size, otherwise the 4 bytes following the last decoded block.
fn decode_body(
    hdr: &Header,
    cur: &mut ByteCursor,
    message: &mut Message,
) -> Result<(), DecodeError> {
    blocks::walk(hdr.nav_block_mask(), NAV_BLOCKS, cur, |b| {
        message.nav.apply(b);
    })?;
    blocks::walk(hdr.extended_nav_block_mask(), EXTENDED_BLOCKS, cur, |b| {
        message.extended.apply(b);
    })?;
    blocks::walk(hdr.external_block_mask(), EXTERNAL_BLOCKS, cur, |b| {
        message.external.apply(b);
    })?;

    // A framed buffer holding exactly the declared telegram carries its trailer in the
    // last 4 bytes, even when reserved blocks sit between the last decoded block and it.
    let declared = usize::from(hdr.total_telegram_size());
    let framed = cur.position() + cur.remaining() == declared;
    if framed && declared >= cur.position() + CHECKSUM_LEN {
        let gap = declared - CHECKSUM_LEN - cur.position();
        if gap > 0 {
            debug!(gap, "skipping undecoded bytes before checksum trailer");
            cur.skip(gap)?;
        }
    } else if declared != cur.position() + CHECKSUM_LEN {
        debug!(
            declared,
            actual = cur.position() + CHECKSUM_LEN,
            "declared telegram size differs from decoded size"
        );
    }

    let body = cur.consumed();
    let trailer = cur.read_u32()?;
    let checksum = Checksum::new(body, trailer);
    message.claimed_checksum = checksum.claimed;
    message.calculated_checksum = checksum.calculated;

    if let Err(err) = checksum.check() {
        warn!(counter = hdr.counter(), "{err}");
        return Err(err);
    }
    Ok(())
}
