//! Message counter continuity.
use tracing::warn;

/// Result of observing a counter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Continuity {
    /// Number of counters skipped since the previous observation.
    pub dropped: u32,
    /// The counter did not advance past the previous one.
    pub regressed: bool,
}

/// Tracks the telegram counter across consecutive messages from one source.
///
/// The counter is expected to increase by exactly one per telegram. The drop count uses
/// wrapping arithmetic, so a counter that rolls over from `u32::MAX` to 0 counts as
/// continuous, while a counter that repeats or goes backwards shows up as a very large
/// drop count with [Continuity::regressed] set.
#[derive(Debug, Default, Clone)]
pub struct SequenceTracker {
    previous: Option<u32>,
}

impl SequenceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last counter observed, if any.
    #[must_use]
    pub fn previous(&self) -> Option<u32> {
        self.previous
    }

    /// Record `counter` and return its continuity relative to the previous counter.
    pub fn observe(&mut self, counter: u32) -> Continuity {
        let Some(prev) = self.previous.replace(counter) else {
            return Continuity::default();
        };

        // Serial number arithmetic: a forward step of more than half the counter space is
        // treated as the counter going backwards.
        let delta = counter.wrapping_sub(prev);
        let continuity = Continuity {
            dropped: delta.wrapping_sub(1),
            regressed: delta == 0 || delta > u32::MAX / 2,
        };
        if continuity.regressed {
            warn!(prev, counter, "counter regressed");
        } else if continuity.dropped > 0 {
            warn!(prev, counter, dropped = continuity.dropped, "dropped messages");
        }
        continuity
    }

    /// Forget the previous counter; the next observation is treated as the first.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
