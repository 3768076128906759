use std::collections::BTreeMap;
use std::fmt::Display;

use crate::error::DecodeErrorKind;
use crate::message::{Message, ValidityTime};

/// Backward counter steps smaller than this are out of sequence messages, larger ones a
/// device reboot. 100 messages is half a second at 200Hz.
pub const REBOOT_THRESHOLD: u32 = 100;

/// Validity time steps, in 100us units, expected between consecutive messages at 200Hz.
pub const EXPECTED_CADENCE: [u32; 2] = [50, 51];

/// Aggregate statistics over a sequence of decoded messages.
///
/// Counter continuity and cadence are checked between consecutive valid messages only.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Count of messages having each kind of error. A message with several errors is
    /// counted once per kind.
    pub errors: BTreeMap<DecodeErrorKind, usize>,
    /// Forward counter jumps of more than one.
    pub gap_events: usize,
    /// Total messages missing across all gaps.
    pub dropped: u64,
    /// Messages repeating the previous counter.
    pub duplicates: usize,
    /// Messages whose counter went back by less than [REBOOT_THRESHOLD].
    pub out_of_sequence: usize,
    /// Messages whose counter went back by [REBOOT_THRESHOLD] or more.
    pub reboots: usize,
    /// Validity time steps other than [EXPECTED_CADENCE].
    pub cadence_anomalies: usize,
    pub first_counter: Option<u32>,
    pub last_counter: Option<u32>,
    pub first_time: Option<ValidityTime>,
    pub last_time: Option<ValidityTime>,
    /// Valid messages carrying a position block.
    pub position_fixes: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    prior: Option<(u32, ValidityTime)>,
}

impl Summary {
    pub fn add(&mut self, msg: &Message) {
        self.total += 1;

        let mut kinds: Vec<DecodeErrorKind> = msg.errors.iter().map(|e| e.kind()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        for kind in kinds {
            *self.errors.entry(kind).or_default() += 1;
        }

        if !msg.valid {
            self.invalid += 1;
            return;
        }
        self.valid += 1;

        if self.first_counter.is_none() {
            self.first_counter = Some(msg.counter);
            self.first_time = Some(msg.validity_time);
        }
        self.last_counter = Some(msg.counter);
        self.last_time = Some(msg.validity_time);
        if msg.has_position() {
            self.position_fixes += 1;
        }

        if let Some((counter, time)) = self.prior {
            self.check_counter(counter, msg.counter);
            let step = msg.validity_time.0.wrapping_sub(time.0);
            if !EXPECTED_CADENCE.contains(&step) {
                self.cadence_anomalies += 1;
            }
        }
        self.prior = Some((msg.counter, msg.validity_time));
    }

    fn check_counter(&mut self, prior: u32, counter: u32) {
        let step = counter.wrapping_sub(prior);
        if step == 1 {
            return;
        }
        if step == 0 {
            self.duplicates += 1;
        } else if step > u32::MAX / 2 {
            if prior.wrapping_sub(counter) < REBOOT_THRESHOLD {
                self.out_of_sequence += 1;
            } else {
                self.reboots += 1;
            }
        } else {
            self.gap_events += 1;
            self.dropped += u64::from(step - 1);
        }
    }
}

impl<'a> Extend<&'a Message> for Summary {
    fn extend<T: IntoIterator<Item = &'a Message>>(&mut self, iter: T) {
        for msg in iter {
            self.add(msg);
        }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn opt<T: Display>(v: Option<T>) -> String {
            v.map_or_else(|| "-".to_string(), |v| v.to_string())
        }
        writeln!(f, "messages:        {}", self.total)?;
        writeln!(f, "  valid:         {}", self.valid)?;
        writeln!(f, "  invalid:       {}", self.invalid)?;
        for (kind, count) in &self.errors {
            writeln!(f, "    {kind}: {count}")?;
        }
        writeln!(f, "gaps:            {} ({} missing)", self.gap_events, self.dropped)?;
        writeln!(f, "duplicates:      {}", self.duplicates)?;
        writeln!(f, "out of sequence: {}", self.out_of_sequence)?;
        writeln!(f, "reboots:         {}", self.reboots)?;
        writeln!(f, "cadence:         {}", self.cadence_anomalies)?;
        writeln!(
            f,
            "counters:        {} .. {}",
            opt(self.first_counter),
            opt(self.last_counter)
        )?;
        writeln!(
            f,
            "validity times:  {} .. {}",
            opt(self.first_time),
            opt(self.last_time)
        )?;
        write!(f, "position fixes:  {}", self.position_fixes)
    }
}
