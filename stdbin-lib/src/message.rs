use std::fmt::Display;

use chrono::NaiveTime;

use crate::error::{DecodeError, DecodeErrorKind};
use crate::telegram::{ExtendedNavigationData, ExternalData, NavigationData};

/// Telegram type, from the 2-byte marker at the start of a telegram.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    /// `CM`, input to the device
    Input,
    /// `AN`, answer to a query
    OutputAnswer,
    /// `IX`, navigation output
    OutputNav,
    #[default]
    Unknown,
}

impl MessageKind {
    #[must_use]
    pub fn from_marker(marker: [u8; 2]) -> Self {
        match &marker {
            b"CM" => Self::Input,
            b"AN" => Self::OutputAnswer,
            b"IX" => Self::OutputNav,
            _ => Self::Unknown,
        }
    }
}

impl Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Input => "input(CM)",
            Self::OutputAnswer => "answer(AN)",
            Self::OutputNav => "navigation(IX)",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Time of validity in units of 100 microseconds since the start of the local day.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidityTime(pub u32);

impl ValidityTime {
    const TICKS_PER_SECOND: u32 = 10_000;

    #[must_use]
    pub fn hours(&self) -> u32 {
        self.0 / Self::TICKS_PER_SECOND / 3600
    }

    #[must_use]
    pub fn minutes(&self) -> u32 {
        self.0 / Self::TICKS_PER_SECOND / 60 - self.hours() * 60
    }

    /// Seconds within the minute, including the fractional part.
    #[must_use]
    pub fn seconds(&self) -> f64 {
        f64::from(self.0) / f64::from(Self::TICKS_PER_SECOND)
            - f64::from(self.hours() * 3600)
            - f64::from(self.minutes() * 60)
    }

    /// Time of day, or `None` if the value is beyond 24 hours.
    #[must_use]
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        let secs = self.0 / Self::TICKS_PER_SECOND;
        let nanos = (self.0 % Self::TICKS_PER_SECOND) * 100_000;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
    }
}

impl Display for ValidityTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:06.3}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

/// A decoded navigation telegram.
///
/// A `Message` is produced for every decode attempt, valid or not. When invalid,
/// `errors` holds every problem found, and any fields decoded before the failure are
/// still populated so a suspect message can be inspected.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub kind: MessageKind,
    pub protocol_version: u8,
    pub nav_block_mask: u32,
    pub extended_nav_block_mask: u32,
    pub external_block_mask: u32,
    /// Declared navigation data size; only present in v5 headers.
    pub navigation_data_size: u16,
    /// Declared telegram size, including the checksum trailer.
    pub total_telegram_size: u16,
    pub validity_time: ValidityTime,
    pub counter: u32,
    pub claimed_checksum: u32,
    pub calculated_checksum: u32,
    pub valid: bool,
    pub errors: Vec<DecodeError>,
    /// Messages missing between the previous counter and this one.
    pub dropped_count: u32,
    /// The counter did not advance past the previous counter.
    pub counter_regressed: bool,
    pub nav: NavigationData,
    pub extended: ExtendedNavigationData,
    pub external: ExternalData,
}

impl Message {
    /// The first error found, if any.
    #[must_use]
    pub fn error(&self) -> Option<&DecodeError> {
        self.errors.first()
    }

    #[must_use]
    pub fn has_error(&self, kind: DecodeErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }

    /// Bytes that were missing when the decode hit the end of the buffer.
    #[must_use]
    pub fn shortfall(&self) -> Option<usize> {
        self.errors.iter().find_map(DecodeError::shortfall)
    }

    #[must_use]
    pub fn has_position(&self) -> bool {
        self.nav.position.is_some()
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Message{{counter={}, time={}, v{}, valid={}",
            self.counter, self.validity_time, self.protocol_version, self.valid
        )?;
        if let Some(err) = self.error() {
            write!(f, ", error=\"{err}\"")?;
        }
        if self.dropped_count > 0 {
            write!(f, ", dropped={}", self.dropped_count)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(*b"CM", MessageKind::Input; "input")]
    #[test_case(*b"AN", MessageKind::OutputAnswer; "answer")]
    #[test_case(*b"IX", MessageKind::OutputNav; "navigation")]
    #[test_case(*b"XI", MessageKind::Unknown; "reversed marker")]
    #[test_case([0, 0], MessageKind::Unknown; "zeros")]
    fn message_kind_from_marker(marker: [u8; 2], expected: MessageKind) {
        assert_eq!(MessageKind::from_marker(marker), expected);
    }

    #[test]
    fn validity_time_components() {
        // 13:45:12.345
        let t = ValidityTime(((13 * 3600 + 45 * 60 + 12) * 10_000) + 3_450);
        assert_eq!(t.hours(), 13);
        assert_eq!(t.minutes(), 45);
        assert!((t.seconds() - 12.345).abs() < 1e-9);
        assert_eq!(t.to_string(), "13:45:12.345");
    }

    #[test]
    fn validity_time_to_naive_time() {
        let t = ValidityTime((3600 + 2) * 10_000 + 5);
        let nt = t.to_naive_time().unwrap();
        assert_eq!(nt, NaiveTime::from_hms_micro_opt(1, 0, 2, 500).unwrap());

        assert!(ValidityTime(24 * 3600 * 10_000).to_naive_time().is_none());
    }

    #[test]
    fn validity_time_display_pads() {
        assert_eq!(ValidityTime(0).to_string(), "00:00:00.000");
        assert_eq!(ValidityTime(15_000).to_string(), "00:00:01.500");
    }
}
