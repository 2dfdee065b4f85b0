//! Snap policy: time quantization and block duration bounds.
//!
//! The snap interval doubles as the minimum block duration, so a 15 minute
//! grid never produces a block shorter than 15 minutes.

use std::fmt;

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geometry::SECONDS_PER_DAY;

/// Quantization grid in minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SnapInterval {
    Five,
    Ten,
    #[default]
    Fifteen,
    Thirty,
}

impl SnapInterval {
    pub const ALL: [SnapInterval; 4] = [Self::Five, Self::Ten, Self::Fifteen, Self::Thirty];

    pub fn minutes(&self) -> u32 {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Fifteen => 15,
            Self::Thirty => 30,
        }
    }

    pub fn from_minutes(minutes: u32) -> Result<Self, ValidationError> {
        match minutes {
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            15 => Ok(Self::Fifteen),
            30 => Ok(Self::Thirty),
            other => Err(ValidationError::InvalidSnapInterval(other)),
        }
    }

    /// Minimum block duration under this grid.
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.minutes()))
    }

    /// Truncate `instant` down to the grid, zeroing seconds.
    ///
    /// Date and hour are preserved: 14:07 on a 15 minute grid becomes 14:00.
    pub fn snap(&self, instant: NaiveDateTime) -> NaiveDateTime {
        let n = self.minutes();
        let minute = instant.minute() / n * n;
        instant
            .with_minute(minute)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(instant)
    }
}

impl TryFrom<u32> for SnapInterval {
    type Error = ValidationError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::from_minutes(minutes)
    }
}

impl From<SnapInterval> for u32 {
    fn from(interval: SnapInterval) -> Self {
        interval.minutes()
    }
}

impl fmt::Display for SnapInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.minutes())
    }
}

/// The block edge a gesture is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Start,
    End,
}

/// Longest allowed block.
pub fn max_duration() -> Duration {
    Duration::seconds(SECONDS_PER_DAY)
}

/// Clamp `[start, end]` into `[interval, 24h]`.
///
/// Too short (including zero or inverted): the edge opposite to `dragged`
/// stays put and the dragged edge is pushed out to exactly one interval.
/// Too long: the end is pulled back to `start + 24h`.
pub fn clamp_duration(
    start: NaiveDateTime,
    end: NaiveDateTime,
    interval: SnapInterval,
    dragged: Edge,
) -> (NaiveDateTime, NaiveDateTime) {
    let min = interval.duration();
    let duration = end - start;
    if duration < min {
        match dragged {
            Edge::End => (start, start + min),
            Edge::Start => (end - min, end),
        }
    } else if duration > max_duration() {
        (start, start + max_duration())
    } else {
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn truncates_to_grid() {
        assert_eq!(SnapInterval::Fifteen.snap(at(14, 7, 42)), at(14, 0, 0));
        assert_eq!(SnapInterval::Fifteen.snap(at(14, 59, 59)), at(14, 45, 0));
        assert_eq!(SnapInterval::Five.snap(at(9, 4, 0)), at(9, 0, 0));
        assert_eq!(SnapInterval::Ten.snap(at(9, 10, 1)), at(9, 10, 0));
        assert_eq!(SnapInterval::Thirty.snap(at(23, 31, 0)), at(23, 30, 0));
    }

    #[test]
    fn rejects_unknown_intervals() {
        assert_eq!(SnapInterval::from_minutes(15), Ok(SnapInterval::Fifteen));
        assert_eq!(
            SnapInterval::from_minutes(20),
            Err(ValidationError::InvalidSnapInterval(20))
        );
    }

    #[test]
    fn serializes_as_minutes() {
        let json = serde_json::to_string(&SnapInterval::Ten).unwrap();
        assert_eq!(json, "10");
        let parsed: SnapInterval = serde_json::from_str("30").unwrap();
        assert_eq!(parsed, SnapInterval::Thirty);
        assert!(serde_json::from_str::<SnapInterval>("7").is_err());
    }

    #[test]
    fn short_end_drag_grows_from_start() {
        let (start, end) = clamp_duration(at(9, 0, 0), at(9, 0, 0), SnapInterval::Fifteen, Edge::End);
        assert_eq!((start, end), (at(9, 0, 0), at(9, 15, 0)));
    }

    #[test]
    fn short_start_drag_grows_back_from_end() {
        let (start, end) =
            clamp_duration(at(10, 5, 0), at(10, 0, 0), SnapInterval::Thirty, Edge::Start);
        assert_eq!((start, end), (at(9, 30, 0), at(10, 0, 0)));
    }

    #[test]
    fn long_blocks_are_capped_at_a_day() {
        let start = at(6, 0, 0);
        let (s, e) = clamp_duration(start, start + Duration::hours(30), SnapInterval::Five, Edge::End);
        assert_eq!(s, start);
        assert_eq!(e - s, Duration::hours(24));
    }

    proptest! {
        #[test]
        fn snapping_is_idempotent(secs in 0i64..SECONDS_PER_DAY, idx in 0usize..4) {
            let interval = SnapInterval::ALL[idx];
            let t = at(0, 0, 0) + Duration::seconds(secs);
            let once = interval.snap(t);
            prop_assert_eq!(interval.snap(once), once);
            prop_assert!(once <= t);
            prop_assert!(t - once < interval.duration());
        }

        #[test]
        fn clamped_duration_stays_in_bounds(
            start_secs in 0i64..SECONDS_PER_DAY,
            len in -SECONDS_PER_DAY..(3 * SECONDS_PER_DAY),
            idx in 0usize..4,
            start_edge in any::<bool>(),
        ) {
            let interval = SnapInterval::ALL[idx];
            let edge = if start_edge { Edge::Start } else { Edge::End };
            let start = at(0, 0, 0) + Duration::seconds(start_secs);
            let (s, e) = clamp_duration(start, start + Duration::seconds(len), interval, edge);
            prop_assert!(e - s >= interval.duration());
            prop_assert!(e - s <= max_duration());
        }
    }
}
