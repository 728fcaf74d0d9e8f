/*!
    Presentation time in 100-nanosecond units.
*/

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Number of [`MediaTime`] ticks in one second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

const TICKS_PER_MILLI: i64 = TICKS_PER_SECOND / 1000;
const NANOS_PER_TICK: u128 = 100;

/**
    A point in time (or a span of time) on the presentation timeline.

    One tick is 100 nanoseconds, which is the resolution container headers
    and stream timestamps are normalized to when they leave the parser.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MediaTime(pub i64);

impl MediaTime {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(i64::MAX);

    /**
        Create a time from a raw tick count.
    */
    #[inline]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /**
        Create a time from whole milliseconds.
    */
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(TICKS_PER_MILLI))
    }

    /**
        Raw tick count.
    */
    #[inline]
    pub const fn ticks(self) -> i64 {
        self.0
    }

    /**
        Whole milliseconds, truncated towards zero.
    */
    #[inline]
    pub const fn as_millis(self) -> i64 {
        self.0 / TICKS_PER_MILLI
    }

    /**
        Convert to a [`Duration`]. Negative times are clamped to zero.
    */
    pub fn to_duration(self) -> Duration {
        if self.0 <= 0 {
            return Duration::ZERO;
        }
        let nanos = self.0 as u128 * NANOS_PER_TICK;
        Duration::new(
            (nanos / 1_000_000_000) as u64,
            (nanos % 1_000_000_000) as u32,
        )
    }

    /**
        Convert from a [`Duration`], saturating at [`MediaTime::MAX`].
    */
    pub fn from_duration(duration: Duration) -> Self {
        let ticks = duration.as_nanos() / NANOS_PER_TICK;
        Self(i64::try_from(ticks).unwrap_or(i64::MAX))
    }

    #[inline]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    #[inline]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl From<Duration> for MediaTime {
    fn from(duration: Duration) -> Self {
        Self::from_duration(duration)
    }
}

impl fmt::Display for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let millis_total = abs / TICKS_PER_MILLI as u64;
        let secs_total = millis_total / 1000;
        write!(
            f,
            "{sign}{:02}:{:02}:{:02}.{:03}",
            secs_total / 3600,
            (secs_total / 60) % 60,
            secs_total % 60,
            millis_total % 1000
        )
    }
}
