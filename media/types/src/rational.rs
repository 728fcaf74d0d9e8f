/*!
    Unsigned rates such as frame rates and sample rates.
*/

use std::fmt;

use serde::Serialize;

use crate::time::{MediaTime, TICKS_PER_SECOND};

/**
    A rate of `num` units per `den` seconds.

    Container headers describe stream rates as a `rate / scale` pair; a
    stream at 30000/1001 plays 30000 frames every 1001 seconds.
    [`Rational::new`] rejects zero terms; conversions on a rate built with
    a zero term directly saturate instead of dividing by zero.
*/
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    /**
        Create a rate, returning `None` if either term is zero.
    */
    pub const fn new(num: u32, den: u32) -> Option<Self> {
        if num == 0 || den == 0 {
            None
        } else {
            Some(Self { num, den })
        }
    }

    /**
        Convert to a floating-point number of units per second.
    */
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /**
        Presentation time of unit number `ticks` (the start of that frame).
    */
    pub fn ticks_to_time(self, ticks: u64) -> MediaTime {
        if ticks == 0 {
            return MediaTime::ZERO;
        }
        let t = (ticks as u128 * self.den as u128 * TICKS_PER_SECOND as u128)
            .checked_div(self.num as u128)
            .unwrap_or(u128::MAX);
        MediaTime(i64::try_from(t).unwrap_or(i64::MAX))
    }

    /**
        Index of the unit that is playing at `time`, rounding down.
        Negative times map to zero.
    */
    pub fn time_to_ticks(self, time: MediaTime) -> u64 {
        if time.0 <= 0 {
            return 0;
        }
        let t = (time.0 as u128 * self.num as u128)
            .checked_div(self.den as u128 * TICKS_PER_SECOND as u128)
            .unwrap_or(u128::MAX);
        u64::try_from(t).unwrap_or(u64::MAX)
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}
