//! Timeframe algebra (§4.1): the enumerated set of supported candle
//! periods and the ratio/open-close-time arithmetic the buffer and
//! prefetcher build on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed-duration candle period. Variants are ordered ascending by
/// period so that `derive(PartialOrd, Ord)` gives the natural ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M3,
    M5,
    M15,
    M30,
    H1,
    H2,
    H4,
    D1,
    W1,
}

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const WEEK_MS: i64 = 7 * DAY_MS;

impl Timeframe {
    pub const ALL: [Timeframe; 10] = [
        Timeframe::M1,
        Timeframe::M3,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H2,
        Timeframe::H4,
        Timeframe::D1,
        Timeframe::W1,
    ];

    /// Period length, in seconds.
    pub fn period_seconds(&self) -> i64 {
        self.period_ms() / SECOND_MS
    }

    /// Period length, in milliseconds — the unit every other operation on
    /// this type works in, matching the candle model's millisecond
    /// timestamps.
    pub fn period_ms(&self) -> i64 {
        match self {
            Timeframe::M1 => MINUTE_MS,
            Timeframe::M3 => 3 * MINUTE_MS,
            Timeframe::M5 => 5 * MINUTE_MS,
            Timeframe::M15 => 15 * MINUTE_MS,
            Timeframe::M30 => 30 * MINUTE_MS,
            Timeframe::H1 => HOUR_MS,
            Timeframe::H2 => 2 * HOUR_MS,
            Timeframe::H4 => 4 * HOUR_MS,
            Timeframe::D1 => DAY_MS,
            Timeframe::W1 => WEEK_MS,
        }
    }

    /// `(quotient, remainder)` of dividing `self`'s period by `other`'s.
    pub fn ratio(&self, other: Timeframe) -> (i64, i64) {
        let a = self.period_ms();
        let b = other.period_ms();
        (a / b, a % b)
    }

    /// Two timeframes are compatible iff one's period is an integer
    /// multiple of the other's.
    pub fn compatible(&self, other: Timeframe) -> bool {
        let a = self.period_ms();
        let b = other.period_ms();
        if a >= b {
            a % b == 0
        } else {
            b % a == 0
        }
    }

    /// Open time of the bar of this timeframe containing `now`.
    pub fn open_time(&self, now: i64) -> i64 {
        let period = self.period_ms();
        now - now.rem_euclid(period)
    }

    /// Close time of the bar opening at `open` — the last millisecond
    /// covered by that bar's window.
    pub fn close_time(&self, open: i64) -> i64 {
        open + self.period_ms() - 1
    }

    /// Open time of the bar whose open-time window contains `anchor`,
    /// estimated as the close time of the bar opening at `anchor`'s
    /// containing open.
    pub fn estimate_close_time(&self, open: i64) -> i64 {
        self.close_time(self.open_time(open))
    }

    /// Open time of the n-th bar before (`n < 0`) or after (`n > 0`)
    /// the bar containing `anchor`. `n == 0` returns `anchor`'s own open.
    pub fn estimate_open_time(&self, anchor: i64, n: i64) -> i64 {
        self.open_time(anchor) + n * self.period_ms()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::M1 => "M1",
            Timeframe::M3 => "M3",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H2 => "H2",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
            Timeframe::W1 => "W1",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "M1" => Ok(Timeframe::M1),
            "M3" => Ok(Timeframe::M3),
            "M5" => Ok(Timeframe::M5),
            "M15" => Ok(Timeframe::M15),
            "M30" => Ok(Timeframe::M30),
            "H1" => Ok(Timeframe::H1),
            "H2" => Ok(Timeframe::H2),
            "H4" => Ok(Timeframe::H4),
            "D1" => Ok(Timeframe::D1),
            "W1" => Ok(Timeframe::W1),
            other => Err(format!("unknown timeframe: {other}")),
        }
    }
}
