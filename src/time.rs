//! Nanosecond-precision internal time, plus the wire-boundary helpers for
//! converting to/from fractional POSIX seconds.
//!
//! All cache-internal time arithmetic uses a signed 64-bit nanosecond count
//! since the Unix epoch, wrapped in [`Timestamp`] so it can't be confused
//! with a raw duration or an index. `duration_from_sec`/`time_from_sec` and
//! their inverses are kept as plain free functions for
//! the CLI/wire boundary, which deals in fractional seconds.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::ops::Sub;

pub fn duration_from_sec(t_sec: f64) -> Duration {
    Duration::nanoseconds((t_sec * 1e9) as i64)
}

pub fn time_from_sec(t_sec: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos((t_sec * 1e9) as i64)
}

pub fn duration_to_sec(input: &Duration) -> f64 {
    input.num_seconds() as f64 + (input.subsec_nanos() as f64 / 1e9)
}

pub fn time_to_sec(input: &DateTime<Utc>) -> f64 {
    input.timestamp() as f64 + (input.timestamp_subsec_nanos() as f64 / 1e9)
}

/// A point in time, nanoseconds since the Unix epoch. The unit every
/// `TimeCache`/`TransformStorage`/`PathSearch` operation is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn from_nanos(nanos: i64) -> Self {
        Timestamp(nanos)
    }

    pub fn from_secs(secs: f64) -> Self {
        Timestamp(time_from_sec(secs).timestamp_nanos_opt().unwrap_or(i64::MAX))
    }

    pub fn as_secs_f64(&self) -> f64 {
        time_to_sec(&self.to_chrono())
    }

    pub fn nanos(&self) -> i64 {
        self.0
    }

    /// Absolute distance between two timestamps, in nanoseconds. This is
    /// the `time_to_nearest` search cost PathSearch minimizes over.
    pub fn abs_diff_nanos(&self, other: &Timestamp) -> u64 {
        self.0.abs_diff(other.0)
    }

    pub fn to_chrono(self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }

    pub fn from_chrono(dt: DateTime<Utc>) -> Self {
        Timestamp(dt.timestamp_nanos_opt().unwrap_or(i64::MAX))
    }

    pub fn checked_add_nanos(self, nanos: i64) -> Self {
        Timestamp(self.0.saturating_add(nanos))
    }

    pub fn checked_sub_nanos(self, nanos: i64) -> Self {
        Timestamp(self.0.saturating_sub(nanos))
    }
}

impl Sub for Timestamp {
    type Output = i64;

    fn sub(self, rhs: Timestamp) -> i64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// One second of trailing slack added past `t` when windowing a Backfill
/// query: `recorded_at in [t - W, t + 1s]`.
pub const BACKFILL_TRAILING_SLACK_NANOS: i64 = 1_000_000_000;
