use std::fmt;

use chrono::{Datelike, Duration, NaiveDateTime, SubsecRound, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// On-disk timestamp format (`YYYY-MM-DDTHH:MM:SS.ffffff`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Accepted on parse; tolerates a missing or longer fractional part.
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Wall-clock time of an entity creation or mutation.
///
/// Naive UTC with microsecond precision. Precision is truncated on
/// construction so that rendering and re-parsing is lossless.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// The current time.
    pub fn now() -> Self {
        Self(Utc::now().naive_utc().trunc_subsecs(6))
    }

    /// The current time, as a replacement for `self`.
    ///
    /// A value later than the clock is discarded in favour of now. When the
    /// clock reads exactly `self` (rapid successive saves), the result is
    /// one microsecond later so that consecutive refreshes never compare
    /// equal.
    pub fn refreshed(&self) -> Self {
        let now = Self::now();
        if now != *self {
            return now;
        }
        self.0
            .checked_add_signed(Duration::microseconds(1))
            .map_or(now, Self)
    }

    pub fn from_naive(dt: NaiveDateTime) -> Self {
        Self(dt.trunc_subsecs(6))
    }

    /// Parse the on-disk representation.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        NaiveDateTime::parse_from_str(s, PARSE_FORMAT)
            .map(Self::from_naive)
            .map_err(|_| TypeError::InvalidTimestamp(s.to_string()))
    }

    /// Render in the on-disk format.
    pub fn to_iso(&self) -> String {
        self.0.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Structured rendering used inside canonical entity representations,
    /// e.g. `datetime.datetime(2017, 9, 28, 21, 5, 54, 119427)`.
    ///
    /// Trailing zero microsecond and second components are omitted.
    pub fn structured(&self) -> String {
        let dt = &self.0;
        let mut parts = vec![
            dt.year().to_string(),
            dt.month().to_string(),
            dt.day().to_string(),
            dt.hour().to_string(),
            dt.minute().to_string(),
        ];
        let second = dt.second();
        let micros = dt.nanosecond() / 1_000;
        if second != 0 || micros != 0 {
            parts.push(second.to_string());
        }
        if micros != 0 {
            parts.push(micros.to_string());
        }
        format!("datetime.datetime({})", parts.join(", "))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_iso())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl std::str::FromStr for Timestamp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
