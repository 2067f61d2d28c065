//! Wall-clock time helpers.
//!
//! Schedules are expressed in local wall-clock time with minute resolution;
//! no timezone conversion is performed anywhere.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Local date and time, without timezone information.
pub type LocalTimestamp = NaiveDateTime;

/// Return the current local wall-clock time.
#[must_use]
pub fn now() -> LocalTimestamp {
    Local::now().naive_local()
}

/// A minute of the day, written `HH:MM` in 24-hour format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Build a time of day, returning `None` when out of range.
    #[must_use]
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    #[must_use]
    pub fn hour(self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Truncate a timestamp to its minute of the day.
    #[must_use]
    pub fn of(ts: LocalTimestamp) -> Self {
        // chrono guarantees hour < 24 and minute < 60
        Self {
            hour: u8::try_from(ts.hour()).unwrap_or(0),
            minute: u8::try_from(ts.minute()).unwrap_or(0),
        }
    }

    /// The same minute as a [`NaiveTime`] with zero seconds.
    #[must_use]
    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::default()
            + TimeDelta::minutes(i64::from(self.hour) * 60 + i64::from(self.minute))
    }

    /// First instant strictly after `after` whose wall-clock time is this minute.
    #[must_use]
    pub fn next_after(self, after: LocalTimestamp) -> LocalTimestamp {
        let candidate = after.date().and_time(self.to_naive_time());
        if candidate > after {
            candidate
        } else {
            candidate + TimeDelta::days(1)
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    /// Accepts `H:MM`, `HH:MM` (and single-digit minutes), nothing else.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::MalformedTime(s.to_string());
        let (hour, minute) = s.split_once(':').ok_or_else(malformed)?;
        let hour = parse_component(hour).ok_or_else(malformed)?;
        let minute = parse_component(minute).ok_or_else(malformed)?;
        Self::new(hour, minute).ok_or_else(malformed)
    }
}

fn parse_component(raw: &str) -> Option<u8> {
    if raw.is_empty() || raw.len() > 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
