//! Schedule — a daily `[start, end]` window for one relay.
//!
//! The relay is switched on at `start` and off at `end` every day. A window
//! whose `start` is later than its `end` wraps past midnight.

use serde::{Deserialize, Serialize};

use crate::error::{RelayHubError, ValidationError};
use crate::time::{LocalTimestamp, TimeOfDay};

/// Literal accepted in place of both times to clear a schedule.
pub const CLEAR_LITERAL: &str = "null";

/// A daily window, both ends inclusive at minute granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

/// The two daily triggers of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Start of the window: switch on unless a manual change happened inside it.
    Start,
    /// End of the window: switch off and forget manual changes.
    End,
}

impl Schedule {
    #[must_use]
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Whether `time` lies inside the window, both ends inclusive.
    #[must_use]
    pub fn contains(&self, time: TimeOfDay) -> bool {
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            time >= self.start || time <= self.end
        }
    }

    /// Next instant strictly after `after` at which an edge fires, with every
    /// edge due at that instant.
    ///
    /// When both edges share a minute they are returned as `[Start, End]`, so
    /// the end-of-window logic always runs last.
    #[must_use]
    pub fn next_fire(&self, after: LocalTimestamp) -> (LocalTimestamp, Vec<Edge>) {
        let start_at = self.start.next_after(after);
        let end_at = self.end.next_after(after);
        match start_at.cmp(&end_at) {
            std::cmp::Ordering::Less => (start_at, vec![Edge::Start]),
            std::cmp::Ordering::Greater => (end_at, vec![Edge::End]),
            std::cmp::Ordering::Equal => (start_at, vec![Edge::Start, Edge::End]),
        }
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// What a `/schedule/{port}/{start}/{end}` request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleRequest {
    Set(Schedule),
    Clear,
}

impl ScheduleRequest {
    /// Interpret raw `start`/`end` path segments.
    ///
    /// Both `"null"` clears; anything else must be two valid `HH:MM` times.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PartialSchedule`] when only one side is
    /// `"null"`, or [`ValidationError::MalformedTime`] for an unparseable time.
    pub fn parse(start: &str, end: &str) -> Result<Self, RelayHubError> {
        match (start == CLEAR_LITERAL, end == CLEAR_LITERAL) {
            (true, true) => Ok(Self::Clear),
            (false, false) => Ok(Self::Set(Schedule::new(start.parse()?, end.parse()?))),
            _ => Err(ValidationError::PartialSchedule.into()),
        }
    }
}
