//! Persisted relay record — one entry of the durable state document.

use serde::{Deserialize, Serialize};

use crate::port::Port;
use crate::relay::RelayState;
use crate::schedule::Schedule;

/// One relay as written to durable storage.
///
/// Schedule times stay raw strings so that a hand-edited or truncated
/// document still loads; [`schedule`](Self::schedule) decides whether they
/// describe a usable window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRelay {
    pub port: Port,
    pub state: RelayState,
    #[serde(default)]
    pub schedule_start: Option<String>,
    #[serde(default)]
    pub schedule_end: Option<String>,
}

impl PersistedRelay {
    /// A relay that is off and has no schedule.
    #[must_use]
    pub fn off(port: Port) -> Self {
        Self::new(port, RelayState::Off, None)
    }

    #[must_use]
    pub fn new(port: Port, state: RelayState, schedule: Option<&Schedule>) -> Self {
        Self {
            port,
            state,
            schedule_start: schedule.map(|s| s.start.to_string()),
            schedule_end: schedule.map(|s| s.end.to_string()),
        }
    }

    /// The stored window, if both ends are present and well-formed.
    ///
    /// # Errors
    ///
    /// Returns the raw values when both ends are present but one of them
    /// does not parse; a missing end yields `Ok(None)`.
    pub fn schedule(&self) -> Result<Option<Schedule>, (String, String)> {
        let (Some(start), Some(end)) = (&self.schedule_start, &self.schedule_end) else {
            return Ok(None);
        };
        match (start.parse(), end.parse()) {
            (Ok(start), Ok(end)) => Ok(Some(Schedule::new(start, end))),
            _ => Err((start.clone(), end.clone())),
        }
    }
}
