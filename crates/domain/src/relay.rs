//! Relay state — the two-level value mirrored from an output line.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::port::Port;

/// Level of a relay output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayState {
    On,
    #[default]
    Off,
}

impl RelayState {
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl std::fmt::Display for RelayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelayState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(ValidationError::MalformedState(other.to_string())),
        }
    }
}

/// Port and live level of one relay, as reported by `/relays`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStatus {
    pub port: Port,
    pub state: RelayState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_off() {
        assert_eq!(RelayState::default(), RelayState::Off);
    }

    #[test]
    fn should_parse_lowercase_names() {
        assert_eq!("on".parse::<RelayState>().unwrap(), RelayState::On);
        assert_eq!("off".parse::<RelayState>().unwrap(), RelayState::Off);
    }

    #[test]
    fn should_reject_unknown_state() {
        let err = "toggle".parse::<RelayState>().unwrap_err();
        assert_eq!(err, ValidationError::MalformedState("toggle".to_string()));
    }

    #[test]
    fn should_reject_uppercase_state() {
        assert!("ON".parse::<RelayState>().is_err());
    }

    #[test]
    fn should_serialize_status_with_lowercase_state() {
        let status = RelayStatus {
            port: Port::new(1),
            state: RelayState::On,
        };
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json, serde_json::json!({"port": 1, "state": "on"}));
    }
}
