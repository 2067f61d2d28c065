//! Relay port — the logical number a client uses to address one relay.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidPortError;

/// Logical relay number, as used in request paths and the persisted document.
///
/// A `Port` only says the value is a well-formed number; whether it maps to
/// a configured output line is checked by the relay registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl From<u16> for Port {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Port {
    type Err = InvalidPortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u16>()
            .map(Self)
            .map_err(|_| InvalidPortError::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_decimal_port() {
        let port: Port = "3".parse().unwrap();
        assert_eq!(port, Port::new(3));
    }

    #[test]
    fn should_reject_non_numeric_port() {
        let err = "abc".parse::<Port>().unwrap_err();
        assert_eq!(err.port, "abc");
    }

    #[test]
    fn should_reject_negative_port() {
        assert!("-1".parse::<Port>().is_err());
    }

    #[test]
    fn should_serialize_as_plain_integer() {
        let json = serde_json::to_string(&Port::new(6)).unwrap();
        assert_eq!(json, "6");
    }

    #[test]
    fn should_order_by_number() {
        assert!(Port::new(2) < Port::new(10));
    }
}
