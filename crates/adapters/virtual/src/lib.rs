//! # relayhub-adapter-virtual
//!
//! Simulated output lines, for running the daemon without relay hardware.
//!
//! A [`VirtualOutput`] holds its level in memory. Clones share the same line,
//! so a caller can keep a handle to observe or break a line handed to the
//! registry.
//!
//! ## Dependency rule
//!
//! Depends on `relayhub-app` (port traits) and `relayhub-domain` only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use relayhub_app::ports::OutputLine;
use relayhub_domain::error::RelayHubError;
use relayhub_domain::relay::RelayState;

/// Errors raised by a simulated line.
#[derive(Debug, thiserror::Error)]
pub enum VirtualOutputError {
    #[error("virtual line {0} is disconnected")]
    Disconnected(String),
}

impl From<VirtualOutputError> for RelayHubError {
    fn from(err: VirtualOutputError) -> Self {
        Self::Hardware(Box::new(err))
    }
}

struct Line {
    name: String,
    level: Mutex<RelayState>,
    disconnected: AtomicBool,
}

/// In-memory relay line, off at creation.
#[derive(Clone)]
pub struct VirtualOutput {
    line: Arc<Line>,
}

impl VirtualOutput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            line: Arc::new(Line {
                name: name.into(),
                level: Mutex::new(RelayState::Off),
                disconnected: AtomicBool::new(false),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.line.name
    }

    /// Simulate a broken line: every write fails until reconnected.
    pub fn set_disconnected(&self, disconnected: bool) {
        self.line.disconnected.store(disconnected, Ordering::SeqCst);
    }

    fn lock_level(&self) -> MutexGuard<'_, RelayState> {
        self.line
            .level
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutputLine for VirtualOutput {
    fn set_level(&self, state: RelayState) -> Result<(), RelayHubError> {
        if self.line.disconnected.load(Ordering::SeqCst) {
            return Err(VirtualOutputError::Disconnected(self.line.name.clone()).into());
        }
        *self.lock_level() = state;
        tracing::debug!(line = %self.line.name, %state, "virtual line driven");
        Ok(())
    }

    fn read_level(&self) -> Result<RelayState, RelayHubError> {
        Ok(*self.lock_level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_off() {
        let output = VirtualOutput::new("relay-1");
        assert_eq!(output.read_level().unwrap(), RelayState::Off);
    }

    #[test]
    fn should_hold_written_level() {
        let output = VirtualOutput::new("relay-1");
        output.set_level(RelayState::On).unwrap();
        assert_eq!(output.read_level().unwrap(), RelayState::On);
    }

    #[test]
    fn should_share_level_between_clones() {
        let output = VirtualOutput::new("relay-1");
        let observer = output.clone();
        output.set_level(RelayState::On).unwrap();
        assert_eq!(observer.read_level().unwrap(), RelayState::On);
    }

    #[test]
    fn should_fail_writes_while_disconnected() {
        let output = VirtualOutput::new("relay-2");
        output.set_disconnected(true);

        let result = output.set_level(RelayState::On);

        assert!(matches!(result, Err(RelayHubError::Hardware(_))));
        assert_eq!(output.read_level().unwrap(), RelayState::Off);
    }

    #[test]
    fn should_accept_writes_after_reconnect() {
        let output = VirtualOutput::new("relay-2");
        output.set_disconnected(true);
        output.set_disconnected(false);
        output.set_level(RelayState::On).unwrap();
        assert_eq!(output.read_level().unwrap(), RelayState::On);
    }
}
