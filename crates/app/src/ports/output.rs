//! Output line port — one physical relay line.

use relayhub_domain::error::RelayHubError;
use relayhub_domain::relay::RelayState;

/// A two-level output line driving one relay.
///
/// Both calls are synchronous: once [`set_level`](Self::set_level) returns
/// `Ok`, the line is at the requested level and the caller may persist it.
pub trait OutputLine: Send + Sync {
    /// Drive the line to `state`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::Hardware`] when the write fails. No retry
    /// is attempted.
    fn set_level(&self, state: RelayState) -> Result<(), RelayHubError>;

    /// Read the level the line currently holds.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::Hardware`] when the line cannot be read.
    fn read_level(&self) -> Result<RelayState, RelayHubError>;
}
