//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`RelayHubError`] via `#[from]` or an explicit `From` impl.

/// Boxed source error carried by infrastructure failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error returned by domain and application operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayHubError {
    /// Input failed validation; nothing was mutated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The referenced port is not part of the configured relay set.
    #[error("invalid port")]
    InvalidPort(#[from] InvalidPortError),

    /// Driving or reading an output line failed.
    #[error("hardware write failure")]
    Hardware(#[source] BoxError),

    /// Reading or writing the persisted relay document failed.
    #[error("storage error")]
    Storage(#[source] BoxError),
}

/// Input rejected before any state was touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("malformed time {0:?}, expected HH:MM")]
    MalformedTime(String),

    #[error("malformed state {0:?}, expected \"on\" or \"off\"")]
    MalformedState(String),

    #[error("schedule requires both start and end, or both \"null\" to clear")]
    PartialSchedule,
}

/// A port that is not an integer or has no configured output line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid port number {port}")]
pub struct InvalidPortError {
    pub port: String,
}

impl InvalidPortError {
    #[must_use]
    pub fn new(port: impl ToString) -> Self {
        Self {
            port: port.to_string(),
        }
    }
}
