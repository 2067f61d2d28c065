//! Clock port — where "now" comes from.

use relayhub_domain::time::{self, LocalTimestamp};

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> LocalTimestamp;
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> LocalTimestamp {
        time::now()
    }
}
