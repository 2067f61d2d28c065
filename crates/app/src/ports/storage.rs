//! Storage port — the durable relay state document.

use std::future::Future;

use relayhub_domain::error::RelayHubError;
use relayhub_domain::snapshot::PersistedRelay;

/// Durable storage for the full relay set.
///
/// The document is always rewritten in full; implementations must make a
/// save atomic enough that a crash mid-write leaves the previous document
/// intact.
pub trait RelayStateStore {
    /// Read the stored document. `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> impl Future<Output = Result<Option<Vec<PersistedRelay>>, RelayHubError>> + Send;

    /// Replace the stored document with `relays`.
    fn save(&self, relays: &[PersistedRelay]) -> impl Future<Output = Result<(), RelayHubError>> + Send;
}

impl<T: RelayStateStore + Send + Sync> RelayStateStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<Option<Vec<PersistedRelay>>, RelayHubError>> + Send {
        (**self).load()
    }

    fn save(&self, relays: &[PersistedRelay]) -> impl Future<Output = Result<(), RelayHubError>> + Send {
        (**self).save(relays)
    }
}
