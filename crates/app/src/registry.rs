//! Relay registry — the single owner of every relay's runtime state.
//!
//! Each configured port owns one [`RelaySlot`] behind its own async mutex.
//! Every mutation (manual action, schedule change, trigger) runs its whole
//! read-decide-write-persist sequence while holding that slot's lock.
//!
//! The persisted document is kept as a per-port cache of
//! [`PersistedRelay`] records. A slot updates its own record under its lock,
//! then the whole cache is written under a store-wide write lock. The write
//! lock is never held while waiting for a slot, so the two levels of locking
//! cannot deadlock.

use std::collections::BTreeMap;
use std::sync::PoisonError;

use tokio::sync::{Mutex, MutexGuard};

use relayhub_domain::error::{InvalidPortError, RelayHubError};
use relayhub_domain::overrides::OverrideState;
use relayhub_domain::port::Port;
use relayhub_domain::schedule::Schedule;
use relayhub_domain::snapshot::PersistedRelay;

use crate::ports::{Clock, OutputLine, RelayStateStore};
use crate::scheduler::ScheduleRegistration;

/// Runtime state of one relay.
pub struct RelaySlot<O> {
    output: O,
    pub(crate) overrides: OverrideState,
    pub(crate) registration: Option<ScheduleRegistration>,
}

impl<O: OutputLine> RelaySlot<O> {
    fn new(output: O) -> Self {
        Self {
            output,
            overrides: OverrideState::default(),
            registration: None,
        }
    }

    /// The output line driving this relay.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Manual action memory.
    pub fn overrides(&self) -> OverrideState {
        self.overrides
    }

    /// The active daily window, if a registration exists.
    pub fn schedule(&self) -> Option<Schedule> {
        self.registration.as_ref().map(ScheduleRegistration::schedule)
    }
}

/// Owns the fixed relay set, the durable store and the clock.
pub struct RelayRegistry<O, S, C> {
    slots: BTreeMap<Port, Mutex<RelaySlot<O>>>,
    store: S,
    clock: C,
    document: std::sync::Mutex<BTreeMap<Port, PersistedRelay>>,
    write_lock: Mutex<()>,
}

impl<O, S, C> RelayRegistry<O, S, C>
where
    O: OutputLine,
    S: RelayStateStore + Send + Sync,
    C: Clock,
{
    /// Create a registry for the configured `(port, output)` pairs.
    ///
    /// Every relay starts as off with no schedule until
    /// [`SchedulerEngine::restore`](crate::scheduler::SchedulerEngine::restore)
    /// applies the persisted document.
    pub fn new(outputs: impl IntoIterator<Item = (Port, O)>, store: S, clock: C) -> Self {
        let slots: BTreeMap<_, _> = outputs
            .into_iter()
            .map(|(port, output)| (port, Mutex::new(RelaySlot::new(output))))
            .collect();
        let document = slots
            .keys()
            .map(|port| (*port, PersistedRelay::off(*port)))
            .collect();
        Self {
            slots,
            store,
            clock,
            document: std::sync::Mutex::new(document),
            write_lock: Mutex::new(()),
        }
    }

    /// Configured ports, ascending.
    pub fn ports(&self) -> impl Iterator<Item = Port> + '_ {
        self.slots.keys().copied()
    }

    #[must_use]
    pub fn contains(&self, port: Port) -> bool {
        self.slots.contains_key(&port)
    }

    /// Parse a raw port and check that it is configured.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::InvalidPort`] for a non-numeric or unknown port.
    pub fn resolve(&self, raw: &str) -> Result<Port, RelayHubError> {
        let port: Port = raw.parse()?;
        if self.contains(port) {
            Ok(port)
        } else {
            Err(InvalidPortError::new(raw.trim()).into())
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Acquire exclusive access to one relay.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::InvalidPort`] when `port` is not configured.
    pub async fn lock(&self, port: Port) -> Result<MutexGuard<'_, RelaySlot<O>>, RelayHubError> {
        let slot = self
            .slots
            .get(&port)
            .ok_or_else(|| InvalidPortError::new(port))?;
        Ok(slot.lock().await)
    }

    /// Refresh the cached record for `port` from its slot, reading the
    /// output level live.
    pub(crate) fn record(&self, port: Port, slot: &RelaySlot<O>) -> Result<(), RelayHubError> {
        let state = slot.output.read_level()?;
        let record = PersistedRelay::new(port, state, slot.schedule().as_ref());
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(port, record);
        Ok(())
    }

    /// Write the whole cached document to the store.
    pub(crate) async fn save(&self) -> Result<(), RelayHubError> {
        let _guard = self.write_lock.lock().await;
        let document = self.document();
        self.store.save(&document).await
    }

    /// Record `slot` and persist the full document. Call with the slot's
    /// lock held.
    pub(crate) async fn commit(&self, port: Port, slot: &RelaySlot<O>) -> Result<(), RelayHubError> {
        self.record(port, slot)?;
        self.save().await.inspect_err(|err| {
            tracing::error!(%port, error = %err, "failed to persist relay state");
        })
    }

    /// Current contents of the persisted document, ordered by port.
    pub fn document(&self) -> Vec<PersistedRelay> {
        self.document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeOutput, FixedClock, MemoryStore, registry_with};
    use relayhub_domain::error::RelayHubError;
    use relayhub_domain::relay::RelayState;

    #[test]
    fn should_list_configured_ports_in_order() {
        let registry = registry_with(&[3, 1, 2]);
        let ports: Vec<u16> = registry.ports().map(Port::get).collect();
        assert_eq!(ports, vec![1, 2, 3]);
    }

    #[test]
    fn should_resolve_configured_port() {
        let registry = registry_with(&[1, 2]);
        assert_eq!(registry.resolve("2").unwrap(), Port::new(2));
    }

    #[test]
    fn should_reject_unknown_port_on_resolve() {
        let registry = registry_with(&[1, 2]);
        let result = registry.resolve("7");
        assert!(matches!(result, Err(RelayHubError::InvalidPort(err)) if err.port == "7"));
    }

    #[test]
    fn should_reject_non_numeric_port_on_resolve() {
        let registry = registry_with(&[1]);
        assert!(matches!(
            registry.resolve("one"),
            Err(RelayHubError::InvalidPort(_))
        ));
    }

    #[tokio::test]
    async fn should_reject_lock_on_unknown_port() {
        let registry = registry_with(&[1]);
        assert!(matches!(
            registry.lock(Port::new(9)).await,
            Err(RelayHubError::InvalidPort(_))
        ));
    }

    #[test]
    fn should_start_with_every_relay_off_in_document() {
        let registry = registry_with(&[1, 2]);
        assert_eq!(
            registry.document(),
            vec![
                PersistedRelay::off(Port::new(1)),
                PersistedRelay::off(Port::new(2)),
            ]
        );
    }

    #[tokio::test]
    async fn should_persist_full_document_on_commit() {
        let store = MemoryStore::default();
        let registry = RelayRegistry::new(
            [
                (Port::new(1), FakeOutput::default()),
                (Port::new(2), FakeOutput::default()),
            ],
            store.clone(),
            FixedClock::default(),
        );

        let slot = registry.lock(Port::new(2)).await.unwrap();
        slot.output().set_level(RelayState::On).unwrap();
        registry.commit(Port::new(2), &slot).await.unwrap();

        let saved = store.saved().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].state, RelayState::Off);
        assert_eq!(saved[1].state, RelayState::On);
    }

    #[tokio::test]
    async fn should_surface_storage_failure_on_commit() {
        let store = MemoryStore::default();
        store.fail_saves(true);
        let registry =
            RelayRegistry::new([(Port::new(1), FakeOutput::default())], store, FixedClock::default());

        let slot = registry.lock(Port::new(1)).await.unwrap();
        let result = registry.commit(Port::new(1), &slot).await;
        assert!(matches!(result, Err(RelayHubError::Storage(_))));
    }
}
