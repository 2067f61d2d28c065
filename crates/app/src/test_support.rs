//! In-memory port implementations shared by the unit tests of this crate.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use relayhub_domain::error::RelayHubError;
use relayhub_domain::port::Port;
use relayhub_domain::relay::RelayState;
use relayhub_domain::snapshot::PersistedRelay;
use relayhub_domain::time::LocalTimestamp;

use crate::ports::{Clock, OutputLine, RelayStateStore};
use crate::registry::RelayRegistry;

/// 2024-03-`day` at `hour:minute`.
pub fn at(day: u32, hour: u32, minute: u32) -> LocalTimestamp {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Output line that remembers its level; clones share the line.
#[derive(Clone, Default)]
pub struct FakeOutput {
    level: Arc<Mutex<RelayState>>,
    fail_writes: Arc<AtomicBool>,
}

impl FakeOutput {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl OutputLine for FakeOutput {
    fn set_level(&self, state: RelayState) -> Result<(), RelayHubError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RelayHubError::Hardware("line write refused".into()));
        }
        *self.level.lock().unwrap() = state;
        Ok(())
    }

    fn read_level(&self) -> Result<RelayState, RelayHubError> {
        Ok(*self.level.lock().unwrap())
    }
}

#[derive(Default)]
struct StoreInner {
    stored: Mutex<Option<Vec<PersistedRelay>>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

/// Store keeping the last saved document in memory; clones share it.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl MemoryStore {
    /// Pretend `relays` was saved by a previous run.
    pub fn preload(&self, relays: Vec<PersistedRelay>) {
        *self.inner.stored.lock().unwrap() = Some(relays);
    }

    pub fn saved(&self) -> Option<Vec<PersistedRelay>> {
        self.inner.stored.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.inner.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, fail: bool) {
        self.inner.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl RelayStateStore for MemoryStore {
    async fn load(&self) -> Result<Option<Vec<PersistedRelay>>, RelayHubError> {
        Ok(self.saved())
    }

    async fn save(&self, relays: &[PersistedRelay]) -> Result<(), RelayHubError> {
        if self.inner.fail_saves.load(Ordering::SeqCst) {
            return Err(RelayHubError::Storage("disk full".into()));
        }
        *self.inner.stored.lock().unwrap() = Some(relays.to_vec());
        self.inner.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Clock frozen at a settable instant; clones share it.
#[derive(Clone)]
pub struct FixedClock {
    now: Arc<Mutex<LocalTimestamp>>,
}

impl FixedClock {
    pub fn at(now: LocalTimestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: LocalTimestamp) {
        *self.now.lock().unwrap() = now;
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(at(1, 12, 0))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> LocalTimestamp {
        *self.now.lock().unwrap()
    }
}

/// Registry over fresh fake outputs for `ports`.
pub fn registry_with(ports: &[u16]) -> RelayRegistry<FakeOutput, MemoryStore, FixedClock> {
    RelayRegistry::new(
        ports.iter().map(|p| (Port::new(*p), FakeOutput::default())),
        MemoryStore::default(),
        FixedClock::default(),
    )
}
