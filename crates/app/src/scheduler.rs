//! Scheduler engine — daily start/end triggers per relay.
//!
//! A relay holds at most one [`ScheduleRegistration`]. Each registration owns
//! a single timer task that waits, re-reading the wall clock at short
//! intervals, until the next minute at which one of its edges is due, then
//! runs the trigger logic under the relay's lock:
//!
//! - **start**: switch on, unless a manual action happened inside the window
//!   since the last reset;
//! - **end**: switch off and reset the override flags, unconditionally.
//!
//! When both edges share a minute the start logic runs first and the end
//! logic second, within the same lock, so the outcome is always "off, flags
//! cleared".

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;

use relayhub_domain::error::RelayHubError;
use relayhub_domain::port::Port;
use relayhub_domain::relay::RelayState;
use relayhub_domain::schedule::{Edge, Schedule, ScheduleRequest};
use relayhub_domain::snapshot::PersistedRelay;

use crate::ports::{Clock, OutputLine, RelayStateStore};
use crate::registry::RelayRegistry;

/// A running pair of daily triggers. Dropping it stops future firings.
pub struct ScheduleRegistration {
    schedule: Schedule,
    task: JoinHandle<()>,
}

impl ScheduleRegistration {
    fn spawn<O, S, C>(registry: Weak<RelayRegistry<O, S, C>>, port: Port, schedule: Schedule) -> Self
    where
        O: OutputLine + 'static,
        S: RelayStateStore + Send + Sync + 'static,
        C: Clock + 'static,
    {
        let task = tokio::spawn(run_triggers(registry, port, schedule));
        Self { schedule, task }
    }

    #[must_use]
    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    #[cfg(test)]
    pub(crate) fn abort_handle(&self) -> tokio::task::AbortHandle {
        self.task.abort_handle()
    }
}

impl Drop for ScheduleRegistration {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Result of a schedule request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// A new window is active (any previous one was replaced).
    Installed(Schedule),
    /// The active window was removed.
    Cleared,
    /// Clearing was requested but no window was active.
    NothingToClear,
}

/// What [`SchedulerEngine::restore`] rebuilt at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// No document existed; every relay got the default record.
    pub fresh: bool,
    /// Relays whose output level was applied.
    pub relays: usize,
    /// Daily windows re-registered.
    pub schedules: usize,
}

/// Application service owning the per-relay daily triggers.
pub struct SchedulerEngine<O, S, C> {
    registry: Arc<RelayRegistry<O, S, C>>,
}

impl<O, S, C> SchedulerEngine<O, S, C>
where
    O: OutputLine + 'static,
    S: RelayStateStore + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn new(registry: Arc<RelayRegistry<O, S, C>>) -> Self {
        Self { registry }
    }

    /// Apply a parsed `/schedule` request.
    ///
    /// # Errors
    ///
    /// See [`set_schedule`](Self::set_schedule) and
    /// [`clear_schedule`](Self::clear_schedule).
    pub async fn apply(
        &self,
        port: Port,
        request: ScheduleRequest,
    ) -> Result<ScheduleOutcome, RelayHubError> {
        match request {
            ScheduleRequest::Set(schedule) => self
                .set_schedule(port, schedule)
                .await
                .map(ScheduleOutcome::Installed),
            ScheduleRequest::Clear => Ok(if self.clear_schedule(port).await? {
                ScheduleOutcome::Cleared
            } else {
                ScheduleOutcome::NothingToClear
            }),
        }
    }

    /// Install a daily window, replacing any existing one, and persist it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::InvalidPort`] for an unknown port (nothing is
    /// touched), or a storage error if the new window could not be persisted
    /// (the window is active regardless).
    #[tracing::instrument(skip(self), fields(%port, %schedule))]
    pub async fn set_schedule(
        &self,
        port: Port,
        schedule: Schedule,
    ) -> Result<Schedule, RelayHubError> {
        let mut slot = self.registry.lock(port).await?;
        let registration =
            ScheduleRegistration::spawn(Arc::downgrade(&self.registry), port, schedule);
        if slot.registration.replace(registration).is_some() {
            tracing::debug!("previous schedule cancelled");
        }
        tracing::info!("scheduled relay daily from {} to {}", schedule.start, schedule.end);
        self.registry.commit(port, &slot).await?;
        Ok(schedule)
    }

    /// Cancel the daily window of `port`.
    ///
    /// Returns `false` when there was nothing to cancel; that case neither
    /// errors nor writes to storage.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::InvalidPort`] for an unknown port, or a
    /// storage error when the removal could not be persisted.
    #[tracing::instrument(skip(self), fields(%port))]
    pub async fn clear_schedule(&self, port: Port) -> Result<bool, RelayHubError> {
        let mut slot = self.registry.lock(port).await?;
        let Some(previous) = slot.registration.take() else {
            tracing::debug!("no active schedule");
            return Ok(false);
        };
        drop(previous);
        tracing::info!("schedule stopped");
        self.registry.commit(port, &slot).await?;
        Ok(true)
    }

    /// Run the trigger logic for `edges`, in order, as if they fired now.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::InvalidPort`], a hardware error when the
    /// output could not be driven, or a storage error.
    pub async fn fire(&self, port: Port, edges: &[Edge]) -> Result<RelayState, RelayHubError> {
        fire_edges(&self.registry, port, edges).await
    }

    /// Active windows, keyed by port.
    pub async fn schedules(&self) -> BTreeMap<Port, Schedule> {
        let mut schedules = BTreeMap::new();
        for port in self.registry.ports() {
            let Ok(slot) = self.registry.lock(port).await else {
                continue;
            };
            if let Some(schedule) = slot.schedule() {
                schedules.insert(port, schedule);
            }
        }
        schedules
    }

    /// Rebuild output levels and daily windows from the persisted document,
    /// then write the normalized document back.
    ///
    /// Relays missing from the document start off with no schedule; records
    /// for unconfigured ports and unusable windows are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the document cannot be read or written,
    /// or a hardware error when an output cannot be driven.
    #[tracing::instrument(skip(self))]
    pub async fn restore(&self) -> Result<RestoreReport, RelayHubError> {
        let stored = self.registry.store().load().await?;
        let mut report = RestoreReport {
            fresh: stored.is_none(),
            ..RestoreReport::default()
        };

        let mut records: BTreeMap<Port, PersistedRelay> = BTreeMap::new();
        for record in stored.unwrap_or_default() {
            if self.registry.contains(record.port) {
                records.insert(record.port, record);
            } else {
                tracing::warn!(port = %record.port, "ignoring persisted relay without configured output");
            }
        }

        let ports: Vec<Port> = self.registry.ports().collect();
        for port in ports {
            let record = records
                .remove(&port)
                .unwrap_or_else(|| PersistedRelay::off(port));
            let mut slot = self.registry.lock(port).await?;
            slot.output().set_level(record.state)?;
            report.relays += 1;

            let schedule = record.schedule().unwrap_or_else(|(start, end)| {
                tracing::warn!(%port, %start, %end, "ignoring persisted schedule with malformed times");
                None
            });
            if let Some(schedule) = schedule {
                slot.registration = Some(ScheduleRegistration::spawn(
                    Arc::downgrade(&self.registry),
                    port,
                    schedule,
                ));
                report.schedules += 1;
            }
            self.registry.record(port, &slot)?;
        }

        self.registry.save().await?;
        Ok(report)
    }
}

/// Trigger logic shared by the timer tasks and [`SchedulerEngine::fire`].
async fn fire_edges<O, S, C>(
    registry: &RelayRegistry<O, S, C>,
    port: Port,
    edges: &[Edge],
) -> Result<RelayState, RelayHubError>
where
    O: OutputLine,
    S: RelayStateStore + Send + Sync,
    C: Clock,
{
    let mut guard = registry.lock(port).await?;
    let slot = &mut *guard;
    for edge in edges {
        match edge {
            Edge::Start if slot.overrides.suppresses_scheduled_on() => {
                tracing::info!(%port, "manual override during window, skipping turn on");
            }
            Edge::Start => {
                slot.output().set_level(RelayState::On)?;
                tracing::info!(%port, "scheduled turn on");
            }
            Edge::End => {
                slot.output().set_level(RelayState::Off)?;
                slot.overrides.reset();
                tracing::info!(%port, "scheduled turn off");
            }
        }
    }
    registry.commit(port, slot).await?;
    slot.output().read_level()
}

/// Longest single sleep of a timer task. The wall clock is re-read after
/// each one, so a DST change or a clock step delays an edge by at most this.
const MAX_NAP: Duration = Duration::from_secs(30);

/// Timer loop of one registration. Exits once the registry is gone; the
/// owning [`ScheduleRegistration`] aborts it when cancelled.
async fn run_triggers<O, S, C>(registry: Weak<RelayRegistry<O, S, C>>, port: Port, schedule: Schedule)
where
    O: OutputLine,
    S: RelayStateStore + Send + Sync,
    C: Clock,
{
    let Some(mut after) = registry.upgrade().map(|r| r.clock().now()) else {
        return;
    };
    loop {
        let (fire_at, edges) = schedule.next_fire(after);
        let live = loop {
            let Some(live) = registry.upgrade() else {
                return;
            };
            let now = live.clock().now();
            if now >= fire_at {
                break live;
            }
            drop(live);
            let wait = (fire_at - now).to_std().unwrap_or_default().min(MAX_NAP);
            tokio::time::sleep(wait).await;
        };

        if let Err(err) = fire_edges(&live, port, &edges).await {
            tracing::error!(%port, error = %err, ?edges, "scheduled trigger failed");
        }
        // never replay missed days after a clock jump
        after = fire_at.max(live.clock().now());
    }
}
