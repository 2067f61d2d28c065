//! Relay service — manual on/off and status queries.

use std::sync::Arc;

use relayhub_domain::error::RelayHubError;
use relayhub_domain::port::Port;
use relayhub_domain::relay::{RelayState, RelayStatus};
use relayhub_domain::time::TimeOfDay;

use crate::ports::{Clock, OutputLine, RelayStateStore};
use crate::registry::RelayRegistry;

/// Application service for manual relay control.
pub struct RelayService<O, S, C> {
    registry: Arc<RelayRegistry<O, S, C>>,
}

impl<O, S, C> RelayService<O, S, C>
where
    O: OutputLine,
    S: RelayStateStore + Send + Sync,
    C: Clock,
{
    pub fn new(registry: Arc<RelayRegistry<O, S, C>>) -> Self {
        Self { registry }
    }

    /// Parse a raw port and check that a relay is configured for it.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::InvalidPort`] otherwise.
    pub fn resolve(&self, raw: &str) -> Result<Port, RelayHubError> {
        self.registry.resolve(raw)
    }

    /// Switch a relay by hand.
    ///
    /// The output is written first; the override flags and the persisted
    /// document are only updated once the write succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::InvalidPort`] for an unknown port,
    /// [`RelayHubError::Hardware`] when the write fails (nothing else
    /// changes), or a storage error when the new level could not be
    /// persisted (the output and flags keep the new level).
    #[tracing::instrument(skip(self), fields(%port, %state))]
    pub async fn set_state(
        &self,
        port: Port,
        state: RelayState,
    ) -> Result<RelayStatus, RelayHubError> {
        let mut slot = self.registry.lock(port).await?;
        slot.output().set_level(state)?;

        let now = TimeOfDay::of(self.registry.clock().now());
        let schedule = slot.schedule();
        slot.overrides.record_manual(now, schedule.as_ref());
        tracing::info!(
            during_window = slot.overrides.manual_during_window,
            "relay switched manually"
        );

        self.registry.commit(port, &slot).await?;
        Ok(RelayStatus { port, state })
    }

    /// Live status of one relay.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::InvalidPort`] for an unknown port, or
    /// [`RelayHubError::Hardware`] when the line cannot be read.
    pub async fn status(&self, port: Port) -> Result<RelayStatus, RelayHubError> {
        let slot = self.registry.lock(port).await?;
        let state = slot.output().read_level()?;
        Ok(RelayStatus { port, state })
    }

    /// Live status of every configured relay, ordered by port.
    ///
    /// # Errors
    ///
    /// Returns [`RelayHubError::Hardware`] when a line cannot be read.
    pub async fn list(&self) -> Result<Vec<RelayStatus>, RelayHubError> {
        let mut statuses = Vec::new();
        for port in self.registry.ports() {
            statuses.push(self.status(port).await?);
        }
        Ok(statuses)
    }
}
