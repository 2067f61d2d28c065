//! Shared application state for axum handlers.

use std::sync::Arc;

use relayhub_app::ports::{Clock, OutputLine, RelayStateStore};
use relayhub_app::scheduler::SchedulerEngine;
use relayhub_app::services::relay_service::RelayService;

/// Application state shared across all axum handlers.
///
/// Generic over the output line, store and clock to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<O, S, C> {
    /// Manual on/off and status queries.
    pub relay_service: Arc<RelayService<O, S, C>>,
    /// Daily windows.
    pub scheduler: Arc<SchedulerEngine<O, S, C>>,
    /// Shared secret expected in `X-API-Key`.
    pub api_key: Arc<str>,
}

impl<O, S, C> Clone for AppState<O, S, C> {
    fn clone(&self) -> Self {
        Self {
            relay_service: Arc::clone(&self.relay_service),
            scheduler: Arc::clone(&self.scheduler),
            api_key: Arc::clone(&self.api_key),
        }
    }
}

impl<O, S, C> AppState<O, S, C>
where
    O: OutputLine + 'static,
    S: RelayStateStore + Send + Sync + 'static,
    C: Clock + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    pub fn new(
        relay_service: Arc<RelayService<O, S, C>>,
        scheduler: Arc<SchedulerEngine<O, S, C>>,
        api_key: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            relay_service,
            scheduler,
            api_key: api_key.into(),
        }
    }
}
