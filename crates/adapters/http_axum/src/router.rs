//! Axum router assembly.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use relayhub_app::ports::{Clock, OutputLine, RelayStateStore};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Every route except `/health` sits behind the API key check.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<O, S, C>(state: AppState<O, S, C>) -> Router
where
    O: OutputLine + 'static,
    S: RelayStateStore + Send + Sync + 'static,
    C: Clock + 'static,
{
    let protected = crate::api::routes::<O, S, C>().layer(middleware::from_fn_with_state(
        Arc::clone(&state.api_key),
        crate::auth::require_api_key,
    ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
