//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod relays;
#[allow(clippy::missing_errors_doc)]
pub mod schedules;

use axum::Router;
use axum::routing::get;

use relayhub_app::ports::{Clock, OutputLine, RelayStateStore};

use crate::state::AppState;

/// Build the key-protected routes.
pub fn routes<O, S, C>() -> Router<AppState<O, S, C>>
where
    O: OutputLine + 'static,
    S: RelayStateStore + Send + Sync + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/led/{port}/{state}", get(relays::set_state::<O, S, C>))
        .route("/relays", get(relays::list::<O, S, C>))
        .route(
            "/schedule/{port}/{start}/{end}",
            get(schedules::apply::<O, S, C>),
        )
}
