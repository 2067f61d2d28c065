//! Manual control and status handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use relayhub_app::ports::{Clock, OutputLine, RelayStateStore};
use relayhub_domain::error::RelayHubError;
use relayhub_domain::port::Port;
use relayhub_domain::relay::{RelayState, RelayStatus};

use crate::error::ApiError;
use crate::state::AppState;

/// Body returned after a manual switch.
#[derive(Debug, Serialize)]
pub struct SetStateBody {
    pub port: Port,
    pub state: RelayState,
    pub message: String,
}

/// Possible responses from the manual switch endpoint.
pub enum SetStateResponse {
    Ok(Json<SetStateBody>),
}

impl IntoResponse for SetStateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<RelayStatus>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /led/{port}/{state}`
pub async fn set_state<O, S, C>(
    State(app): State<AppState<O, S, C>>,
    Path((port, state)): Path<(String, String)>,
) -> Result<SetStateResponse, ApiError>
where
    O: OutputLine + 'static,
    S: RelayStateStore + Send + Sync + 'static,
    C: Clock + 'static,
{
    let port = app.relay_service.resolve(&port)?;
    let state: RelayState = state.parse().map_err(RelayHubError::from)?;
    let status = app.relay_service.set_state(port, state).await?;
    Ok(SetStateResponse::Ok(Json(SetStateBody {
        port: status.port,
        state: status.state,
        message: format!("LED on port {} turned {} manually", status.port, status.state),
    })))
}

/// `GET /relays`
pub async fn list<O, S, C>(
    State(app): State<AppState<O, S, C>>,
) -> Result<ListResponse, ApiError>
where
    O: OutputLine + 'static,
    S: RelayStateStore + Send + Sync + 'static,
    C: Clock + 'static,
{
    let relays = app.relay_service.list().await?;
    Ok(ListResponse::Ok(Json(relays)))
}
