//! Daily schedule handler.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use relayhub_app::ports::{Clock, OutputLine, RelayStateStore};
use relayhub_app::scheduler::ScheduleOutcome;
use relayhub_domain::port::Port;
use relayhub_domain::schedule::ScheduleRequest;
use relayhub_domain::time::TimeOfDay;

use crate::error::ApiError;
use crate::state::AppState;

/// Body returned by the schedule endpoint. `from`/`to` are `null` once
/// nothing is scheduled.
#[derive(Debug, Serialize)]
pub struct ScheduleBody {
    pub port: Port,
    pub from: Option<TimeOfDay>,
    pub to: Option<TimeOfDay>,
    pub message: String,
}

/// Possible responses from the schedule endpoint.
pub enum ScheduleResponse {
    Ok(Json<ScheduleBody>),
}

impl IntoResponse for ScheduleResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /schedule/{port}/{start}/{end}`
///
/// `null`/`null` clears the window; clearing a relay without one is not an
/// error.
pub async fn apply<O, S, C>(
    State(app): State<AppState<O, S, C>>,
    Path((port, start, end)): Path<(String, String, String)>,
) -> Result<ScheduleResponse, ApiError>
where
    O: OutputLine + 'static,
    S: RelayStateStore + Send + Sync + 'static,
    C: Clock + 'static,
{
    let port = app.relay_service.resolve(&port)?;
    let request = ScheduleRequest::parse(&start, &end)?;

    let body = match app.scheduler.apply(port, request).await? {
        ScheduleOutcome::Installed(schedule) => ScheduleBody {
            port,
            from: Some(schedule.start),
            to: Some(schedule.end),
            message: format!(
                "Scheduled LED on port {port} from {} to {} every day.",
                schedule.start, schedule.end
            ),
        },
        ScheduleOutcome::Cleared => ScheduleBody {
            port,
            from: None,
            to: None,
            message: format!("Schedule for LED on port {port} has been stopped."),
        },
        ScheduleOutcome::NothingToClear => ScheduleBody {
            port,
            from: None,
            to: None,
            message: format!("No active schedule found for port {port}."),
        },
    };
    Ok(ScheduleResponse::Ok(Json(body)))
}
