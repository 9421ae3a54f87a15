use crate::dashboard::SessionCommand;
use crate::models::{ActiveView, AppState, DashboardView, TimeRange};
use crate::Result;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize)]
struct CreatedSession {
    id: Uuid,
    #[serde(flatten)]
    view: DashboardView,
}

#[derive(Deserialize)]
pub(super) struct NavigateBody {
    view: ActiveView,
}

#[derive(Deserialize)]
pub(super) struct ChartBody {
    currency: Option<String>,
    #[serde(default)]
    range: TimeRange,
}

pub(super) async fn create(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let handle = state.sessions.create()?;
    let body = CreatedSession {
        id: handle.id,
        view: handle.latest().as_ref().clone(),
    };
    Ok((StatusCode::CREATED, Json(body)))
}

pub(super) async fn latest_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let view = state.sessions.get(id)?.latest();
    Ok((StatusCode::OK, Json(view.as_ref().clone())))
}

pub(super) async fn close(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.sessions.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn navigate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NavigateBody>,
) -> Result<StatusCode> {
    state
        .sessions
        .get(id)?
        .send(SessionCommand::Navigate(body.view))?;
    Ok(StatusCode::ACCEPTED)
}

pub(super) async fn select_chart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ChartBody>,
) -> Result<StatusCode> {
    state.sessions.get(id)?.send(SessionCommand::SelectChart {
        currency: body.currency,
        range: body.range,
    })?;
    Ok(StatusCode::ACCEPTED)
}
