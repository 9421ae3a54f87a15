use crate::models::AppState;
use crate::render::{render_clock, WORLD_CLOCK_ZONES};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use http::StatusCode;

mod currency;
mod session;

pub fn init(state: AppState) -> Router {
    Router::new()
        .route("/currencies", get(currency::currencies))
        .route("/convert", get(currency::convert))
        .route("/clock", get(clock))
        .route("/sessions", post(session::create))
        .route(
            "/sessions/{id}",
            get(session::latest_view).delete(session::close),
        )
        .route("/sessions/{id}/view", put(session::navigate))
        .route("/sessions/{id}/chart", put(session::select_chart))
        .with_state(state)
}

async fn clock() -> impl IntoResponse {
    let view = render_clock(chrono::Utc::now(), &WORLD_CLOCK_ZONES);
    (StatusCode::OK, Json(view)).into_response()
}
