use crate::converter::{convert_with, ConversionRequest, ConversionView};
use crate::models::AppState;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;

pub(super) async fn currencies(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.catalog.entries())).into_response()
}

/// Always answers 200: failures are part of the rendered message
pub(super) async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConversionRequest>,
) -> impl IntoResponse {
    let conversion = convert_with(state.fetcher.as_ref(), &query).await;
    (StatusCode::OK, Json(ConversionView::from(conversion))).into_response()
}
