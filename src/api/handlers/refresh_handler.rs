use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    api::{app_state::AppState, dto::dataset_dto::RefreshResponse},
    services::RefreshTarget,
};

async fn refresh(state: &AppState, target: RefreshTarget) -> Json<RefreshResponse> {
    state.query_service.refresh(target).await;
    Json(RefreshResponse {
        refreshed: target.as_str().to_string(),
        status: "ok".to_string(),
    })
}

pub async fn refresh_locations(State(state): State<AppState>) -> impl IntoResponse {
    refresh(&state, RefreshTarget::Locations).await
}

pub async fn refresh_window_aggregate(State(state): State<AppState>) -> impl IntoResponse {
    refresh(&state, RefreshTarget::WindowAggregate).await
}

pub async fn refresh_time_series(State(state): State<AppState>) -> impl IntoResponse {
    refresh(&state, RefreshTarget::TimeSeries).await
}

pub async fn refresh_all(State(state): State<AppState>) -> impl IntoResponse {
    refresh(&state, RefreshTarget::All).await
}
