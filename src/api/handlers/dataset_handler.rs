use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{app_state::AppState, dto::dataset_dto::*},
    error::AppError,
};

pub async fn list_locations(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    debug!("Listing locations");

    let answer = state.query_service.list_locations().await?;

    Ok(Json(LocationsResponse {
        source_missing: answer.source_missing(),
        locations: answer.value.to_vec(),
    }))
}

pub async fn window_aggregate(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Result<impl IntoResponse, AppError> {
    let days = params.resolve(&state.query_config)?;
    debug!("Computing window aggregate: days={}", days);

    let answer = state.query_service.window_aggregate(days).await?;

    Ok(Json(WindowAggregateResponse {
        days,
        source_missing: answer.source_missing(),
        rows: answer.value.to_vec(),
    }))
}

pub async fn time_series(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let location = resolve_location(&location)?;
    debug!("Projecting time series: location={}", location);

    let answer = state.query_service.time_series(location).await?;

    Ok(Json(TimeSeriesResponse {
        location: location.to_string(),
        source_missing: answer.source_missing(),
        points: answer.value.to_vec(),
    }))
}

pub async fn list_rows(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let (offset, limit) = params.resolve(&state.query_config)?;
    debug!("Listing raw rows: offset={}, limit={}", offset, limit);

    let answer = state.query_service.raw_page(offset, limit).await?;
    let source_missing = answer.source_missing();
    let page = answer.value;

    Ok(Json(RowsResponse {
        total: page.total,
        offset,
        limit,
        rows: page.rows,
        source_missing,
    }))
}

pub async fn list_columns(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    debug!("Listing columns");

    let answer = state.query_service.list_columns().await?;

    Ok(Json(ColumnsResponse {
        source_missing: answer.source_missing(),
        columns: answer.value,
    }))
}
