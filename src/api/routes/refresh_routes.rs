//! Refresh Routes
//!
//! 显式清空派生缓存的 API 路由。

use crate::api::handlers::refresh_handler::*;
use axum::{Router, routing::post};

use crate::api::app_state::AppState;

/// 创建缓存刷新路由器
pub fn create_refresh_router() -> Router<AppState> {
    Router::new()
        .route("/refresh/locations", post(refresh_locations))
        .route("/refresh/window", post(refresh_window_aggregate))
        .route("/refresh/timeseries", post(refresh_time_series))
        .route("/refresh/all", post(refresh_all))
}
