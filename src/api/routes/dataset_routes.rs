//! Dataset Routes
//!
//! 定义数据集查询相关的 API 路由。

use crate::api::handlers::dataset_handler::*;
use axum::{Router, routing::get};

use crate::api::app_state::AppState;

/// 创建数据集查询路由器
pub fn create_dataset_router() -> Router<AppState> {
    Router::new()
        .route("/locations", get(list_locations))
        .route("/analysis/adult-window", get(window_aggregate))
        .route("/timeseries/:location", get(time_series))
        .route("/rows", get(list_rows))
        .route("/columns", get(list_columns))
}
