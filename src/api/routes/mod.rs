//! Routes 模块
//!
//! 定义 API 路由。

pub mod dataset_routes;
pub mod refresh_routes;
