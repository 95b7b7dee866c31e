//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod dataset_handler;
pub mod refresh_handler;

pub use dataset_handler::*;
pub use refresh_handler::*;
