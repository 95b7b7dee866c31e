//! Footfall - 行人计数数据集查询服务
//!
//! 从 CSV 文件读取行人计数数据，按数据文件的新鲜度标记缓存派生视图
//! （地点列表、逐日窗口汇总、单地点时间序列），文件变化后自动失效。

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;
