//! 缓存模块
//!
//! 派生视图的查询缓存、淘汰策略与全局失效中心。

pub mod hub;
pub mod query_cache;
pub mod strategy;

pub use hub::InvalidationHub;
pub use query_cache::{CacheStats, QueryCache};
pub use strategy::{CacheStrategy, LruStrategy};
