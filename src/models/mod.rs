//! 数据模型模块
//!
//! 定义数据行、新鲜度标记以及各派生视图的数据结构。

pub mod aggregate;
pub mod record;
pub mod token;

pub use aggregate::{DailyAggregate, DatasetStatus, RawPage, TimeSeriesPoint};
pub use record::{Record, columns};
pub use token::{FreshnessToken, Versioned};
