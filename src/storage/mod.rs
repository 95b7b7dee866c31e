//! 存储模块
//!
//! 数据源抽象与内存行存储。

pub mod row_store;
pub mod source;

pub use row_store::{RowStore, Snapshot};
pub use source::{DatasetSource, FileSource, MemorySource};
