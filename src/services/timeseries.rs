//! 时间序列投影
//!
//! 单个地点的数据行按时间戳字符串升序排列，投影出八个计数字段。

use std::sync::Arc;

use crate::cache::{CacheStats, InvalidationHub, QueryCache};
use crate::error::Result;
use crate::models::{FreshnessToken, Record, TimeSeriesPoint, Versioned, columns};
use crate::services::parse::{count, record_location};
use crate::storage::RowStore;

/// 将数据行投影为时间序列点
pub fn project_point(record: &Record) -> TimeSeriesPoint {
    TimeSeriesPoint {
        timestamp: record
            .get(columns::TIMESTAMP)
            .unwrap_or_default()
            .to_string(),
        total: count(record, columns::TOTAL),
        ltr: count(record, columns::LTR),
        rtl: count(record, columns::RTL),
        adult: count(record, columns::ADULT),
        child: count(record, columns::CHILD),
        zone1: count(record, columns::ZONE_1),
        zone2: count(record, columns::ZONE_2),
        zone3: count(record, columns::ZONE_3),
    }
}

/// 计算单个地点的时间序列
///
/// 地点区分大小写，比较前两侧都去除首尾空白。缺失时间戳按空串排在最前。
pub fn project_location(rows: &[Record], location: &str) -> Vec<TimeSeriesPoint> {
    let location = location.trim();
    let mut points: Vec<TimeSeriesPoint> = rows
        .iter()
        .filter(|record| record_location(record) == Some(location))
        .map(project_point)
        .collect();
    points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    points
}

/// 时间序列投影器（按新鲜度标记与地点缓存）
pub struct TimeSeriesProjector {
    store: Arc<RowStore>,
    cache: Arc<QueryCache<(FreshnessToken, String), Arc<Vec<TimeSeriesPoint>>>>,
}

impl TimeSeriesProjector {
    pub const CACHE_NAME: &'static str = "timeseries";

    pub fn new(store: Arc<RowStore>, hub: &InvalidationHub, capacity: usize) -> Self {
        let cache = Arc::new(QueryCache::lru(Self::CACHE_NAME, capacity));
        let purge = Arc::clone(&cache);
        hub.register(Self::CACHE_NAME, move || purge.clear());
        Self { store, cache }
    }

    /// 单个地点的时间序列，未知地点返回空序列
    pub fn time_series(&self, location: &str) -> Result<Versioned<Arc<Vec<TimeSeriesPoint>>>> {
        let location = location.trim();
        let snapshot = self.store.snapshot()?;
        let value = self
            .cache
            .get_or_compute((snapshot.token, location.to_string()), || {
                Ok(Arc::new(project_location(&snapshot.rows, location)))
            })?;
        Ok(Versioned::new(snapshot.token, value))
    }

    /// 仅清空本缓存
    pub fn refresh(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
