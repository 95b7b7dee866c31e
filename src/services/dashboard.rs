//! 查询门面
//!
//! 持有行存储、失效中心与全部派生缓存，对外提供边界层所需的查询操作。
//! 每个进程构造一次，通过引用传递给各个请求处理程序。

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheStats, InvalidationHub};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::{DailyAggregate, DatasetStatus, RawPage, TimeSeriesPoint, Versioned};
use crate::services::locations::LocationIndex;
use crate::services::timeseries::TimeSeriesProjector;
use crate::services::window::WindowAggregator;
use crate::storage::{DatasetSource, FileSource, RowStore};

/// 显式刷新的目标缓存
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTarget {
    Locations,
    WindowAggregate,
    TimeSeries,
    All,
}

impl RefreshTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshTarget::Locations => "locations",
            RefreshTarget::WindowAggregate => "window_aggregate",
            RefreshTarget::TimeSeries => "timeseries",
            RefreshTarget::All => "all",
        }
    }
}

/// 查询门面
pub struct Dashboard {
    hub: Arc<InvalidationHub>,
    store: Arc<RowStore>,
    locations: LocationIndex,
    window: WindowAggregator,
    timeseries: TimeSeriesProjector,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("store", &self.store)
            .field("hub", &self.hub)
            .finish()
    }
}

impl Dashboard {
    /// 基于任意数据源创建
    pub fn new(source: Box<dyn DatasetSource>, config: &CacheConfig) -> Self {
        let hub = Arc::new(InvalidationHub::new());
        let store = Arc::new(RowStore::new(source, Arc::clone(&hub)));

        let locations = LocationIndex::new(Arc::clone(&store), &hub, config.location_capacity);
        let window = WindowAggregator::new(Arc::clone(&store), &hub, config.window_capacity);
        let timeseries =
            TimeSeriesProjector::new(Arc::clone(&store), &hub, config.timeseries_capacity);

        Self {
            hub,
            store,
            locations,
            window,
            timeseries,
        }
    }

    /// 基于磁盘 CSV 文件创建
    pub fn from_path(path: impl AsRef<Path>, config: &CacheConfig) -> Self {
        Self::new(Box::new(FileSource::new(path.as_ref())), config)
    }

    /// 排序去重后的地点列表
    pub fn list_locations(&self) -> Result<Versioned<Arc<Vec<String>>>> {
        self.locations.locations()
    }

    /// 最近 `days` 个日历日的逐日汇总
    pub fn window_aggregate(&self, days: u32) -> Result<Versioned<Arc<Vec<DailyAggregate>>>> {
        self.window.window_aggregate(days)
    }

    /// 单个地点的时间序列
    pub fn time_series(&self, location: &str) -> Result<Versioned<Arc<Vec<TimeSeriesPoint>>>> {
        self.timeseries.time_series(location)
    }

    /// 原始数据分页，偏移超出范围时返回空页
    pub fn raw_page(&self, offset: usize, limit: usize) -> Result<Versioned<RawPage>> {
        let snapshot = self.store.snapshot()?;
        let total = snapshot.rows.len();
        let rows = snapshot
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(Versioned::new(snapshot.token, RawPage { total, rows }))
    }

    /// 当前数据集的表头字段名
    pub fn list_columns(&self) -> Result<Versioned<Vec<String>>> {
        let snapshot = self.store.snapshot()?;
        Ok(Versioned::new(snapshot.token, snapshot.columns.to_vec()))
    }

    pub fn refresh_locations(&self) {
        self.locations.refresh();
    }

    pub fn refresh_window_aggregate(&self) {
        self.window.refresh();
    }

    pub fn refresh_time_series(&self) {
        self.timeseries.refresh();
    }

    /// 清空全部派生缓存
    pub fn refresh_all(&self) {
        self.hub.purge_all();
    }

    /// 按目标刷新
    pub fn refresh(&self, target: RefreshTarget) {
        info!(target = target.as_str(), "explicit cache refresh");
        match target {
            RefreshTarget::Locations => self.refresh_locations(),
            RefreshTarget::WindowAggregate => self.refresh_window_aggregate(),
            RefreshTarget::TimeSeries => self.refresh_time_series(),
            RefreshTarget::All => self.refresh_all(),
        }
    }

    /// 数据集状态
    pub fn status(&self) -> Result<DatasetStatus> {
        let snapshot = self.store.snapshot()?;
        Ok(DatasetStatus {
            source_present: !snapshot.token.is_absent(),
            token: snapshot.token.to_string(),
            row_count: snapshot.rows.len(),
            column_count: snapshot.columns.len(),
            loaded_at: snapshot.loaded_at,
        })
    }

    /// 各派生缓存的统计
    pub fn cache_stats(&self) -> Vec<CacheStats> {
        vec![
            self.locations.stats(),
            self.window.stats(),
            self.timeseries.stats(),
        ]
    }

    /// 数据集加载次数
    pub fn reload_count(&self) -> u64 {
        self.store.reload_count()
    }

    /// 全量清空次数
    pub fn purge_count(&self) -> u64 {
        self.hub.purge_count()
    }
}
