//! 查询服务
//!
//! 供 HTTP 层调用的异步接口。数据集重新加载是同步文件 IO，
//! 因此查询在阻塞线程池中执行。

use async_trait::async_trait;
use std::sync::Arc;

use crate::cache::CacheStats;
use crate::error::{AppError, Result};
use crate::models::{DailyAggregate, DatasetStatus, RawPage, TimeSeriesPoint, Versioned};
use crate::services::dashboard::{Dashboard, RefreshTarget};

#[async_trait]
pub trait QueryService: Send + Sync {
    async fn list_locations(&self) -> Result<Versioned<Arc<Vec<String>>>>;
    async fn window_aggregate(&self, days: u32) -> Result<Versioned<Arc<Vec<DailyAggregate>>>>;
    async fn time_series(&self, location: &str) -> Result<Versioned<Arc<Vec<TimeSeriesPoint>>>>;
    async fn raw_page(&self, offset: usize, limit: usize) -> Result<Versioned<RawPage>>;
    async fn list_columns(&self) -> Result<Versioned<Vec<String>>>;
    async fn refresh(&self, target: RefreshTarget);
    async fn status(&self) -> Result<DatasetStatus>;
    fn cache_stats(&self) -> Vec<CacheStats>;
    fn reload_count(&self) -> u64;
    fn purge_count(&self) -> u64;
}

pub struct QueryServiceImpl {
    dashboard: Arc<Dashboard>,
}

impl QueryServiceImpl {
    pub fn new(dashboard: Arc<Dashboard>) -> Self {
        Self { dashboard }
    }

    async fn blocking<T, F>(&self, query: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Dashboard) -> Result<T> + Send + 'static,
    {
        let dashboard = Arc::clone(&self.dashboard);
        tokio::task::spawn_blocking(move || query(&dashboard))
            .await
            .map_err(|e| AppError::Internal(format!("查询任务失败: {}", e)))?
    }
}

#[async_trait]
impl QueryService for QueryServiceImpl {
    async fn list_locations(&self) -> Result<Versioned<Arc<Vec<String>>>> {
        self.blocking(|dashboard| dashboard.list_locations()).await
    }

    async fn window_aggregate(&self, days: u32) -> Result<Versioned<Arc<Vec<DailyAggregate>>>> {
        self.blocking(move |dashboard| dashboard.window_aggregate(days))
            .await
    }

    async fn time_series(&self, location: &str) -> Result<Versioned<Arc<Vec<TimeSeriesPoint>>>> {
        let location = location.to_string();
        self.blocking(move |dashboard| dashboard.time_series(&location))
            .await
    }

    async fn raw_page(&self, offset: usize, limit: usize) -> Result<Versioned<RawPage>> {
        self.blocking(move |dashboard| dashboard.raw_page(offset, limit))
            .await
    }

    async fn list_columns(&self) -> Result<Versioned<Vec<String>>> {
        self.blocking(|dashboard| dashboard.list_columns()).await
    }

    async fn refresh(&self, target: RefreshTarget) {
        self.dashboard.refresh(target);
    }

    async fn status(&self) -> Result<DatasetStatus> {
        self.blocking(|dashboard| dashboard.status()).await
    }

    fn cache_stats(&self) -> Vec<CacheStats> {
        self.dashboard.cache_stats()
    }

    fn reload_count(&self) -> u64 {
        self.dashboard.reload_count()
    }

    fn purge_count(&self) -> u64 {
        self.dashboard.purge_count()
    }
}

pub fn create_query_service(dashboard: Arc<Dashboard>) -> Box<dyn QueryService> {
    Box::new(QueryServiceImpl::new(dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::storage::MemorySource;

    #[tokio::test]
    async fn test_query_service_runs_queries() {
        let source = MemorySource::new(
            "timestamp,location_name,pedestrians_count\n2024-01-01T00:00Z,Nord,4\n",
        );
        let dashboard = Arc::new(Dashboard::new(Box::new(source), &CacheConfig::default()));
        let service = create_query_service(dashboard);

        let locations = service.list_locations().await.unwrap();
        assert_eq!(*locations.value, vec!["Nord"]);

        let series = service.time_series(" Nord ").await.unwrap();
        assert_eq!(series.value.len(), 1);
        assert_eq!(series.value[0].total, 4);

        let status = service.status().await.unwrap();
        assert!(status.source_present);
        assert_eq!(service.reload_count(), 1);
    }

    #[tokio::test]
    async fn test_query_service_absent_source() {
        let dashboard = Arc::new(Dashboard::new(
            Box::new(MemorySource::absent()),
            &CacheConfig::default(),
        ));
        let service = create_query_service(dashboard);

        let window = service.window_aggregate(7).await.unwrap();
        assert!(window.source_missing());
        assert!(window.value.is_empty());
    }
}
