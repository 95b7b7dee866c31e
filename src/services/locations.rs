//! 地点索引
//!
//! 数据集中出现过的全部地点：去除首尾空白、丢弃空值、去重并按码位排序。

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::cache::{CacheStats, InvalidationHub, QueryCache};
use crate::error::Result;
use crate::models::{FreshnessToken, Record, Versioned};
use crate::services::parse::record_location;
use crate::storage::RowStore;

/// 计算地点列表
pub fn collect_locations(rows: &[Record]) -> Vec<String> {
    rows.iter()
        .filter_map(record_location)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// 地点索引（按新鲜度标记缓存）
pub struct LocationIndex {
    store: Arc<RowStore>,
    cache: Arc<QueryCache<FreshnessToken, Arc<Vec<String>>>>,
}

impl LocationIndex {
    pub const CACHE_NAME: &'static str = "locations";

    pub fn new(store: Arc<RowStore>, hub: &InvalidationHub, capacity: usize) -> Self {
        let cache = Arc::new(QueryCache::lru(Self::CACHE_NAME, capacity));
        let purge = Arc::clone(&cache);
        hub.register(Self::CACHE_NAME, move || purge.clear());
        Self { store, cache }
    }

    /// 排序去重后的地点列表
    pub fn locations(&self) -> Result<Versioned<Arc<Vec<String>>>> {
        let snapshot = self.store.snapshot()?;
        let value = self.cache.get_or_compute(snapshot.token, || {
            Ok(Arc::new(collect_locations(&snapshot.rows)))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySource;

    fn rows(csv: &str) -> Vec<Record> {
        crate::storage::Snapshot::parse(FreshnessToken::Absent, csv.as_bytes())
            .unwrap()
            .rows
    }

    #[test]
    fn test_locations_trimmed_deduplicated_sorted() {
        let rows = rows("location_name\n\" A\"\nB\na\n\"\"\nB\n");
        assert_eq!(collect_locations(&rows), vec!["A", "B", "a"]);
    }

    #[test]
    fn test_missing_location_column_yields_empty() {
        let rows = rows("timestamp\n2024-01-01\n");
        assert!(collect_locations(&rows).is_empty());
    }

    #[test]
    fn test_locations_cached_per_token() {
        let source = Arc::new(MemorySource::new("location_name\nNord\nSued\n"));
        let hub = Arc::new(InvalidationHub::new());
        let store = Arc::new(RowStore::new(Box::new(Arc::clone(&source)), Arc::clone(&hub)));
        let index = LocationIndex::new(store, &hub, 4);

        let first = index.locations().unwrap();
        let second = index.locations().unwrap();

        assert!(Arc::ptr_eq(&first.value, &second.value));
        assert_eq!(index.stats().misses, 1);
        assert_eq!(index.stats().hits, 1);

        source.replace("location_name\nWest\n");
        assert_eq!(*index.locations().unwrap().value, vec!["West"]);
    }
}
