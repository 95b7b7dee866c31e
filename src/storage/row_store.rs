//! 内存行存储
//!
//! 首次访问时加载数据集，新鲜度标记变化时整体替换快照，从不原地修改。
//! 每次重新加载都会先通知失效中心，再返回新数据。

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

use crate::cache::InvalidationHub;
use crate::error::{AppError, Result};
use crate::models::{FreshnessToken, Record};
use crate::storage::source::DatasetSource;

/// 数据集快照
#[derive(Debug)]
pub struct Snapshot {
    /// 加载时的新鲜度标记
    pub token: FreshnessToken,
    /// 表头字段名
    pub columns: Arc<[String]>,
    /// 全部数据行
    pub rows: Vec<Record>,
    /// 加载时间
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    /// 数据源缺失时的空快照
    pub fn absent() -> Self {
        Self {
            token: FreshnessToken::Absent,
            columns: Arc::from(Vec::new()),
            rows: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    /// 按 CSV 解析数据流
    ///
    /// 短行以空值补齐，长行截断到表头宽度。
    pub fn parse<R: Read>(token: FreshnessToken, reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let columns: Arc<[String]> = csv_reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                if idx == 0 {
                    name.trim_start_matches('\u{feff}').to_string()
                } else {
                    name.to_string()
                }
            })
            .collect();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(Record::new(
                Arc::clone(&columns),
                record.iter().map(str::to_owned).collect(),
            ));
        }

        Ok(Self {
            token,
            columns,
            rows,
            loaded_at: Utc::now(),
        })
    }
}

/// 行存储
pub struct RowStore {
    source: Box<dyn DatasetSource>,
    hub: Arc<InvalidationHub>,
    current: ArcSwapOption<Snapshot>,
    reload_lock: Mutex<()>,
    reloads: AtomicU64,
}

impl std::fmt::Debug for RowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStore")
            .field("source", &self.source.describe())
            .field("reloads", &self.reload_count())
            .finish()
    }
}

impl RowStore {
    pub fn new(source: Box<dyn DatasetSource>, hub: Arc<InvalidationHub>) -> Self {
        Self {
            source,
            hub,
            current: ArcSwapOption::from(None),
            reload_lock: Mutex::new(()),
            reloads: AtomicU64::new(0),
        }
    }

    /// 读取数据源当前的新鲜度标记
    pub fn current_token(&self) -> Result<FreshnessToken> {
        self.source.token().map_err(|e| {
            AppError::Dataset(format!("无法读取 {} 的状态: {}", self.source.describe(), e))
        })
    }

    /// 返回当前有效的快照，标记变化或尚未加载时先重新加载
    pub fn snapshot(&self) -> Result<Arc<Snapshot>> {
        let token = self.current_token()?;
        if let Some(snapshot) = self.loaded_with(token) {
            return Ok(snapshot);
        }

        let _guard = self.reload_lock.lock();
        // 等锁期间可能已有其他调用方完成加载
        let token = self.current_token()?;
        if let Some(snapshot) = self.loaded_with(token) {
            return Ok(snapshot);
        }

        let previous = self.current.load_full().map(|s| s.token);
        let snapshot = match self.load(token) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                warn!(source = %self.source.describe(), error = %e, "dataset reload failed");
                return Err(e);
            }
        };

        self.current.store(Some(Arc::clone(&snapshot)));
        self.reloads.fetch_add(1, Ordering::Relaxed);
        self.hub.purge_all();

        info!(
            source = %self.source.describe(),
            token = %snapshot.token,
            previous = ?previous.map(|t| t.to_string()),
            rows = snapshot.rows.len(),
            columns = snapshot.columns.len(),
            "dataset loaded"
        );

        Ok(snapshot)
    }

    /// 全部数据行，以快照形式返回以保证行与标记一致
    pub fn rows(&self) -> Result<Arc<Snapshot>> {
        self.snapshot()
    }

    /// 当前数据集的表头字段名
    pub fn columns(&self) -> Result<Arc<[String]>> {
        Ok(Arc::clone(&self.snapshot()?.columns))
    }

    /// 已完成的加载次数
    pub fn reload_count(&self) -> u64 {
        self.reloads.load(Ordering::Relaxed)
    }

    fn loaded_with(&self, token: FreshnessToken) -> Option<Arc<Snapshot>> {
        self.current
            .load_full()
            .filter(|snapshot| snapshot.token == token)
    }

    fn load(&self, token: FreshnessToken) -> Result<Snapshot> {
        if token.is_absent() {
            return Ok(Snapshot::absent());
        }

        let reader = self.source.open().map_err(|e| {
            AppError::Dataset(format!("无法打开 {}: {}", self.source.describe(), e))
        })?;

        match reader {
            Some(reader) => Snapshot::parse(token, reader),
            // 读取状态与打开之间文件被删除
            None => Ok(Snapshot::absent()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::source::{MemorySource, MockDatasetSource};
    use std::io;
    use std::time::{Duration, UNIX_EPOCH};

    const DATA: &str = "timestamp,location_name,pedestrians_count\n\
                        2024-01-01T10:00:00Z,Nord,5\n\
                        2024-01-01T11:00:00Z,Sued,7\n";

    fn store_over(source: Arc<MemorySource>) -> (RowStore, Arc<InvalidationHub>) {
        let hub = Arc::new(InvalidationHub::new());
        (RowStore::new(Box::new(source), Arc::clone(&hub)), hub)
    }

    #[test]
    fn test_rows_load_with_header_fields() {
        let (store, _) = store_over(Arc::new(MemorySource::new(DATA)));

        let snapshot = store.rows().unwrap();
        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(
            snapshot.columns.as_ref(),
            ["timestamp", "location_name", "pedestrians_count"]
        );
        assert_eq!(snapshot.rows[1].get("location_name"), Some("Sued"));
    }

    #[test]
    fn test_unchanged_source_is_loaded_once() {
        let (store, hub) = store_over(Arc::new(MemorySource::new(DATA)));

        let first = store.snapshot().unwrap();
        let second = store.snapshot().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.reload_count(), 1);
        assert_eq!(hub.purge_count(), 1);
    }

    #[test]
    fn test_token_change_reloads_and_purges() {
        let source = Arc::new(MemorySource::new(DATA));
        let (store, hub) = store_over(Arc::clone(&source));
        store.snapshot().unwrap();

        source.replace("timestamp,location_name\n2024-02-01,West\n");
        let snapshot = store.snapshot().unwrap();

        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0].get("location_name"), Some("West"));
        assert_eq!(store.reload_count(), 2);
        assert_eq!(hub.purge_count(), 2);
    }

    #[test]
    fn test_absent_source_yields_empty_snapshot() {
        let (store, _) = store_over(Arc::new(MemorySource::absent()));

        let snapshot = store.snapshot().unwrap();
        assert!(snapshot.token.is_absent());
        assert!(snapshot.rows.is_empty());
        assert!(store.columns().unwrap().is_empty());
    }

    #[test]
    fn test_ragged_rows_are_normalised() {
        let source = MemorySource::new("a,b,c\n1\n1,2,3,4\n");
        let (store, _) = store_over(Arc::new(source));

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.rows[0].get("c"), Some(""));
        assert_eq!(snapshot.rows[1].len(), 3);
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let source = MemorySource::new("\u{feff}timestamp,location_name\n2024-01-01,Nord\n");
        let (store, _) = store_over(Arc::new(source));

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.rows[0].get("timestamp"), Some("2024-01-01"));
    }

    #[test]
    fn test_unreadable_source_keeps_previous_snapshot() {
        let mut mock = MockDatasetSource::new();
        // 每次读取状态都返回新的标记，迫使第二次查询重新加载
        let mut calls = 0u64;
        mock.expect_token().returning(move || {
            calls += 1;
            Ok(FreshnessToken::Modified(UNIX_EPOCH + Duration::from_secs(calls)))
        });
        let mut opens = 0;
        mock.expect_open().returning(move || {
            opens += 1;
            if opens == 1 {
                Ok(Some(Box::new(io::Cursor::new(b"a\n1\n".to_vec())) as Box<dyn Read + Send>))
            } else {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            }
        });
        mock.expect_describe().returning(|| "mock".to_string());

        let hub = Arc::new(InvalidationHub::new());
        let store = RowStore::new(Box::new(mock), Arc::clone(&hub));

        assert_eq!(store.snapshot().unwrap().rows.len(), 1);
        let err = store.snapshot().unwrap_err();
        assert!(matches!(err, AppError::Dataset(_)));
        assert_eq!(store.reload_count(), 1);
        assert_eq!(hub.purge_count(), 1);
    }

    #[test]
    fn test_token_error_is_dataset_error() {
        let mut mock = MockDatasetSource::new();
        mock.expect_token()
            .returning(|| Err(io::Error::other("stat failed")));
        mock.expect_describe().returning(|| "mock".to_string());

        let store = RowStore::new(Box::new(mock), Arc::new(InvalidationHub::new()));
        assert!(matches!(store.snapshot(), Err(AppError::Dataset(_))));
    }
}
