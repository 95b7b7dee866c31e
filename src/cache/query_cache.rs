//! 查询结果缓存
//!
//! 以 (新鲜度标记, 查询参数) 为键缓存派生结果，提供 `get_or_compute` 与 `clear`。

use serde::Serialize;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::cache::strategy::{CacheStrategy, LruStrategy};
use crate::error::Result;

/// 缓存统计
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub name: String,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub clears: u64,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// 查询结果缓存
pub struct QueryCache<K, V> {
    name: &'static str,
    strategy: Box<dyn CacheStrategy<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    clears: AtomicU64,
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + Send + std::fmt::Debug + 'static,
    V: Clone + Send + 'static,
{
    /// 创建使用 LRU 策略的缓存
    pub fn lru(name: &'static str, capacity: usize) -> Self {
        Self::with_strategy(name, Box::new(LruStrategy::new(capacity)))
    }

    /// 使用自定义策略创建缓存
    pub fn with_strategy(name: &'static str, strategy: Box<dyn CacheStrategy<K, V>>) -> Self {
        Self {
            name,
            strategy,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            clears: AtomicU64::new(0),
        }
    }

    /// 命中则返回缓存值，否则计算并写入
    ///
    /// 计算在锁外进行；并发计算同一个键时后写入者覆盖先写入者。
    /// 计算失败时不写入任何条目。
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.strategy.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(cache = self.name, ?key, "cache hit");
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(cache = self.name, ?key, "cache miss");

        let value = compute()?;
        if self.strategy.put(key, value.clone()) {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        Ok(value)
    }

    /// 清空全部条目
    pub fn clear(&self) {
        self.strategy.clear();
        self.clears.fetch_add(1, Ordering::Relaxed);
        debug!(cache = self.name, "cache cleared");
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.strategy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 获取缓存统计
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            name: self.name.to_string(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            size: self.strategy.len(),
            capacity: self.strategy.capacity(),
        }
    }
}
