//! 缓存淘汰策略
//!
//! `QueryCache` 通过 `CacheStrategy` 存取条目，淘汰策略可替换。

use lru::LruCache;
use parking_lot::Mutex;
use std::hash::Hash;
use std::num::NonZeroUsize;

/// 缓存存储策略
pub trait CacheStrategy<K, V>: Send + Sync {
    /// 读取条目并刷新其最近使用时间
    fn get(&self, key: &K) -> Option<V>;

    /// 写入条目，返回是否因此淘汰了其他条目
    fn put(&self, key: K, value: V) -> bool;

    /// 清空全部条目
    fn clear(&self);

    /// 当前条目数
    fn len(&self) -> usize;

    /// 容量上限
    fn capacity(&self) -> usize;
}

/// 最近最少使用淘汰策略
pub struct LruStrategy<K: Hash + Eq, V> {
    capacity: NonZeroUsize,
    entries: Mutex<LruCache<K, V>>,
}

impl<K: Hash + Eq, V> LruStrategy<K, V> {
    /// 创建 LRU 策略，容量为 0 时按 1 处理
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            capacity,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl<K, V> CacheStrategy<K, V> for LruStrategy<K, V>
where
    K: Hash + Eq + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    fn put(&self, key: K, value: V) -> bool {
        let mut entries = self.entries.lock();
        let evicts = !entries.contains(&key) && entries.len() >= self.capacity.get();
        entries.put(key, value);
        evicts
    }

    fn clear(&self) {
        // 整体替换，读者只会看到旧表或空表
        *self.entries.lock() = LruCache::new(self.capacity);
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    fn capacity(&self) -> usize {
        self.capacity.get()
    }
}
