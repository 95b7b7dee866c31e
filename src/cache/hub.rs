//! 失效中心
//!
//! 登记所有派生缓存的清空回调；数据重新加载时一次性清空全部派生缓存。

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

type PurgeFn = Box<dyn Fn() + Send + Sync>;

/// 派生缓存失效中心
#[derive(Default)]
pub struct InvalidationHub {
    callbacks: RwLock<Vec<(String, PurgeFn)>>,
    purges: AtomicU64,
}

impl std::fmt::Debug for InvalidationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationHub")
            .field("registered", &self.registered())
            .field("purges", &self.purge_count())
            .finish()
    }
}

impl InvalidationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记清空回调
    pub fn register<F>(&self, name: impl Into<String>, purge: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.write().push((name.into(), Box::new(purge)));
    }

    /// 调用全部清空回调，返回调用数量
    pub fn purge_all(&self) -> usize {
        let callbacks = self.callbacks.read();
        for (_, purge) in callbacks.iter() {
            purge();
        }
        self.purges.fetch_add(1, Ordering::Relaxed);
        debug!(caches = callbacks.len(), "purged all derived caches");
        callbacks.len()
    }

    /// 已执行的全量清空次数
    pub fn purge_count(&self) -> u64 {
        self.purges.load(Ordering::Relaxed)
    }

    /// 已登记的缓存名称
    pub fn registered(&self) -> Vec<String> {
        self.callbacks
            .read()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}
