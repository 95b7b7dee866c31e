//! 数据源抽象
//!
//! `DatasetSource` 提供两项能力：读取新鲜度标记、打开数据流。
//! 磁盘文件使用 `FileSource`，测试可使用 `MemorySource` 模拟文件变更。

use parking_lot::RwLock;
use std::fs::File;
use std::io::{self, Cursor, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::models::FreshnessToken;

/// 数据源
#[cfg_attr(test, mockall::automock)]
pub trait DatasetSource: Send + Sync {
    /// 读取当前新鲜度标记，数据源不存在时返回 `Absent`
    fn token(&self) -> io::Result<FreshnessToken>;

    /// 打开数据流，数据源不存在时返回 None
    fn open(&self) -> io::Result<Option<Box<dyn Read + Send>>>;

    /// 数据源描述，用于日志
    fn describe(&self) -> String;
}

/// 磁盘 CSV 文件数据源
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for FileSource {
    fn token(&self) -> io::Result<FreshnessToken> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(FreshnessToken::Modified(meta.modified()?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(FreshnessToken::Absent),
            Err(e) => Err(e),
        }
    }

    fn open(&self) -> io::Result<Option<Box<dyn Read + Send>>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(Box::new(io::BufReader::new(file)))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// 内存数据源
///
/// 每次 `replace` 都会推进新鲜度标记，无需接触文件系统即可模拟文件变更。
#[derive(Debug, Default)]
pub struct MemorySource {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    content: Option<String>,
    version: u64,
}

impl MemorySource {
    /// 创建包含给定内容的数据源
    pub fn new(content: impl Into<String>) -> Self {
        let source = Self::absent();
        source.replace(content);
        source
    }

    /// 创建不存在的数据源
    pub fn absent() -> Self {
        Self::default()
    }

    /// 替换内容并推进新鲜度标记
    pub fn replace(&self, content: impl Into<String>) {
        let mut state = self.state.write();
        state.content = Some(content.into());
        state.version += 1;
    }

    /// 删除内容
    pub fn remove(&self) {
        let mut state = self.state.write();
        state.content = None;
        state.version += 1;
    }
}

impl DatasetSource for MemorySource {
    fn token(&self) -> io::Result<FreshnessToken> {
        let state = self.state.read();
        Ok(match state.content {
            Some(_) => FreshnessToken::Modified(version_instant(state.version)),
            None => FreshnessToken::Absent,
        })
    }

    fn open(&self) -> io::Result<Option<Box<dyn Read + Send>>> {
        let state = self.state.read();
        Ok(state
            .content
            .clone()
            .map(|content| Box::new(Cursor::new(content.into_bytes())) as Box<dyn Read + Send>))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

impl<S: DatasetSource + ?Sized> DatasetSource for std::sync::Arc<S> {
    fn token(&self) -> io::Result<FreshnessToken> {
        (**self).token()
    }

    fn open(&self) -> io::Result<Option<Box<dyn Read + Send>>> {
        (**self).open()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

fn version_instant(version: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(version)
}
