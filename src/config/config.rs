use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 数据集配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// CSV 数据文件路径
    pub path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/passanten.csv"),
        }
    }
}

/// 派生缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 地点列表缓存容量
    pub location_capacity: usize,
    /// 窗口汇总缓存容量
    pub window_capacity: usize,
    /// 时间序列缓存容量（地点数量可能很多）
    pub timeseries_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location_capacity: 4,
            window_capacity: 32,
            timeseries_capacity: 512,
        }
    }
}

/// 查询参数边界
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// 窗口天数上限
    pub max_window_days: u32,
    /// 默认窗口天数
    pub default_window_days: u32,
    /// 默认分页大小
    pub default_page_size: usize,
    /// 分页大小上限
    pub max_page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_window_days: 60,
            default_window_days: 7,
            default_page_size: 100,
            max_page_size: 1000,
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
    /// 允许的跨域来源，"*" 表示任意
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            cors_origins: vec!["*".into()],
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
    /// 日志文件目录，未设置时输出到标准输出
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            structured: false,
            log_dir: None,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 数据集配置
    pub dataset: DatasetConfig,
    /// 缓存配置
    pub cache: CacheConfig,
    /// 查询配置
    pub query: QueryConfig,
    /// 服务器配置
    pub server: ServerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            cache: CacheConfig::default(),
            query: QueryConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig {
                level: "debug".into(),
                ..LoggingConfig::default()
            },
            app_name: "footfall".into(),
            environment: "development".into(),
        }
    }

    /// 按环境名称选择基础配置，未知名称按开发环境处理
    pub fn for_environment(environment: &str) -> Self {
        match environment {
            "production" | "prod" => Self::production(),
            _ => Self::development(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config
    }
}
