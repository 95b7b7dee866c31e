use crate::config::config::AppConfig;
use crate::error::AppError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// 环境变量前缀，嵌套字段用 `__` 分隔，例如 `FOOTFALL_SERVER__PORT`
pub const ENV_PREFIX: &str = "FOOTFALL_";

/// 选择基础配置的环境变量
pub const ENVIRONMENT_VAR: &str = "FOOTFALL_ENVIRONMENT";

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 优先级（后者覆盖前者）：
    /// 1. 内置默认值（`FOOTFALL_ENVIRONMENT` 选择开发或生产环境）
    /// 2. ./footfall.toml
    /// 3. 环境变量
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_from(default_config_path())
    }

    /// 从指定路径加载配置
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        let environment = std::env::var(ENVIRONMENT_VAR).unwrap_or_default();
        Figment::from(Serialized::defaults(AppConfig::for_environment(&environment)))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }

    /// 加载并验证配置
    pub fn load_validated() -> Result<AppConfig, AppError> {
        let config = Self::load()?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.dataset.path.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingDatasetPath);
        }

        let capacities = [
            ("cache.location_capacity", config.cache.location_capacity),
            ("cache.window_capacity", config.cache.window_capacity),
            ("cache.timeseries_capacity", config.cache.timeseries_capacity),
        ];
        for (name, capacity) in capacities {
            if capacity == 0 {
                return Err(ConfigValidationError::ZeroCapacity(name.to_string()));
            }
        }

        let query = &config.query;
        if query.max_window_days == 0
            || query.default_window_days == 0
            || query.default_window_days > query.max_window_days
        {
            return Err(ConfigValidationError::InvalidQueryBounds(format!(
                "default_window_days={} max_window_days={}",
                query.default_window_days, query.max_window_days
            )));
        }
        if query.max_page_size == 0
            || query.default_page_size == 0
            || query.default_page_size > query.max_page_size
        {
            return Err(ConfigValidationError::InvalidQueryBounds(format!(
                "default_page_size={} max_page_size={}",
                query.default_page_size, query.max_page_size
            )));
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("数据集路径未配置")]
    MissingDatasetPath,

    #[error("缓存容量必须大于 0: {0}")]
    ZeroCapacity(String),

    #[error("查询参数边界无效: {0}")]
    InvalidQueryBounds(String),
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("footfall.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load()?;
            assert_eq!(config.server.port, 8000);
            assert_eq!(config.cache.timeseries_capacity, 512);
            assert_eq!(config.query.default_window_days, 7);
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "footfall.toml",
                r#"
                [dataset]
                path = "/srv/data/counts.csv"

                [cache]
                window_capacity = 8
                "#,
            )?;
            jail.set_env("FOOTFALL_SERVER__PORT", "9100");
            jail.set_env("FOOTFALL_QUERY__MAX_WINDOW_DAYS", "30");

            let config = ConfigLoader::load()?;
            assert_eq!(config.dataset.path, PathBuf::from("/srv/data/counts.csv"));
            assert_eq!(config.cache.window_capacity, 8);
            assert_eq!(config.cache.location_capacity, 4);
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.query.max_window_days, 30);
            Ok(())
        });
    }

    #[test]
    fn test_environment_selects_production_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("FOOTFALL_ENVIRONMENT", "production");

            let config = ConfigLoader::load()?;
            assert_eq!(config.environment, "production");
            assert_eq!(config.logging.level, "info");
            assert!(config.logging.structured);
            Ok(())
        });
    }

    #[test]
    fn test_load_validated_reports_config_error() {
        Jail::expect_with(|jail| {
            jail.set_env("FOOTFALL_CACHE__LOCATION_CAPACITY", "0");

            let err = ConfigLoader::load_validated().unwrap_err();
            assert!(matches!(err, AppError::Config(ref message) if message.contains("cache.location_capacity")));
            Ok(())
        });
    }

    #[test]
    fn test_load_validated_reports_extract_error() {
        Jail::expect_with(|jail| {
            jail.set_env("FOOTFALL_SERVER__PORT", "not-a-port");

            assert!(matches!(
                ConfigLoader::load_validated(),
                Err(AppError::Config(_))
            ));
            Ok(())
        });
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = AppConfig::development();
        config.cache.window_capacity = 0;

        let err = ConfigLoader::validate(&config).unwrap_err();
        assert!(matches!(err, ConfigValidationError::ZeroCapacity(ref name) if name == "cache.window_capacity"));
    }

    #[test]
    fn test_validate_rejects_default_above_max() {
        let mut config = AppConfig::development();
        config.query.default_window_days = 90;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidQueryBounds(_))
        ));
    }

    #[test]
    fn test_validate_accepts_development_and_production() {
        assert!(ConfigLoader::validate(&AppConfig::development()).is_ok());
        assert!(ConfigLoader::validate(&AppConfig::production()).is_ok());
    }
}
