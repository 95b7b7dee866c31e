//! 数据集 DTO
//!
//! 定义查询相关的请求参数和响应数据结构。参数在这里完成边界校验，
//! 核心层只接收已校验的值。

use serde::{Deserialize, Serialize};

use crate::config::QueryConfig;
use crate::error::AppError;
use crate::models::{DailyAggregate, Record, TimeSeriesPoint};

/// 窗口汇总请求参数
#[derive(Debug, Deserialize, Default)]
pub struct WindowParams {
    /// 窗口天数
    pub days: Option<i64>,
}

impl WindowParams {
    /// 解析并校验天数
    pub fn resolve(&self, config: &QueryConfig) -> Result<u32, AppError> {
        let days = self.days.unwrap_or(i64::from(config.default_window_days));
        if days < 1 || days > i64::from(config.max_window_days) {
            return Err(AppError::Validation(format!(
                "days 必须在 1..={} 之间，实际为 {}",
                config.max_window_days, days
            )));
        }
        Ok(days as u32)
    }
}

/// 原始数据分页请求参数
#[derive(Debug, Deserialize, Default)]
pub struct PageParams {
    /// 起始偏移
    pub offset: Option<i64>,
    /// 每页行数
    pub limit: Option<i64>,
}

impl PageParams {
    /// 解析并校验分页参数，返回 (offset, limit)
    pub fn resolve(&self, config: &QueryConfig) -> Result<(usize, usize), AppError> {
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::Validation(format!(
                "offset 不能为负数，实际为 {}",
                offset
            )));
        }

        let limit = self.limit.unwrap_or(config.default_page_size as i64);
        if limit < 1 || limit > config.max_page_size as i64 {
            return Err(AppError::Validation(format!(
                "limit 必须在 1..={} 之间，实际为 {}",
                config.max_page_size, limit
            )));
        }

        Ok((offset as usize, limit as usize))
    }
}

/// 校验地点参数，返回去除空白后的地点
pub fn resolve_location(raw: &str) -> Result<&str, AppError> {
    let location = raw.trim();
    if location.is_empty() {
        return Err(AppError::Validation("location 不能为空".to_string()));
    }
    Ok(location)
}

/// 地点列表响应
#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    /// 地点列表
    pub locations: Vec<String>,
    /// 数据文件是否缺失
    pub source_missing: bool,
}

/// 窗口汇总响应
#[derive(Debug, Serialize)]
pub struct WindowAggregateResponse {
    /// 窗口天数
    pub days: u32,
    /// 逐日汇总
    pub rows: Vec<DailyAggregate>,
    /// 数据文件是否缺失
    pub source_missing: bool,
}

/// 时间序列响应
#[derive(Debug, Serialize)]
pub struct TimeSeriesResponse {
    /// 查询的地点（已去除首尾空白）
    pub location: String,
    /// 按时间戳升序的数据点
    pub points: Vec<TimeSeriesPoint>,
    /// 数据文件是否缺失
    pub source_missing: bool,
}

/// 原始数据分页响应
#[derive(Debug, Serialize)]
pub struct RowsResponse {
    /// 总行数
    pub total: usize,
    /// 起始偏移
    pub offset: usize,
    /// 每页行数
    pub limit: usize,
    /// 数据行
    pub rows: Vec<Record>,
    /// 数据文件是否缺失
    pub source_missing: bool,
}

/// 列名响应
#[derive(Debug, Serialize)]
pub struct ColumnsResponse {
    /// 列名
    pub columns: Vec<String>,
    /// 数据文件是否缺失
    pub source_missing: bool,
}

/// 刷新响应
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// 被清空的缓存
    pub refreshed: String,
    /// 状态
    pub status: String,
}
