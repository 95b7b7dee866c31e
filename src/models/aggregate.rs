//! 派生视图模型

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::record::Record;

/// 单日汇总（全部地点）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAggregate {
    /// 日历日期（UTC）
    pub date: NaiveDate,
    /// 成人左向右合计
    pub adult_ltr: i64,
    /// 成人右向左合计
    pub adult_rtl: i64,
    /// adult_rtl - adult_ltr（饱和运算）
    pub delta: i64,
}

impl DailyAggregate {
    pub fn new(date: NaiveDate, adult_ltr: i64, adult_rtl: i64) -> Self {
        Self {
            date,
            adult_ltr,
            adult_rtl,
            delta: adult_rtl.saturating_sub(adult_ltr),
        }
    }
}

/// 单个地点的时间序列点
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// 原始时间戳字符串，缺失时为空串
    pub timestamp: String,
    pub total: i64,
    pub ltr: i64,
    pub rtl: i64,
    pub adult: i64,
    pub child: i64,
    pub zone1: i64,
    pub zone2: i64,
    pub zone3: i64,
}

/// 原始数据分页
#[derive(Debug, Clone)]
pub struct RawPage {
    /// 数据集总行数
    pub total: usize,
    /// 当前页数据行
    pub rows: Vec<Record>,
}

/// 数据集状态
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStatus {
    /// 数据源是否存在
    pub source_present: bool,
    /// 新鲜度标记
    pub token: String,
    /// 行数
    pub row_count: usize,
    /// 列数
    pub column_count: usize,
    /// 快照加载时间
    pub loaded_at: DateTime<Utc>,
}
