//! 字段解析
//!
//! 计数字段与时间戳字段的宽松解析：无法解析时回落到默认值，从不报错。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::models::{Record, columns};

/// 带时区偏移的时间格式（RFC 3339 之外的变体）
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
];

/// 无时区的时间格式，按 UTC 处理
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// 解析计数字段
///
/// 先按整数解析，再按有限浮点数解析并向零截断；缺失、空值或非数字均为 0。
pub fn parse_count(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };

    if let Ok(value) = raw.parse::<i64>() {
        return value;
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as i64,
        _ => 0,
    }
}

/// 读取数据行中的计数字段
pub fn count(record: &Record, field: &str) -> i64 {
    parse_count(record.get(field))
}

/// 将时间戳解析为 UTC 日历日期
pub fn parse_utc_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc).date_naive());
        }
    }

    let naive = raw
        .strip_suffix('Z')
        .or_else(|| raw.strip_suffix('z'))
        .unwrap_or(raw);
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(naive, "%Y-%m-%d").ok()
}

/// 数据行的日历日期
pub fn record_date(record: &Record) -> Option<NaiveDate> {
    record.get(columns::TIMESTAMP).and_then(parse_utc_date)
}

/// 数据行去除首尾空白后的地点，空值返回 None
pub fn record_location(record: &Record) -> Option<&str> {
    record
        .get(columns::LOCATION_NAME)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
