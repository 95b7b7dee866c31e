//! 窗口汇总
//!
//! 取数据中最近 N 个日历日（UTC），按日期汇总成人左向右与右向左计数，
//! 并计算差值。无法解析时间戳的行不参与汇总；窗口内没有数据的日期不补零。

use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::{CacheStats, InvalidationHub, QueryCache};
use crate::error::Result;
use crate::models::{DailyAggregate, FreshnessToken, Record, Versioned, columns};
use crate::services::parse::{count, record_date};
use crate::storage::RowStore;

/// 计算最近 `days` 个日历日的汇总
///
/// `days` 由调用方保证至少为 1；传入 0 时按 1 处理。
pub fn aggregate_window(rows: &[Record], days: u32) -> Vec<DailyAggregate> {
    let dated: Vec<(NaiveDate, &Record)> = rows
        .iter()
        .filter_map(|record| record_date(record).map(|date| (date, record)))
        .collect();

    let Some(last_date) = dated.iter().map(|(date, _)| *date).max() else {
        return Vec::new();
    };
    let span = u64::from(days.max(1) - 1);
    let start_date = last_date
        .checked_sub_days(Days::new(span))
        .unwrap_or(NaiveDate::MIN);

    let mut sums: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for (date, record) in dated {
        if date < start_date {
            continue;
        }
        let entry = sums.entry(date).or_default();
        // 超大计数按 i64 边界饱和
        entry.0 = entry.0.saturating_add(count(record, columns::ADULT_LTR));
        entry.1 = entry.1.saturating_add(count(record, columns::ADULT_RTL));
    }

    sums.into_iter()
        .map(|(date, (ltr, rtl))| DailyAggregate::new(date, ltr, rtl))
        .collect()
}

/// 窗口汇总器（按新鲜度标记与天数缓存）
pub struct WindowAggregator {
    store: Arc<RowStore>,
    cache: Arc<QueryCache<(FreshnessToken, u32), Arc<Vec<DailyAggregate>>>>,
}

impl WindowAggregator {
    pub const CACHE_NAME: &'static str = "window_aggregate";

    pub fn new(store: Arc<RowStore>, hub: &InvalidationHub, capacity: usize) -> Self {
        let cache = Arc::new(QueryCache::lru(Self::CACHE_NAME, capacity));
        let purge = Arc::clone(&cache);
        hub.register(Self::CACHE_NAME, move || purge.clear());
        Self { store, cache }
    }

    /// 最近 `days` 个日历日的逐日汇总，按日期升序
    pub fn window_aggregate(&self, days: u32) -> Result<Versioned<Arc<Vec<DailyAggregate>>>> {
        let snapshot = self.store.snapshot()?;
        let value = self.cache.get_or_compute((snapshot.token, days), || {
            Ok(Arc::new(aggregate_window(&snapshot.rows, days)))
        })?;
        Ok(Versioned::new(snapshot.token, value))
    }

    /// 仅清空本缓存
    pub fn refresh(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Snapshot;

    const HEADER: &str = "timestamp,location_name,adult_ltr_pedestrians_count,adult_rtl_pedestrians_count";

    fn rows(body: &[String]) -> Vec<Record> {
        let csv = format!("{HEADER}\n{}\n", body.join("\n"));
        Snapshot::parse(FreshnessToken::Absent, csv.as_bytes())
            .unwrap()
            .rows
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 2024-03-01 至 2024-03-10，每天一行，ltr=1 rtl=2
    fn ten_days() -> Vec<Record> {
        let body: Vec<String> = (1..=10)
            .map(|d| format!("2024-03-{d:02}T12:00:00Z,Nord,1,2"))
            .collect();
        rows(&body)
    }

    #[test]
    fn test_seven_day_window_is_inclusive() {
        let result = aggregate_window(&ten_days(), 7);

        assert_eq!(result.len(), 7);
        assert_eq!(result.first().unwrap().date, date(2024, 3, 4));
        assert_eq!(result.last().unwrap().date, date(2024, 3, 10));
        for aggregate in &result {
            assert_eq!((aggregate.adult_ltr, aggregate.adult_rtl, aggregate.delta), (1, 2, 1));
        }
    }

    #[test]
    fn test_three_day_window() {
        let result = aggregate_window(&ten_days(), 3);

        let dates: Vec<_> = result.iter().map(|a| a.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 8), date(2024, 3, 9), date(2024, 3, 10)]);
    }

    #[test]
    fn test_empty_dates_are_omitted() {
        let body = vec![
            "2024-03-01T08:00:00Z,Nord,1,1".to_string(),
            "2024-03-03T08:00:00Z,Nord,2,5".to_string(),
        ];
        let result = aggregate_window(&rows(&body), 7);

        let dates: Vec<_> = result.iter().map(|a| a.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 1), date(2024, 3, 3)]);
        assert_eq!(result[1].delta, 3);
    }

    #[test]
    fn test_sums_across_locations_per_date() {
        let body = vec![
            "2024-03-05T08:00:00Z,Nord,3,4".to_string(),
            "2024-03-05T17:00:00Z,Sued,10,1".to_string(),
        ];
        let result = aggregate_window(&rows(&body), 1);

        assert_eq!(result, vec![DailyAggregate::new(date(2024, 3, 5), 13, 5)]);
        assert_eq!(result[0].delta, -8);
    }

    #[test]
    fn test_malformed_counts_contribute_zero() {
        let body = vec![
            "2024-03-05T08:00:00Z,Nord,abc,4".to_string(),
            "2024-03-05T09:00:00Z,Nord,2,".to_string(),
        ];
        let result = aggregate_window(&rows(&body), 7);

        assert_eq!(result, vec![DailyAggregate::new(date(2024, 3, 5), 2, 4)]);
    }

    #[test]
    fn test_huge_counts_saturate_instead_of_overflowing() {
        let body = vec![
            "2024-03-05T08:00:00Z,Nord,1e300,-1e300".to_string(),
            "2024-03-05T09:00:00Z,Sued,1e300,-1e300".to_string(),
        ];
        let result = aggregate_window(&rows(&body), 7);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].adult_ltr, i64::MAX);
        assert_eq!(result[0].adult_rtl, i64::MIN);
        assert_eq!(result[0].delta, i64::MIN);
    }

    #[test]
    fn test_unparsable_timestamps_are_excluded() {
        let body = vec![
            "garbage,Nord,100,100".to_string(),
            ",Nord,100,100".to_string(),
            "2024-03-05T08:00:00Z,Nord,1,1".to_string(),
        ];
        let result = aggregate_window(&rows(&body), 30);

        assert_eq!(result, vec![DailyAggregate::new(date(2024, 3, 5), 1, 1)]);
    }

    #[test]
    fn test_no_parsable_dates_yields_empty() {
        let body = vec!["garbage,Nord,1,1".to_string()];
        assert!(aggregate_window(&rows(&body), 7).is_empty());
        assert!(aggregate_window(&[], 7).is_empty());
    }

    #[test]
    fn test_window_uses_utc_calendar_date() {
        let body = vec![
            "2024-03-05T23:30:00-02:00,Nord,1,0".to_string(),
            "2024-03-06T00:30:00+00:00,Nord,1,0".to_string(),
        ];
        let result = aggregate_window(&rows(&body), 1);

        assert_eq!(result, vec![DailyAggregate::new(date(2024, 3, 6), 2, 0)]);
    }
}
