//! 数据行模型
//!
//! 每一行是字段名到原始字符串值的映射，加载后不可变。

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// 数据集中使用的列名
pub mod columns {
    pub const TIMESTAMP: &str = "timestamp";
    pub const LOCATION_NAME: &str = "location_name";
    pub const ADULT_LTR: &str = "adult_ltr_pedestrians_count";
    pub const ADULT_RTL: &str = "adult_rtl_pedestrians_count";
    pub const TOTAL: &str = "pedestrians_count";
    pub const LTR: &str = "ltr_pedestrians_count";
    pub const RTL: &str = "rtl_pedestrians_count";
    pub const ADULT: &str = "adult_pedestrians_count";
    pub const CHILD: &str = "child_pedestrians_count";
    pub const ZONE_1: &str = "zone_1_pedestrians_count";
    pub const ZONE_2: &str = "zone_2_pedestrians_count";
    pub const ZONE_3: &str = "zone_3_pedestrians_count";
}

/// 数据行
///
/// 表头在所有行之间共享，值的顺序与表头一致。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    header: Arc<[String]>,
    values: Box<[String]>,
}

impl Record {
    /// 创建数据行，值的个数按表头宽度补齐或截断
    pub fn new(header: Arc<[String]>, mut values: Vec<String>) -> Self {
        values.resize(header.len(), String::new());
        Self {
            header,
            values: values.into_boxed_slice(),
        }
    }

    /// 读取字段原始值，字段不存在时返回 None
    pub fn get(&self, field: &str) -> Option<&str> {
        self.header
            .iter()
            .position(|name| name == field)
            .map(|idx| self.values[idx].as_str())
    }

    /// 按表头顺序遍历字段
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.header
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
