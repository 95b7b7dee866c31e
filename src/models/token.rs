//! 数据新鲜度标记
//!
//! 由数据源的最后修改时间派生。两次加载的标记相等即视为内容相同。

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// 数据源新鲜度标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FreshnessToken {
    /// 数据源不存在
    Absent,
    /// 数据源存在，携带最后修改时间
    Modified(SystemTime),
}

impl FreshnessToken {
    /// 数据源是否缺失
    pub fn is_absent(&self) -> bool {
        matches!(self, FreshnessToken::Absent)
    }
}

impl fmt::Display for FreshnessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreshnessToken::Absent => write!(f, "absent"),
            FreshnessToken::Modified(at) => match at.duration_since(UNIX_EPOCH) {
                Ok(d) => write!(f, "mtime:{}.{:09}", d.as_secs(), d.subsec_nanos()),
                Err(_) => write!(f, "mtime:pre-epoch"),
            },
        }
    }
}

/// 附带新鲜度标记的查询结果
///
/// 标记来自计算结果所用的快照，调用方据此区分"文件缺失"与"文件为空"。
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub token: FreshnessToken,
    pub value: T,
}

impl<T> Versioned<T> {
    pub fn new(token: FreshnessToken, value: T) -> Self {
        Self { token, value }
    }

    /// 数据源是否缺失
    pub fn source_missing(&self) -> bool {
        self.token.is_absent()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Versioned<U> {
        Versioned {
            token: self.token,
            value: f(self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_token_equality_follows_mtime() {
        let a = FreshnessToken::Modified(UNIX_EPOCH + Duration::from_secs(10));
        let b = FreshnessToken::Modified(UNIX_EPOCH + Duration::from_secs(10));
        let c = FreshnessToken::Modified(UNIX_EPOCH + Duration::from_secs(11));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, FreshnessToken::Absent);
    }

    #[test]
    fn test_token_display() {
        let token = FreshnessToken::Modified(UNIX_EPOCH + Duration::from_millis(1_500));
        assert_eq!(token.to_string(), "mtime:1.500000000");
        assert_eq!(FreshnessToken::Absent.to_string(), "absent");
    }

    #[test]
    fn test_versioned_source_missing() {
        let answer = Versioned::new(FreshnessToken::Absent, Vec::<String>::new());
        assert!(answer.source_missing());

        let mapped = answer.map(|v| v.len());
        assert_eq!(mapped.value, 0);
        assert!(mapped.source_missing());
    }
}
