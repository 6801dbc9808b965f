//! 时间类型模块
//!
//! 后端的消息时间戳是不带偏移的 ISO-8601 本地时间，
//! 秒和小数秒都可能被省略，且没有时区后缀（按 UTC 解释）。

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =========================================================
// Timestamp - 可传输的时间戳类型
// =========================================================

/// 毫秒时间戳（UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

/// 后端可能产生的格式，按精度从高到低
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

impl Timestamp {
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// 解析后端时间字符串
    ///
    /// 先按 RFC 3339（带时区）解析，失败再按无时区的本地格式解析并视为 UTC。
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(Self(dt.timestamp_millis()));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| Self(naive.and_utc().timestamp_millis()))
    }

    fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }

    /// 聊天气泡下方展示的短格式
    pub fn display(&self) -> String {
        self.to_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl std::ops::Sub<Timestamp> for Timestamp {
    type Output = Duration;

    /// 计算两个时间戳之间的差值（负差值截断为 0）
    fn sub(self, rhs: Timestamp) -> Self::Output {
        let diff_ms = (self.0 - rhs.0).max(0);
        Duration::from_millis(diff_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_date_time_variants() {
        let full = Timestamp::parse("2024-05-01T10:20:30.123456").unwrap();
        let secs = Timestamp::parse("2024-05-01T10:20:30").unwrap();
        let mins = Timestamp::parse("2024-05-01T10:20").unwrap();

        assert_eq!(full - secs, Duration::from_millis(123));
        assert_eq!(secs - mins, Duration::from_secs(30));
        assert_eq!(mins.display(), "2024-05-01 10:20");
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let ts = Timestamp::parse("2024-05-01T12:20:00+02:00").unwrap();
        assert_eq!(ts, Timestamp::parse("2024-05-01T10:20").unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Timestamp::parse("yesterday").is_none());
    }
}
