//! 客户端运行时配置
//!
//! 通过变量查找函数构建：浏览器端传入编译期变量，测试传入 map。

use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_CHAT_POLL_SECS: u64 = 5;
const DEFAULT_HOME_POLL_SECS: u64 = 10;
const DEFAULT_COOLDOWN_TICK_SECS: u64 = 1;

pub const VAR_API_URL: &str = "SKILLSWAP_API_URL";
pub const VAR_CHAT_POLL_SECS: &str = "SKILLSWAP_CHAT_POLL_SECS";
pub const VAR_HOME_POLL_SECS: &str = "SKILLSWAP_HOME_POLL_SECS";
pub const VAR_GOOGLE_CLIENT_ID: &str = "SKILLSWAP_GOOGLE_CLIENT_ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub chat_poll_period: Duration,
    pub home_poll_period: Duration,
    pub cooldown_tick: Duration,
    pub google_client_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            chat_poll_period: Duration::from_secs(DEFAULT_CHAT_POLL_SECS),
            home_poll_period: Duration::from_secs(DEFAULT_HOME_POLL_SECS),
            cooldown_tick: Duration::from_secs(DEFAULT_COOLDOWN_TICK_SECS),
            google_client_id: None,
        }
    }
}

impl ClientConfig {
    /// 读不到或无效的变量使用默认值
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let period = |name: &str, fallback: Duration| {
            non_empty(name)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        Self {
            api_url: non_empty(VAR_API_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            chat_poll_period: period(VAR_CHAT_POLL_SECS, defaults.chat_poll_period),
            home_poll_period: period(VAR_HOME_POLL_SECS, defaults.home_poll_period),
            cooldown_tick: defaults.cooldown_tick,
            google_client_id: non_empty(VAR_GOOGLE_CLIENT_ID),
        }
    }
}
