//! API 客户端与运行时配置的上下文注入

use leptos::prelude::*;
use skillswap::config::{VAR_API_URL, VAR_CHAT_POLL_SECS, VAR_GOOGLE_CLIENT_ID, VAR_HOME_POLL_SECS};
use skillswap::{ClientConfig, SkillSwapApi};

use crate::web::{BrowserHttpClient, BrowserStorage};

/// 浏览器端的 API 客户端
pub type Api = SkillSwapApi<BrowserHttpClient, BrowserStorage>;

/// 构建期注入的变量（`SKILLSWAP_API_URL=... trunk build`）
fn build_var(name: &str) -> Option<String> {
    let value = match name {
        VAR_API_URL => option_env!("SKILLSWAP_API_URL"),
        VAR_CHAT_POLL_SECS => option_env!("SKILLSWAP_CHAT_POLL_SECS"),
        VAR_HOME_POLL_SECS => option_env!("SKILLSWAP_HOME_POLL_SECS"),
        VAR_GOOGLE_CLIENT_ID => option_env!("SKILLSWAP_GOOGLE_CLIENT_ID"),
        _ => None,
    };
    value.map(str::to_string)
}

pub fn provide_services() -> (ClientConfig, Api) {
    let config = ClientConfig::from_vars(build_var);
    let api = Api::new(&config.api_url, BrowserHttpClient, BrowserStorage);
    provide_context(config.clone());
    provide_context(api.clone());
    (config, api)
}

pub fn use_api() -> Api {
    expect_context::<Api>()
}

pub fn use_config() -> ClientConfig {
    expect_context::<ClientConfig>()
}
