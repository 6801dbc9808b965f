//! LocalStorage 封装模块
//!
//! 使用 `web_sys::Storage` 实现核心库的 [`KeyValueStore`]。

use skillswap::KeyValueStore;

/// 浏览器 `localStorage`
///
/// 无状态的零尺寸类型，可在信号与上下文之间随意复制。
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}
