//! 持久化键值存储抽象
//!
//! 浏览器端由 `localStorage` 实现，测试与原生环境使用 [`MemoryStore`]。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// 会话 token 的存储键
pub const TOKEN_KEY: &str = "token";
/// 当前用户邮箱的存储键（OTP 验证页依赖它）
pub const EMAIL_KEY: &str = "email";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// 返回是否写入成功
    fn set(&self, key: &str, value: &str) -> bool;
    /// 返回是否删除成功（键不存在也视为成功）
    fn delete(&self, key: &str) -> bool;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> bool {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> bool {
        (**self).delete(key)
    }
}

/// 内存实现；克隆体共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.data.borrow_mut().remove(key);
        true
    }
}
