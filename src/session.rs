//! 会话存储
//!
//! token 与邮箱持久化在键值存储中，身份信息只保存在内存里。
//! 不变量：没有 token 时身份信息不可达。

use std::cell::RefCell;

use log::{debug, info};
use skillswap_shared::Identity;

use crate::storage::{EMAIL_KEY, KeyValueStore, TOKEN_KEY};

/// 已认证会话的快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub identity: Option<Identity>,
}

#[derive(Debug, Clone)]
pub struct SessionStore<S: KeyValueStore> {
    storage: S,
    identity: Option<Identity>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            identity: None,
        }
    }

    /// 读取持久化的 token，不做任何校验
    pub fn load(&self) -> Option<Session> {
        self.token().map(|token| Session {
            token,
            identity: self.identity.clone(),
        })
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// 当前身份；token 不存在时为 `None`
    pub fn current(&self) -> Option<&Identity> {
        self.token().and(self.identity.as_ref())
    }

    pub fn persisted_email(&self) -> Option<String> {
        self.storage.get(EMAIL_KEY).filter(|e| !e.is_empty())
    }

    /// 完全替换之前的会话
    pub fn set(&mut self, token: &str, identity: Identity) {
        self.storage.set(TOKEN_KEY, token);
        self.storage.set(EMAIL_KEY, &identity.email);
        debug!("session set for {}", identity.email);
        self.identity = Some(identity);
    }

    /// 仅在 token 存在时附加身份，返回是否生效
    pub fn set_identity(&mut self, identity: Identity) -> bool {
        if self.token().is_none() {
            return false;
        }
        self.identity = Some(identity);
        true
    }

    /// 幂等
    pub fn clear(&mut self) {
        self.storage.delete(TOKEN_KEY);
        self.storage.delete(EMAIL_KEY);
        self.identity = None;
    }

    /// 仅当持久化的 token 仍是 `token` 时清除会话
    ///
    /// 返回本次调用是否执行了清除；同一个失效 token 只会被清除一次。
    pub fn invalidate(&mut self, token: &str) -> bool {
        match self.token() {
            Some(current) if current == token => {
                info!("session invalidated");
                self.clear();
                true
            }
            _ => false,
        }
    }

    /// 保存注册邮箱，供 OTP 验证页使用（此时尚无 token）
    pub fn remember_email(&self, email: &str) {
        self.storage.set(EMAIL_KEY, email);
    }
}

// =========================================================
// 会话访问接口 (Session Access)
// =========================================================

/// 跨异步流程共享会话的读写接口
///
/// 守卫与认证流程只通过它访问会话。实现方保证同一时刻只有一个写者：
/// 浏览器端是响应式信号，测试中是 `RefCell`。
pub trait SessionAccess {
    fn token(&self) -> Option<String>;
    fn persisted_email(&self) -> Option<String>;
    fn establish(&self, token: &str, identity: Identity);
    fn set_identity(&self, identity: Identity) -> bool;
    fn remember_email(&self, email: &str);
    fn invalidate(&self, token: &str) -> bool;
    fn clear(&self);
}

impl<S: KeyValueStore> SessionAccess for RefCell<SessionStore<S>> {
    fn token(&self) -> Option<String> {
        self.borrow().token()
    }

    fn persisted_email(&self) -> Option<String> {
        self.borrow().persisted_email()
    }

    fn establish(&self, token: &str, identity: Identity) {
        self.borrow_mut().set(token, identity);
    }

    fn set_identity(&self, identity: Identity) -> bool {
        self.borrow_mut().set_identity(identity)
    }

    fn remember_email(&self, email: &str) {
        self.borrow().remember_email(email);
    }

    fn invalidate(&self, token: &str) -> bool {
        self.borrow_mut().invalidate(token)
    }

    fn clear(&self) {
        self.borrow_mut().clear();
    }
}
