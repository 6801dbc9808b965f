//! 认证模块
//!
//! 会话保存在 `localStorage`，同时以信号形式暴露给界面。
//! 路由守卫和各认证流程通过 [`SessionAccess`] 读写它。

use leptos::prelude::*;
use skillswap::{SessionAccess, SessionStore};
use skillswap_shared::Identity;

use crate::web::BrowserStorage;

/// 认证上下文
///
/// 所有字段都是 `Copy` 的响应式句柄，可以直接移入闭包和异步任务。
#[derive(Clone, Copy)]
pub struct AuthContext {
    store: StoredValue<SessionStore<BrowserStorage>>,
    identity: RwSignal<Option<Identity>>,
    signed_in: RwSignal<bool>,
}

impl AuthContext {
    /// 从 `localStorage` 恢复；身份要等守卫校验后才会填充
    pub fn new() -> Self {
        let store = SessionStore::new(BrowserStorage);
        let signed_in = store.token().is_some();
        Self {
            store: StoredValue::new(store),
            identity: RwSignal::new(None),
            signed_in: RwSignal::new(signed_in),
        }
    }

    pub fn identity(&self) -> Signal<Option<Identity>> {
        self.identity.into()
    }

    pub fn is_signed_in(&self) -> Signal<bool> {
        self.signed_in.into()
    }

    fn sync(&self) {
        let (token, identity) = self
            .store
            .with_value(|s| (s.token(), s.current().cloned()));
        self.signed_in.set(token.is_some());
        self.identity.set(identity);
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionAccess for AuthContext {
    fn token(&self) -> Option<String> {
        self.store.with_value(|s| s.token())
    }

    fn persisted_email(&self) -> Option<String> {
        self.store.with_value(|s| s.persisted_email())
    }

    fn establish(&self, token: &str, identity: Identity) {
        self.store.update_value(|s| s.set(token, identity));
        self.sync();
    }

    fn set_identity(&self, identity: Identity) -> bool {
        let mut applied = false;
        self.store
            .update_value(|s| applied = s.set_identity(identity));
        self.sync();
        applied
    }

    fn remember_email(&self, email: &str) {
        self.store.with_value(|s| s.remember_email(email));
    }

    fn invalidate(&self, token: &str) -> bool {
        let mut cleared = false;
        self.store.update_value(|s| cleared = s.invalidate(token));
        self.sync();
        cleared
    }

    fn clear(&self) {
        self.store.update_value(|s| s.clear());
        self.sync();
    }
}

pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}
