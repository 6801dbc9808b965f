//! 路由守卫
//!
//! 每次路由变化都会重新运行：检查 token，向后端确认账号状态，
//! 拉取资料并据此决定放行或重定向。决策部分是纯函数 [`decide`]，
//! 网络部分由 [`RouteGuard::check`] 完成。

use log::{debug, info, warn};
use skillswap_shared::UserStatus;

use crate::api::SkillSwapApi;
use crate::request::HttpClient;
use crate::route::AppRoute;
use crate::session::SessionAccess;
use crate::storage::KeyValueStore;

/// 会话过期提示文案
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired";

// =========================================================
// 决策表 (Decision Table)
// =========================================================

/// 后端对当前 token 的校验结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// 状态接口调用失败，token 不再可信
    Rejected,
    /// 新账号，尚未完善资料
    New { profile_loaded: bool },
    /// 老账号
    Existing { profile_loaded: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    Allow,
    Redirect(AppRoute),
}

/// 纯决策函数
///
/// `validation` 为 `None` 表示没有 token。重定向目标本身总是被放行，
/// 因此对目标路由再次决策不会继续跳转。
pub fn decide(route: &AppRoute, validation: Option<&Validation>) -> GuardAction {
    let target = match validation {
        None if route.is_public() => None,
        None | Some(Validation::Rejected) => Some(AppRoute::auth_failure_redirect()),
        Some(Validation::New { .. }) => {
            (route != &AppRoute::ProfileCompletion).then_some(AppRoute::ProfileCompletion)
        }
        Some(Validation::Existing {
            profile_loaded: true,
        }) => (route == &AppRoute::ProfileCompletion).then_some(AppRoute::Home),
        // 状态有效但资料取不到：仍允许去完善资料，而不是把身份当作不可恢复
        Some(Validation::Existing {
            profile_loaded: false,
        }) => (route != &AppRoute::ProfileCompletion).then_some(AppRoute::ProfileCompletion),
    };

    match target {
        Some(target) if &target != route => GuardAction::Redirect(target),
        _ => GuardAction::Allow,
    }
}

// =========================================================
// 守卫执行 (Guard Execution)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardNotice {
    SessionExpired,
}

impl GuardNotice {
    pub fn message(&self) -> &'static str {
        match self {
            GuardNotice::SessionExpired => SESSION_EXPIRED_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub action: GuardAction,
    pub notice: Option<GuardNotice>,
    /// 本次检查是否实际清除了会话
    pub session_cleared: bool,
}

impl GuardOutcome {
    fn settled(action: GuardAction) -> Self {
        Self {
            action,
            notice: None,
            session_cleared: false,
        }
    }
}

pub struct RouteGuard<'a, C: HttpClient, S: KeyValueStore> {
    api: &'a SkillSwapApi<C, S>,
}

impl<'a, C: HttpClient, S: KeyValueStore> RouteGuard<'a, C, S> {
    pub fn new(api: &'a SkillSwapApi<C, S>) -> Self {
        Self { api }
    }

    /// 校验当前 token
    ///
    /// 状态接口成功后再拉取资料，资料成功时把身份写回会话。
    pub async fn validate<A: SessionAccess + ?Sized>(&self, session: &A) -> Validation {
        let status = match self.api.user_status().await {
            Ok(status) => status,
            Err(err) => {
                warn!("status check failed: {}", err);
                return Validation::Rejected;
            }
        };

        let profile_loaded = match self.api.my_profile().await {
            Ok(profile) => session.set_identity(profile.identity()),
            Err(err) => {
                warn!("profile fetch failed: {}", err);
                false
            }
        };

        match status {
            UserStatus::New => Validation::New { profile_loaded },
            UserStatus::Existing => Validation::Existing { profile_loaded },
        }
    }

    /// 对一次导航执行守卫检查
    ///
    /// 校验失败时会话被清除；同一个 token 并发检查多次也只清除一次。
    pub async fn check<A: SessionAccess + ?Sized>(
        &self,
        session: &A,
        route: &AppRoute,
    ) -> GuardOutcome {
        let Some(token) = session.token() else {
            let action = decide(route, None);
            debug!("no session, {} -> {:?}", route, action);
            return GuardOutcome::settled(action);
        };

        let validation = self.validate(session).await;
        let action = decide(route, Some(&validation));
        debug!("{:?}, {} -> {:?}", validation, route, action);

        if validation != Validation::Rejected {
            return GuardOutcome::settled(action);
        }

        let session_cleared = session.invalidate(&token);
        if session_cleared {
            info!("session expired, redirecting to {}", AppRoute::auth_failure_redirect());
        }
        GuardOutcome {
            action,
            notice: Some(GuardNotice::SessionExpired),
            session_cleared,
        }
    }
}

#[cfg(test)]
mod tests;
