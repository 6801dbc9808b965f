//! 导航序列
//!
//! 每次导航先领取一个递增序号，守卫检查结束后只有最新序号的结果会被采用。
//! 首次检查完成前 `is_ready()` 为 false，界面不渲染任何页面。

use log::debug;

use crate::guard::GuardAction;
use crate::route::AppRoute;

/// 一次导航的凭据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    current: AppRoute,
    latest: u64,
    settled: u64,
    /// 最近一次导航发起时的登录状态
    latest_signed_in: Option<bool>,
}

impl Navigator {
    pub fn new(initial: AppRoute) -> Self {
        Self {
            current: initial,
            latest: 0,
            settled: 0,
            latest_signed_in: None,
        }
    }

    pub fn current(&self) -> &AppRoute {
        &self.current
    }

    pub fn is_ready(&self) -> bool {
        self.settled > 0
    }

    /// 最新的导航还在等待守卫
    pub fn is_pending(&self) -> bool {
        self.latest != self.settled
    }

    /// 发起导航，之前未完成的导航全部作废
    pub fn begin(&mut self, signed_in: bool) -> Ticket {
        self.latest += 1;
        self.latest_signed_in = Some(signed_in);
        Ticket { seq: self.latest }
    }

    /// 采用守卫结果，返回最终停留的路由；过期的导航返回 `None`
    pub fn settle(&mut self, ticket: Ticket, target: AppRoute, action: GuardAction) -> Option<AppRoute> {
        if ticket.seq != self.latest {
            debug!(target: "Router", "navigation #{} to {} superseded", ticket.seq, target);
            return None;
        }
        self.current = match action {
            GuardAction::Allow => target,
            GuardAction::Redirect(redirect) => redirect,
        };
        self.settled = ticket.seq;
        Some(self.current.clone())
    }

    /// 登录状态变化后是否需要重新检查当前路由
    ///
    /// 如果状态变化之后已经发起过导航（例如登录流程自己跳转），
    /// 那次导航的守卫会看到新状态，不再重复检查。
    pub fn needs_recheck(&self, signed_in: bool) -> bool {
        self.latest_signed_in != Some(signed_in)
    }
}
