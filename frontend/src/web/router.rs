//! 路由服务模块 - 核心引擎
//!
//! 封装 `window.history`，每次导航（包括后退/前进和登录状态变化）都先经过
//! 异步路由守卫。多个导航并发时只有最后发起的一次生效。
//! 路由决策以 `[Router]` 为日志前缀。

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info};
use skillswap::{AppRoute, GuardAction, Navigator, RouteGuard};
use wasm_bindgen::prelude::*;

use crate::api::Api;
use crate::auth::AuthContext;

fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    Push,
    Replace,
    /// 浏览器已经改好了地址（popstate）
    Keep,
}

fn write_history(path: &str, mode: HistoryMode) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let _ = match mode {
        HistoryMode::Push => history.push_state_with_url(&JsValue::NULL, "", Some(path)),
        HistoryMode::Replace => history.replace_state_with_url(&JsValue::NULL, "", Some(path)),
        HistoryMode::Keep => Ok(()),
    };
}

/// 路由器服务
///
/// 序号与过期判断由 [`Navigator`] 负责，这里只把结果同步到信号上。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: RwSignal<AppRoute>,
    /// 首次守卫检查完成前不渲染页面
    ready: RwSignal<bool>,
    pending: RwSignal<bool>,
    notice: RwSignal<Option<&'static str>>,
    nav: StoredValue<Navigator>,
    api: StoredValue<Api>,
    auth: AuthContext,
}

impl RouterService {
    fn new(api: Api, auth: AuthContext) -> Self {
        let initial = AppRoute::from_path(&current_path());
        Self {
            current_route: RwSignal::new(initial.clone()),
            ready: RwSignal::new(false),
            pending: RwSignal::new(false),
            notice: RwSignal::new(None),
            nav: StoredValue::new(Navigator::new(initial)),
            api: StoredValue::new(api),
            auth,
        }
    }

    pub fn current_route(&self) -> Signal<AppRoute> {
        self.current_route.into()
    }

    pub fn is_pending(&self) -> Signal<bool> {
        self.pending.into()
    }

    /// 守卫产生的一次性提示（如 "Session expired"）
    pub fn notice(&self) -> RwSignal<Option<&'static str>> {
        self.notice
    }

    pub fn navigate(&self, path: &str) {
        self.go(AppRoute::from_path(path));
    }

    pub fn go(&self, route: AppRoute) {
        self.navigate_to_route(route, HistoryMode::Push);
    }

    /// 流程：领取序号 -> 守卫 -> 丢弃过期导航 -> 写 History -> 更新信号
    fn navigate_to_route(&self, target: AppRoute, mode: HistoryMode) {
        let signed_in = self.auth.is_signed_in().get_untracked();
        let ticket = self
            .nav
            .try_update_value(|nav| nav.begin(signed_in));
        let Some(ticket) = ticket else {
            return;
        };
        self.pending.set(true);

        let this = *self;
        spawn_local(async move {
            let api = this.api.get_value();
            let outcome = RouteGuard::new(&api).check(&this.auth, &target).await;

            // 会话过期的提示即使导航已过期也要显示
            if let Some(notice) = outcome.notice {
                let _ = this.notice.try_set(Some(notice.message()));
            }

            let redirected = matches!(outcome.action, GuardAction::Redirect(_));
            let settled = this
                .nav
                .try_update_value(|nav| nav.settle(ticket, target.clone(), outcome.action))
                .flatten();
            let Some(route) = settled else {
                return;
            };

            if redirected {
                info!(target: "Router", "{} redirected to {}", target, route);
                write_history(&route.to_path(), HistoryMode::Replace);
            } else {
                debug!(target: "Router", "{} allowed", route);
                write_history(&route.to_path(), mode);
            }
            this.current_route.set(route);
            this.pending.set(false);
            this.ready.set(true);
        });
    }

    fn init_popstate_listener(&self) {
        let this = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            this.navigate_to_route(AppRoute::from_path(&current_path()), HistoryMode::Keep);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 监听器与页面同寿命
        closure.forget();
    }

    /// 登录状态变化且之后没有新导航时，重新检查当前路由
    fn setup_auth_redirect(&self) {
        let this = *self;
        let signed_in = self.auth.is_signed_in();
        Effect::new(move |previous: Option<bool>| {
            let now = signed_in.get();
            let changed = previous.is_some_and(|was| was != now);
            let stale = this
                .nav
                .try_with_value(|nav| nav.needs_recheck(now))
                .unwrap_or(false);
            if changed && stale {
                let route = this.current_route.get_untracked();
                debug!(target: "Router", "auth changed, re-checking {}", route);
                this.navigate_to_route(route, HistoryMode::Replace);
            }
            now
        });
    }
}

fn provide_router(api: Api, auth: AuthContext) -> RouterService {
    let router = RouterService::new(api, auth);
    router.init_popstate_listener();
    router.setup_auth_redirect();
    // 首次加载同样经过守卫
    router.navigate_to_route(router.current_route.get_untracked(), HistoryMode::Replace);

    provide_context(router);
    router
}

pub fn use_router() -> RouterService {
    expect_context::<RouterService>()
}

// ============================================================================
// UI 组件
// ============================================================================

#[component]
pub fn Router(api: Api, auth: AuthContext, children: Children) -> impl IntoView {
    provide_router(api, auth);
    children()
}

/// 路由出口
#[component]
pub fn RouterOutlet(matcher: fn(AppRoute) -> AnyView) -> impl IntoView {
    let router = use_router();

    move || {
        if !router.ready.get() {
            return view! {
                <div class="flex items-center justify-center min-h-screen">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            }
            .into_any();
        }
        matcher(router.current_route.get())
    }
}

/// 经过守卫的站内链接
#[component]
pub fn Link(route: AppRoute, #[prop(optional, into)] class: String, children: Children) -> impl IntoView {
    let router = use_router();
    let href = route.to_path();
    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.go(route.clone());
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}
