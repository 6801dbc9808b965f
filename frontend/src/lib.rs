//! SkillSwap 前端应用
//!
//! 核心状态与流程都在 `skillswap` 库中，这里只做浏览器绑定与渲染：
//! - `web::router`: 经过异步守卫的路由服务
//! - `auth`: 会话的响应式外壳
//! - `poll`: 轮询加载器与组件生命周期绑定
//! - `components`: UI 组件层

mod api;
mod auth;
mod components {
    pub mod chat;
    pub mod common;
    pub mod edit_profile;
    pub mod email;
    pub mod home;
    pub mod login;
    pub mod nav;
    pub mod profile_form;
    pub mod profile_view;
    pub mod register;
}
mod poll;
pub(crate) mod web;

use leptos::prelude::*;
use log::LevelFilter;
use skillswap::AppRoute;

use crate::api::provide_services;
use crate::auth::AuthContext;
use crate::components::chat::ChatPage;
use crate::components::edit_profile::EditProfilePage;
use crate::components::email::EmailVerifyPage;
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::nav::NavBar;
use crate::components::profile_form::ProfileCompletionPage;
use crate::components::profile_view::ProfilePage;
use crate::components::register::RegisterPage;
use crate::web::router::{Router, RouterOutlet, use_router};

fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::EmailVerify => view! { <EmailVerifyPage /> }.into_any(),
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::ProfileCompletion => view! { <ProfileCompletionPage /> }.into_any(),
        AppRoute::ProfileView(id) => view! { <ProfilePage id=id /> }.into_any(),
        AppRoute::EditProfile => view! { <EditProfilePage /> }.into_any(),
        AppRoute::Chat(friend_email) => view! { <ChatPage friend_email=friend_email /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-[60vh]">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

/// 守卫提示（会话过期、资料已更新等）
#[component]
fn RouteNotice() -> impl IntoView {
    let notice = use_router().notice();
    Effect::new(move |_| {
        if notice.get().is_some() {
            set_timeout(move || notice.set(None), std::time::Duration::from_secs(3));
        }
    });

    view! {
        <Show when=move || notice.with(Option::is_some)>
            <div class="toast toast-top toast-center z-50">
                <div class="alert alert-info shadow-lg">
                    <span>{move || notice.get().unwrap_or_default()}</span>
                </div>
            </div>
        </Show>
    }
}

#[component]
pub fn App() -> impl IntoView {
    web::console::init(if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let auth = AuthContext::new();
    provide_context(auth);
    let (_, api) = provide_services();

    view! {
        <Router api=api auth=auth>
            <div class="min-h-screen bg-base-200 font-sans">
                <NavBar />
                <RouteNotice />
                <main class="max-w-6xl mx-auto p-4 md:p-6">
                    <RouterOutlet matcher=route_matcher />
                </main>
            </div>
        </Router>
    }
}
