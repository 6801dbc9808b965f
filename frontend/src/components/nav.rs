use leptos::prelude::*;
use skillswap::AppRoute;
use skillswap::auth::AuthFlows;

use crate::api::use_api;
use crate::auth::use_auth;
use crate::web::router::{Link, use_router};

#[component]
pub fn NavBar() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let router = use_router();
    let signed_in = auth.is_signed_in();
    let identity = auth.identity();

    let on_sign_out = move |_| {
        let next = AuthFlows::new(&api, &auth).sign_out();
        router.go(next);
    };

    view! {
        <div class="navbar bg-base-100 shadow-xl sticky top-0 z-40">
            <div class="flex-1 gap-3">
                <div class="w-10 h-10 rounded-lg bg-primary text-primary-content flex items-center justify-center font-bold">
                    "S"
                </div>
                <Link route=AppRoute::Home class="btn btn-ghost text-xl">"SkillConnect"</Link>
                <Show when=move || router.is_pending().get()>
                    <span class="loading loading-dots loading-sm text-primary"></span>
                </Show>
            </div>
            <div class="flex-none gap-2">
                <Show
                    when=move || signed_in.get()
                    fallback=|| view! {
                        <Link route=AppRoute::Login class="btn btn-ghost">"Login"</Link>
                        <Link route=AppRoute::Register class="btn btn-primary">"Register"</Link>
                    }
                >
                    <Show when=move || identity.with(Option::is_some)>
                        <div class="avatar placeholder">
                            <div class="bg-primary text-primary-content rounded-full w-8">
                                <span class="text-sm">{move || identity.get().map(|i| i.initial()).unwrap_or_default()}</span>
                            </div>
                        </div>
                        <span class="font-medium hidden md:inline">
                            "Welcome, " {move || identity.get().map(|i| i.display_name).unwrap_or_default()}
                        </span>
                    </Show>
                    <Link route=AppRoute::EditProfile class="btn btn-ghost btn-sm">"Edit Profile"</Link>
                    <button on:click=on_sign_out.clone() class="btn btn-outline btn-error btn-sm">
                        "Sign Out"
                    </button>
                </Show>
            </div>
        </div>
    }
}
