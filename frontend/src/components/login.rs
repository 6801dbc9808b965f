use std::time::Duration;

use leptos::html::Div;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, warn};
use skillswap::AppRoute;
use skillswap::auth::{AuthFlows, OAuthResult};

use crate::api::{use_api, use_config};
use crate::auth::use_auth;
use crate::components::common::{ErrorAlert, Field};
use crate::web::google;
use crate::web::router::{Link, use_router};

const GIS_LOAD_ATTEMPTS: u32 = 10;
const GIS_RETRY_DELAY: Duration = Duration::from_millis(500);

#[component]
pub fn LoginPage() -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let router = use_router();
    let config = use_config();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error_msg = RwSignal::new(Option::<String>::None);
    let is_submitting = RwSignal::new(false);

    let on_submit = {
        let api = api.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            is_submitting.set(true);
            error_msg.set(None);

            let api = api.clone();
            spawn_local(async move {
                let result = AuthFlows::new(&api, &auth)
                    .login(&email.get_untracked(), &password.get_untracked())
                    .await;
                match result {
                    Ok(next) => router.go(next),
                    Err(msg) => error_msg.set(Some(msg)),
                }
                is_submitting.set(false);
            });
        }
    };

    // Google 按钮在容器挂载后渲染。脚本是异步加载的，未就绪时稍后重试，
    // 始终加载不到就隐藏按钮，不当作登录失败
    let google_button = NodeRef::<Div>::new();
    let google_available = RwSignal::new(config.google_client_id.is_some());
    let client_id = config.google_client_id.clone();
    Effect::new(move |_| {
        let (Some(container), Some(client_id)) = (google_button.get(), client_id.clone()) else {
            return;
        };
        let api = api.clone();
        spawn_local(async move {
            for attempt in 1..=GIS_LOAD_ATTEMPTS {
                let api = api.clone();
                let on_result = move |result: OAuthResult| {
                    let api = api.clone();
                    spawn_local(async move {
                        match AuthFlows::new(&api, &auth).oauth(result).await {
                            Ok(next) => router.go(next),
                            Err(msg) => error_msg.set(Some(msg)),
                        }
                    });
                };
                match google::render_sign_in_button(&client_id, &container, on_result) {
                    Ok(()) => return,
                    Err(err) => debug!("google sign-in not ready (attempt {}): {}", attempt, err),
                }
                gloo_timers::future::sleep(GIS_RETRY_DELAY).await;
            }
            warn!("google sign-in script unavailable, hiding button");
            let _ = google_available.try_set(false);
        });
    });

    view! {
        <div class="hero min-h-[80vh]">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold">"Login"</h1>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <ErrorAlert message=error_msg />
                        <Field
                            label="Email"
                            kind="email"
                            required=true
                            value=email
                            on_input=Callback::new(move |v| email.set(v))
                        />
                        <Field
                            label="Password"
                            kind="password"
                            placeholder="••••••••"
                            required=true
                            value=password
                            on_input=Callback::new(move |v| password.set(v))
                        />
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                } else {
                                    "Login".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "No account? " <Link route=AppRoute::Register class="link link-primary">"Register"</Link>
                        </p>
                    </form>
                    {move || google_available.get().then(|| view! {
                        <div class="card-body pt-0 items-center">
                            <p class="text-base-content/70 mb-2">"Or sign in with Google:"</p>
                            <div node_ref=google_button></div>
                        </div>
                    })}
                </div>
            </div>
        </div>
    }
}
