use leptos::prelude::*;
use leptos::task::spawn_local;
use skillswap::AppRoute;
use skillswap::auth::{AuthFlows, RegisterOutcome};
use skillswap::countdown::Cooldown;

use crate::api::{use_api, use_config};
use crate::auth::use_auth;
use crate::components::common::{ErrorAlert, Field};
use crate::web::Interval;
use crate::web::router::{Link, use_router};

#[component]
pub fn RegisterPage() -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let router = use_router();
    let tick = use_config().cooldown_tick;

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let error_msg = RwSignal::new(Option::<String>::None);
    let cooldown = RwSignal::new(Cooldown::default());
    // 页面卸载时随 owner 一起释放，定时器随之清除
    let ticker = StoredValue::new_local(Option::<Interval>::None);

    let start_countdown = move |started: Cooldown| {
        cooldown.set(started);
        let interval = Interval::new(tick, move || {
            let waiting = cooldown
                .try_update(|c| c.is_waiting() && c.tick())
                .unwrap_or(false);
            if !waiting {
                // 回调内部只清除定时器，闭包本身等下次启动或页面卸载时释放
                ticker.with_value(|t| t.as_ref().map(Interval::cancel));
            }
        });
        ticker.set_value(interval);
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        error_msg.set(None);

        let api = api.clone();
        spawn_local(async move {
            let outcome = AuthFlows::new(&api, &auth)
                .register(
                    &email.get_untracked(),
                    &password.get_untracked(),
                    &cooldown.get_untracked(),
                )
                .await;
            match outcome {
                RegisterOutcome::Submitted(next) => router.go(next),
                RegisterOutcome::CoolingDown(started) => start_countdown(started),
                RegisterOutcome::Ignored => {}
                RegisterOutcome::Failed(msg) => error_msg.set(Some(msg)),
            }
        });
    };

    let waiting = move || cooldown.with(Cooldown::is_waiting);
    let message = Signal::derive(move || cooldown.with(Cooldown::message).or_else(|| error_msg.get()));

    view! {
        <div class="hero min-h-[80vh]">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold">"Register"</h1>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <ErrorAlert message=message />
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
                            required=true
                            value=password
                            on_input=Callback::new(move |v| password.set(v))
                        />
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=waiting>
                                {move || match cooldown.get().remaining() {
                                    0 => "Register".to_string(),
                                    secs => format!("Register ({}s)", secs),
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "Already registered? " <Link route=AppRoute::Login class="link link-primary">"Login"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
