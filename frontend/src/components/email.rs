use leptos::prelude::*;
use leptos::task::spawn_local;
use skillswap::SessionAccess;
use skillswap::auth::AuthFlows;

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::common::{ErrorAlert, Field};
use crate::web::router::use_router;

/// OTP 验证页：邮箱取自注册时保存的值
#[component]
pub fn EmailVerifyPage() -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let router = use_router();

    let email = auth.persisted_email().unwrap_or_default();
    let code = RwSignal::new(String::new());
    let error_msg = RwSignal::new(Option::<String>::None);

    let on_submit = {
        let email = email.clone();
        move |ev: leptos::ev::SubmitEvent| {
            ev.prevent_default();
            let api = api.clone();
            let email = email.clone();
            spawn_local(async move {
                match AuthFlows::new(&api, &auth)
                    .verify_otp(&email, &code.get_untracked())
                    .await
                {
                    Ok(next) => router.go(next),
                    Err(msg) => error_msg.set(Some(msg)),
                }
            });
        }
    };

    view! {
        <div class="hero min-h-[80vh]">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold">"Verify your email"</h1>
                <p class="text-base-content/70">"We sent a code to " <b>{email}</b></p>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <ErrorAlert message=error_msg />
                        <Field
                            label="Enter Verification Code:"
                            kind="number"
                            required=true
                            value=code
                            on_input=Callback::new(move |v| code.set(v))
                        />
                        <div class="form-control mt-6">
                            <button class="btn btn-primary">"Submit"</button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}
