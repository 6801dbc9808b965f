use std::ops::ControlFlow;

use leptos::prelude::*;
use leptos::task::spawn_local;
use skillswap::AppRoute;
use skillswap::auth::AuthFlows;
use skillswap::chat::{ChatView, ComposerState, fetch_chat, submit_message};

use crate::api::{use_api, use_config};
use crate::auth::use_auth;
use crate::components::common::{ErrorAlert, Spinner};
use crate::poll::use_polling;
use crate::web::router::{Link, use_router};

#[component]
pub fn ChatPage(friend_email: String) -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let router = use_router();
    let period = use_config().chat_poll_period;

    let chat = RwSignal::new(ChatView::new());
    let composer = RwSignal::new(ComposerState::default());
    let sending = RwSignal::new(false);

    let poll = {
        let fetch_api = api.clone();
        let apply_api = api.clone();
        let email = friend_email.clone();
        use_polling(
            period,
            move || {
                let api = fetch_api.clone();
                let email = email.clone();
                async move { fetch_chat(&api, &email).await }
            },
            move |result| {
                let flow = chat
                    .try_update(|v| v.apply(result))
                    .unwrap_or(ControlFlow::Break(()));
                if chat.try_with_untracked(|v| v.session_invalid) == Some(true) {
                    router.go(AuthFlows::new(&apply_api, &auth).sign_out());
                }
                flow
            },
        )
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if sending.get_untracked() {
            return;
        }
        sending.set(true);

        let api = api.clone();
        let poll = poll.clone();
        let email = friend_email.clone();
        spawn_local(async move {
            let draft = composer.with_untracked(|c| c.input.clone());
            let outcome = submit_message(&api, &email, &draft).await;
            if composer.try_update(|c| c.apply(outcome)) == Some(true) {
                poll.refresh();
            }
            let _ = sending.try_set(false);
        });
    };

    let messages = move || {
        chat.with(|v| {
            let Some(snapshot) = v.snapshot.as_ref() else {
                return ().into_any();
            };
            if snapshot.messages.is_empty() {
                return view! {
                    <p class="text-center text-base-content/60">"No messages yet. Start the conversation!"</p>
                }
                .into_any();
            }
            snapshot
                .messages
                .iter()
                .map(|message| {
                    let side = if v.is_own(message) { "chat chat-end" } else { "chat chat-start" };
                    let bubble = if v.is_own(message) { "chat-bubble chat-bubble-primary" } else { "chat-bubble" };
                    let time = message.timestamp().map(|t| t.display()).unwrap_or_default();
                    view! {
                        <div class=side>
                            <div class="chat-header">
                                {v.sender_name(message).to_string()}
                                <time class="text-xs opacity-50 ml-2">{time}</time>
                            </div>
                            <div class=bubble>{message.content.clone()}</div>
                        </div>
                    }
                })
                .collect_view()
                .into_any()
        })
    };

    let title = move || {
        chat.with(|v| {
            v.snapshot
                .as_ref()
                .map(|s| format!("Chat with {}", s.friend.display_name))
                .unwrap_or_else(|| "Chat".to_string())
        })
    };

    view! {
        <div class="max-w-3xl mx-auto card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex items-center justify-between">
                    <h2 class="card-title">{title}</h2>
                    <Link route=AppRoute::Home class="btn btn-ghost btn-sm">"Back"</Link>
                </div>
                <Show when=move || !chat.with(|v| v.loading) fallback=|| view! { <Spinner /> }>
                    <Show when=move || chat.with(|v| v.error.is_some())>
                        <div role="alert" class=move || if chat.with(|v| v.stopped) { "alert alert-error" } else { "alert alert-warning" }>
                            "Error: " {move || chat.with(|v| v.error.clone()).unwrap_or_default()}
                        </div>
                    </Show>
                    <div class="h-[60vh] overflow-y-auto space-y-2">{messages}</div>
                </Show>
                <ErrorAlert message=Signal::derive(move || composer.with(|c| c.error.clone())) />
                <form class="join w-full mt-2" on:submit=on_submit>
                    <input
                        class="input input-bordered join-item flex-1"
                        placeholder="Type a message..."
                        prop:value=move || composer.with(|c| c.input.clone())
                        on:input=move |ev| composer.update(|c| c.input = event_target_value(&ev))
                        disabled=move || chat.with(|v| v.stopped)
                    />
                    <button class="btn btn-primary join-item" disabled=move || sending.get() || chat.with(|v| v.stopped)>
                        "Send"
                    </button>
                </form>
            </div>
        </div>
    }
}
