//! 页面间共用的小组件

use std::time::Duration;

use leptos::prelude::*;

/// (消息内容, 是否出错)
pub type Notification = Option<(String, bool)>;

/// 右上角提示，3 秒后自动消失
#[component]
pub fn Toast(notification: RwSignal<Notification>) -> impl IntoView {
    Effect::new(move |_| {
        if notification.get().is_some() {
            set_timeout(move || notification.set(None), Duration::from_secs(3));
        }
    });

    view! {
        <Show when=move || notification.with(Option::is_some)>
            <div class="toast toast-top toast-end z-50">
                <div class=move || {
                    match notification.get() {
                        Some((_, true)) => "alert alert-error shadow-lg",
                        _ => "alert alert-success shadow-lg",
                    }
                }>
                    <span>{move || notification.get().map(|(msg, _)| msg).unwrap_or_default()}</span>
                </div>
            </div>
        </Show>
    }
}

#[component]
pub fn ErrorAlert(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.with(Option::is_some)>
            <div role="alert" class="alert alert-error text-sm py-2">
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center py-12">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 受控文本输入
#[component]
pub fn Field(
    #[prop(into)] label: String,
    #[prop(into)] value: Signal<String>,
    on_input: Callback<String>,
    #[prop(optional, into)] kind: Option<String>,
    #[prop(optional, into)] placeholder: String,
    #[prop(optional)] required: bool,
) -> impl IntoView {
    view! {
        <div class="form-control">
            <label class="label">
                <span class="label-text">{label}</span>
            </label>
            <input
                type=kind.unwrap_or_else(|| "text".to_string())
                placeholder=placeholder
                class="input input-bordered"
                required=required
                prop:value=value
                on:input=move |ev| on_input.run(event_target_value(&ev))
            />
        </div>
    }
}

/// 逗号分隔的技能标签
#[component]
pub fn SkillBadges(skills: Vec<String>, #[prop(optional, into)] class: String) -> impl IntoView {
    let class = format!("badge badge-outline {}", class);
    skills
        .into_iter()
        .map(|skill| view! { <span class=class.clone()>{skill}</span> })
        .collect_view()
}
