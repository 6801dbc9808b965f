use leptos::prelude::*;
use leptos::task::spawn_local;
use skillswap::profile::{EditProfileForm, SkillKind, load_edit_form, update_profile};

use crate::api::use_api;
use crate::components::common::{ErrorAlert, Field, Spinner};
use crate::web::router::use_router;

#[component]
fn SkillEditor(form: RwSignal<EditProfileForm>, kind: SkillKind, #[prop(into)] title: String) -> impl IntoView {
    let skills = move |f: &EditProfileForm| match kind {
        SkillKind::Offered => f.skills_offered.clone(),
        SkillKind::Wanted => f.skills_wanted.clone(),
    };

    view! {
        <h3 class="font-semibold mt-4">{title}</h3>
        {move || {
            form.with(skills)
                .into_iter()
                .enumerate()
                .map(|(i, name)| view! {
                    <div class="join w-full">
                        <input
                            class="input input-bordered join-item flex-1"
                            prop:value=name
                            on:change=move |ev| form.update(|f| f.set_skill(kind, i, event_target_value(&ev)))
                        />
                        <button
                            type="button"
                            class="btn btn-outline btn-error join-item"
                            on:click=move |_| form.update(|f| f.remove_skill(kind, i))
                        >
                            "Remove"
                        </button>
                    </div>
                })
                .collect_view()
        }}
        <button
            type="button"
            class="btn btn-ghost btn-sm self-start"
            on:click=move |_| form.update(|f| f.add_skill(kind))
        >
            "+ Add Skill"
        </button>
    }
}

#[component]
pub fn EditProfilePage() -> impl IntoView {
    let api = use_api();
    let router = use_router();

    let form = RwSignal::new(EditProfileForm::default());
    let loading = RwSignal::new(true);
    let error_msg = RwSignal::new(Option::<String>::None);

    {
        let api = api.clone();
        spawn_local(async move {
            let loaded = load_edit_form(&api).await;
            let _ = form.try_set(loaded);
            let _ = loading.try_set(false);
        });
    }

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        error_msg.set(None);
        let api = api.clone();
        spawn_local(async move {
            match update_profile(&api, &form.get_untracked()).await {
                Ok((next, msg)) => {
                    // 提示跟随路由显示，页面切换后仍可见
                    router.notice().set(Some(msg));
                    router.go(next);
                }
                Err(msg) => error_msg.set(Some(msg)),
            }
        });
    };

    view! {
        <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
            <div class="max-w-2xl mx-auto card bg-base-100 shadow-xl">
                <form class="card-body space-y-2" on:submit=on_submit.clone()>
                    <h2 class="card-title text-2xl">"Edit Profile"</h2>
                    <ErrorAlert message=error_msg />
                    <Field
                        label="Full Name"
                        value=Signal::derive(move || form.with(|f| f.full_name.clone()))
                        on_input=Callback::new(move |v| form.update(|f| f.full_name = v))
                    />
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Bio"</span></label>
                        <textarea
                            class="textarea textarea-bordered"
                            prop:value=move || form.with(|f| f.bio.clone())
                            on:input=move |ev| form.update(|f| f.bio = event_target_value(&ev))
                        ></textarea>
                    </div>
                    <SkillEditor form=form kind=SkillKind::Offered title="Skills Offered" />
                    <SkillEditor form=form kind=SkillKind::Wanted title="Skills Wanted" />
                    <div class="form-control mt-6">
                        <button class="btn btn-primary">"Save Changes"</button>
                    </div>
                </form>
            </div>
        </Show>
    }
}
