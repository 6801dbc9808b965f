use leptos::prelude::*;
use leptos::task::spawn_local;
use skillswap::profile::{ProfileForm, SkillKind, complete_profile};

use crate::api::use_api;
use crate::components::common::{ErrorAlert, Field};
use crate::web::router::use_router;

/// 绑定表单中的一个字符串字段
macro_rules! bind {
    ($form:expr, |$f:ident| $field:expr) => {{
        let form = $form;
        (
            Signal::derive(move || form.with(|$f| $field.clone())),
            Callback::new(move |value: String| form.update(|$f| $field = value)),
        )
    }};
}

/// 新用户完善资料
#[component]
pub fn ProfileCompletionPage() -> impl IntoView {
    let api = use_api();
    let router = use_router();

    let form = RwSignal::new(ProfileForm::default());
    let error_msg = RwSignal::new(Option::<String>::None);
    let is_submitting = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        is_submitting.set(true);
        error_msg.set(None);

        let api = api.clone();
        spawn_local(async move {
            match complete_profile(&api, &form.get_untracked()).await {
                Ok(next) => router.go(next),
                Err(msg) => error_msg.set(Some(msg)),
            }
            is_submitting.set(false);
        });
    };

    let (full_name, set_full_name) = bind!(form, |f| f.full_name);
    let (picture, set_picture) = bind!(form, |f| f.profile_picture);
    let (location, set_location) = bind!(form, |f| f.location);
    let (age, set_age) = bind!(form, |f| f.age);
    let (bio, set_bio) = bind!(form, |f| f.bio);
    let (languages, set_languages) = bind!(form, |f| f.known_languages);

    let offered_rows = move || {
        let count = form.with(|f| f.skills_offered.len());
        (0..count)
            .map(|i| {
                let (name, set_name) = bind!(form, |f| f.skills_offered[i].name);
                let (level, set_level) = bind!(form, |f| f.skills_offered[i].level);
                let (description, set_description) = bind!(form, |f| f.skills_offered[i].description);
                let (availability, set_availability) = bind!(form, |f| f.skills_offered[i].availability);
                view! {
                    <div class="grid gap-2 md:grid-cols-4 border border-base-300 rounded-box p-3">
                        <Field label="Skill" value=name on_input=set_name required=true />
                        <Field label="Level" value=level on_input=set_level placeholder="Beginner / Expert" />
                        <Field label="Description" value=description on_input=set_description />
                        <Field label="Availability" value=availability on_input=set_availability />
                    </div>
                }
            })
            .collect_view()
    };

    let wanted_rows = move || {
        let count = form.with(|f| f.skills_wanted.len());
        (0..count)
            .map(|i| {
                let (name, set_name) = bind!(form, |f| f.skills_wanted[i].name);
                let (level, set_level) = bind!(form, |f| f.skills_wanted[i].level);
                view! {
                    <div class="grid gap-2 md:grid-cols-2 border border-base-300 rounded-box p-3">
                        <Field label="Skill" value=name on_input=set_name />
                        <Field label="Level" value=level on_input=set_level />
                    </div>
                }
            })
            .collect_view()
    };

    view! {
        <div class="max-w-3xl mx-auto card bg-base-100 shadow-xl">
            <form class="card-body space-y-2" on:submit=on_submit>
                <h2 class="card-title text-2xl">"Complete your profile"</h2>
                <ErrorAlert message=error_msg />
                <Field label="Full Name" value=full_name on_input=set_full_name required=true />
                <Field label="Profile Picture URL" value=picture on_input=set_picture />
                <div class="grid gap-2 md:grid-cols-2">
                    <Field label="Location" value=location on_input=set_location />
                    <Field label="Age" kind="number" value=age on_input=set_age required=true />
                </div>

                <h3 class="font-semibold mt-4">"Skills Offered"</h3>
                {offered_rows}
                <button type="button" class="btn btn-ghost btn-sm self-start" on:click=move |_| form.update(|f| f.add_skill(SkillKind::Offered))>
                    "+ Add Skill"
                </button>

                <h3 class="font-semibold mt-4">"Skills Wanted"</h3>
                {wanted_rows}
                <button type="button" class="btn btn-ghost btn-sm self-start" on:click=move |_| form.update(|f| f.add_skill(SkillKind::Wanted))>
                    "+ Add Skill"
                </button>

                <div class="form-control">
                    <label class="label"><span class="label-text">"Bio"</span></label>
                    <textarea
                        class="textarea textarea-bordered"
                        prop:value=bio
                        on:input=move |ev| set_bio.run(event_target_value(&ev))
                    ></textarea>
                </div>
                <Field
                    label="Known Languages"
                    placeholder="English, Hindi"
                    value=languages
                    on_input=set_languages
                />

                <div class="form-control mt-6">
                    <button class="btn btn-primary" disabled=move || is_submitting.get()>"Save Profile"</button>
                </div>
            </form>
        </div>
    }
}
