use leptos::prelude::*;
use leptos::task::spawn_local;
use skillswap::home::FriendAction;
use skillswap::profile::view_profile;
use skillswap_shared::{UserProfileSummary, initial_of};

use crate::api::use_api;
use crate::components::common::{Notification, SkillBadges, Spinner, Toast};

/// 他人资料页
#[component]
pub fn ProfilePage(id: String) -> impl IntoView {
    let api = use_api();
    let profile = RwSignal::new(Option::<Result<UserProfileSummary, String>>::None);
    let notification = RwSignal::new(Notification::None);

    {
        let api = api.clone();
        spawn_local(async move {
            let loaded = view_profile(&api, &id).await;
            let _ = profile.try_set(Some(loaded));
        });
    }

    let connect = move |email: String| {
        let api = api.clone();
        spawn_local(async move {
            let result = FriendAction::Connect { email }.run(&api).await;
            notification.set(Some(match result {
                Ok(msg) => (msg, false),
                Err(msg) => (msg, true),
            }));
        });
    };

    view! {
        <Toast notification=notification />
        {move || match profile.get() {
            None => view! { <Spinner /> }.into_any(),
            Some(Err(msg)) => view! { <div class="alert alert-error">"Error: " {msg}</div> }.into_any(),
            Some(Ok(user)) => {
                let connect = connect.clone();
                let email = user.email.clone();
                view! {
                    <div class="max-w-2xl mx-auto card bg-base-100 shadow-xl">
                        <div class="card-body items-center text-center">
                            <div class="avatar placeholder">
                                <div class="bg-primary text-primary-content rounded-full w-20">
                                    <span class="text-3xl">{initial_of(&user.display_name)}</span>
                                </div>
                            </div>
                            <h2 class="card-title text-2xl">{user.display_name.clone()}</h2>
                            <p class="text-base-content/60">{user.email.clone()}</p>
                            <p>{user.bio.clone()}</p>
                            <div class="flex flex-wrap gap-2 justify-center">
                                <SkillBadges skills=user.skills_offered.clone() class="badge-primary" />
                            </div>
                            <div class="flex flex-wrap gap-2 justify-center">
                                <SkillBadges skills=user.skills_wanted.clone() class="badge-secondary" />
                            </div>
                            <div class="card-actions mt-4">
                                <button class="btn btn-primary" on:click=move |_| connect(email.clone())>
                                    "Connect"
                                </button>
                            </div>
                        </div>
                    </div>
                }
                .into_any()
            }
        }}
    }
}
