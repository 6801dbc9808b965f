use std::ops::ControlFlow;

use leptos::prelude::*;
use leptos::task::spawn_local;
use skillswap::AppRoute;
use skillswap::auth::AuthFlows;
use skillswap::home::{FriendAction, HomeSnapshot, HomeTab, HomeView, fetch_home, open_notifications};
use skillswap_shared::{Friend, FriendRequest, UserProfileSummary};

use crate::api::{use_api, use_config};
use crate::auth::use_auth;
use crate::components::common::{Notification, Spinner, Toast};
use crate::poll::use_polling;
use crate::web::router::{Link, use_router};

fn join_or_none(skills: &[String]) -> String {
    if skills.is_empty() {
        "None".to_string()
    } else {
        skills.join(", ")
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let router = use_router();
    let period = use_config().home_poll_period;

    let home = RwSignal::new(HomeView::new());
    let notification = RwSignal::new(Notification::None);

    let poll = {
        let fetch_api = api.clone();
        let apply_api = api.clone();
        use_polling(
            period,
            move || {
                let api = fetch_api.clone();
                async move { fetch_home(&api).await }
            },
            move |result| {
                let flow = home
                    .try_update(|v| v.apply(result))
                    .unwrap_or(ControlFlow::Break(()));
                if home.try_with_untracked(|v| v.session_invalid) == Some(true) {
                    router.go(AuthFlows::new(&apply_api, &auth).sign_out());
                }
                flow
            },
        )
    };

    let run_action = {
        let api = api.clone();
        let poll = poll.clone();
        move |action: FriendAction| {
            let api = api.clone();
            let poll = poll.clone();
            spawn_local(async move {
                match action.run(&api).await {
                    Ok(msg) => {
                        notification.set(Some((msg, false)));
                        poll.refresh();
                    }
                    Err(msg) => notification.set(Some((msg, true))),
                }
            });
        }
    };

    let select_tab = move |tab: HomeTab| {
        if home.try_update(|v| v.select_tab(tab)) == Some(true) {
            let api = api.clone();
            spawn_local(async move {
                if let Some(requests) = open_notifications(&api).await {
                    home.update(|v| v.notifications_seen(requests));
                }
            });
        }
    };

    view! {
        <Toast notification=notification />
        <Show when=move || home.with(|v| v.snapshot.is_some()) fallback=move || {
            if home.with(|v| v.loading) {
                view! { <Spinner /> }.into_any()
            } else {
                view! { <div class="alert alert-error">{move || home.with(|v| v.banner())}</div> }.into_any()
            }
        }>
            <div class="space-y-6">
                <Show when=move || home.with(|v| v.banner().is_some())>
                    <div role="alert" class="alert alert-warning">{move || home.with(|v| v.banner())}</div>
                </Show>
                {move || home.with(|v| v.snapshot.as_ref().map(|s| view! { <ProfileHeader profile=s.profile.clone() /> }))}
                <div role="tablist" class="tabs tabs-boxed">
                    {HomeTab::ALL
                        .into_iter()
                        .map(|tab| {
                            let select_tab = select_tab.clone();
                            view! {
                                <a
                                    role="tab"
                                    class=move || if home.with(|v| v.tab) == tab { "tab tab-active" } else { "tab" }
                                    on:click=move |_| select_tab(tab)
                                >
                                    {tab.label()}
                                    {move || (tab == HomeTab::Notifications)
                                        .then(|| home.with(|v| v.snapshot.as_ref().map_or(0, |s| s.unread_requests)))
                                        .filter(|n| *n > 0)
                                        .map(|n| view! { <span class="badge badge-error badge-sm ml-2">{n}</span> })}
                                </a>
                            }
                        })
                        .collect_view()}
                </div>
                {
                    let run_action = run_action.clone();
                    move || {
                        let run_action = run_action.clone();
                        home.with(|v| {
                            let snapshot = v.snapshot.clone().unwrap_or_default();
                            match v.tab {
                                HomeTab::Matches => view! { <MatchList matches=snapshot.matches on_action=run_action /> }.into_any(),
                                HomeTab::Notifications => view! { <RequestList requests=snapshot.friend_requests on_action=run_action /> }.into_any(),
                                HomeTab::Friends => view! { <FriendList snapshot=snapshot /> }.into_any(),
                            }
                        })
                    }
                }
            </div>
        </Show>
    }
}

#[component]
fn ProfileHeader(profile: UserProfileSummary) -> impl IntoView {
    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title">"Welcome, " {profile.display_name.clone()}</h2>
                <p><span class="font-medium">"Your skills: "</span>{join_or_none(&profile.skills_offered)}</p>
                <p><span class="font-medium">"Want to learn: "</span>{join_or_none(&profile.skills_wanted)}</p>
                <div class="card-actions justify-end">
                    <Link route=AppRoute::EditProfile class="link link-primary">"Edit Profile"</Link>
                </div>
            </div>
        </div>
    }
}

#[component]
fn MatchList<F>(matches: Vec<UserProfileSummary>, on_action: F) -> impl IntoView
where
    F: Fn(FriendAction) + Clone + Send + Sync + 'static,
{
    if matches.is_empty() {
        return view! { <p class="text-base-content/60">"No matches found."</p> }.into_any();
    }
    view! {
        <div class="grid gap-4 md:grid-cols-2">
            {matches
                .into_iter()
                .map(|user| {
                    let on_action = on_action.clone();
                    let email = user.email.clone();
                    let bio = if user.bio.is_empty() { "No bio provided".to_string() } else { user.bio.clone() };
                    view! {
                        <div class="card bg-base-100 shadow">
                            <div class="card-body">
                                <h3 class="card-title">{user.display_name.clone()}</h3>
                                <p><span class="font-medium">"Skills offered: "</span>{join_or_none(&user.skills_offered)}</p>
                                <p><span class="font-medium">"Skills wanted: "</span>{join_or_none(&user.skills_wanted)}</p>
                                <p class="text-sm text-base-content/60 truncate">{bio}</p>
                                <div class="card-actions justify-end">
                                    {user.id.clone().map(|id| view! {
                                        <Link route=AppRoute::ProfileView(id) class="btn btn-ghost btn-sm">"View Profile"</Link>
                                    })}
                                    <button
                                        class="btn btn-primary btn-sm"
                                        on:click=move |_| on_action(FriendAction::Connect { email: email.clone() })
                                    >
                                        "Connect"
                                    </button>
                                </div>
                            </div>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
    .into_any()
}

#[component]
fn RequestList<F>(requests: Vec<FriendRequest>, on_action: F) -> impl IntoView
where
    F: Fn(FriendAction) + Clone + Send + Sync + 'static,
{
    if requests.is_empty() {
        return view! { <p class="text-base-content/60">"No pending friend requests."</p> }.into_any();
    }
    view! {
        <ul class="space-y-2">
            {requests
                .into_iter()
                .map(|request| {
                    let accept = on_action.clone();
                    let reject = on_action.clone();
                    let id = request.request_id.clone();
                    let id_reject = id.clone();
                    view! {
                        <li class="flex items-center justify-between bg-base-100 rounded-box p-4 shadow">
                            <span>
                                {request.sender_display_name.clone()}
                                " (" {request.sender_email.clone()} ")"
                                {(!request.read).then(|| view! { <span class="ml-2 text-error font-bold">"New"</span> })}
                            </span>
                            <span class="flex gap-2">
                                <button
                                    class="btn btn-success btn-sm"
                                    on:click=move |_| accept(FriendAction::Accept { request_id: id.clone() })
                                >
                                    "Accept"
                                </button>
                                <button
                                    class="btn btn-outline btn-error btn-sm"
                                    on:click=move |_| reject(FriendAction::Reject { request_id: id_reject.clone() })
                                >
                                    "Reject"
                                </button>
                            </span>
                        </li>
                    }
                })
                .collect_view()}
        </ul>
    }
    .into_any()
}

#[component]
fn FriendList(snapshot: HomeSnapshot) -> impl IntoView {
    if snapshot.friends.is_empty() {
        return view! { <p class="text-base-content/60">"No friends yet."</p> }.into_any();
    }
    let cards = snapshot
        .friends
        .iter()
        .map(|friend: &Friend| {
            let unread = snapshot.unread_from(&friend.email);
            let preview = snapshot
                .unread_per_friend
                .get(&friend.email)
                .and_then(|s| s.last_message.clone());
            view! {
                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <h3 class="card-title">
                            {friend.display_name.clone()}
                            {(unread > 0).then(|| view! { <span class="badge badge-error">{unread}</span> })}
                        </h3>
                        <p><span class="font-medium">"Skills offered: "</span>{join_or_none(&friend.skills_offered)}</p>
                        <p><span class="font-medium">"Skills wanted: "</span>{join_or_none(&friend.skills_wanted)}</p>
                        {preview.map(|text| view! { <p class="text-sm italic text-base-content/60 truncate">{text}</p> })}
                        <div class="card-actions justify-end">
                            <Link route=AppRoute::Chat(friend.email.clone()) class="btn btn-primary btn-sm">"Chat"</Link>
                        </div>
                    </div>
                </div>
            }
        })
        .collect_view();

    view! { <div class="grid gap-4 md:grid-cols-2">{cards}</div> }.into_any()
}
