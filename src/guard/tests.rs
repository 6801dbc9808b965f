use super::*;
use crate::error::ApiError;
use crate::request::{HttpRequest, HttpResponse, MockHttpClient};
use crate::session::SessionStore;
use std::cell::RefCell;
use crate::storage::{MemoryStore, TOKEN_KEY};
use serde_json::json;
use skillswap_shared::protocol::HttpMethod;

const BASE: &str = "http://api.test";

// =========================================================
// 辅助函数
// =========================================================

/// 每个请求先让出一次执行权，使并发检查真正交错
struct YieldingClient(MockHttpClient);

#[async_trait::async_trait(?Send)]
impl HttpClient for YieldingClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        tokio::task::yield_now().await;
        self.0.send(req).await
    }
}

fn setup<C: HttpClient>(
    client: C,
    token: Option<&str>,
) -> (SkillSwapApi<C, MemoryStore>, RefCell<SessionStore<MemoryStore>>) {
    let storage = MemoryStore::new();
    if let Some(token) = token {
        storage.set(TOKEN_KEY, token);
    }
    let api = SkillSwapApi::new(BASE, client, storage.clone());
    (api, RefCell::new(SessionStore::new(storage)))
}

fn mock_status(client: &MockHttpClient, status: u16, body: &str) {
    client.mock(HttpMethod::Get, &format!("{BASE}/api/user/status"), status, body);
}

fn mock_profile(client: &MockHttpClient) {
    client.mock_response(
        &format!("{BASE}/api/user/profile"),
        200,
        json!({"email": "ada@example.com", "username": "Ada"}),
    );
}

const PRIVATE_ROUTES: [AppRoute; 4] = [
    AppRoute::Home,
    AppRoute::ProfileCompletion,
    AppRoute::EditProfile,
    AppRoute::NotFound,
];

fn all_routes() -> Vec<AppRoute> {
    vec![
        AppRoute::Login,
        AppRoute::Register,
        AppRoute::EmailVerify,
        AppRoute::Home,
        AppRoute::ProfileCompletion,
        AppRoute::ProfileView("7".into()),
        AppRoute::EditProfile,
        AppRoute::Chat("bob@x.com".into()),
        AppRoute::NotFound,
    ]
}

// =========================================================
// decide 决策表
// =========================================================

#[test]
fn test_decide_without_token() {
    for route in all_routes() {
        let expected = if route.is_public() {
            GuardAction::Allow
        } else {
            GuardAction::Redirect(AppRoute::Login)
        };
        assert_eq!(decide(&route, None), expected, "{route}");
    }
}

#[test]
fn test_decide_rejected_always_goes_to_login() {
    for route in all_routes() {
        let action = decide(&route, Some(&Validation::Rejected));
        if route == AppRoute::Login {
            assert_eq!(action, GuardAction::Allow);
        } else {
            assert_eq!(action, GuardAction::Redirect(AppRoute::Login));
        }
    }
}

#[test]
fn test_decide_with_status() {
    let new = Validation::New {
        profile_loaded: true,
    };
    let existing = Validation::Existing {
        profile_loaded: true,
    };

    assert_eq!(
        decide(&AppRoute::Home, Some(&new)),
        GuardAction::Redirect(AppRoute::ProfileCompletion)
    );
    assert_eq!(
        decide(&AppRoute::ProfileCompletion, Some(&new)),
        GuardAction::Allow
    );
    assert_eq!(
        decide(&AppRoute::ProfileCompletion, Some(&existing)),
        GuardAction::Redirect(AppRoute::Home)
    );
    for route in all_routes() {
        if route != AppRoute::ProfileCompletion {
            assert_eq!(decide(&route, Some(&existing)), GuardAction::Allow);
        }
    }
}

#[test]
fn test_decide_profile_failure_allows_completion() {
    let existing = Validation::Existing {
        profile_loaded: false,
    };
    assert_eq!(
        decide(&AppRoute::Home, Some(&existing)),
        GuardAction::Redirect(AppRoute::ProfileCompletion)
    );
    assert_eq!(
        decide(&AppRoute::ProfileCompletion, Some(&existing)),
        GuardAction::Allow
    );
}

#[test]
fn test_redirect_target_is_stable() {
    let validations = [
        None,
        Some(Validation::Rejected),
        Some(Validation::New {
            profile_loaded: false,
        }),
        Some(Validation::Existing {
            profile_loaded: true,
        }),
        Some(Validation::Existing {
            profile_loaded: false,
        }),
    ];

    for validation in &validations {
        for route in all_routes() {
            if let GuardAction::Redirect(target) = decide(&route, validation.as_ref()) {
                assert_eq!(
                    decide(&target, validation.as_ref()),
                    GuardAction::Allow,
                    "{route} -> {target} under {validation:?}"
                );
            }
        }
    }
}

// =========================================================
// check 端到端
// =========================================================

#[tokio::test]
async fn test_no_token_redirects_home_to_login() {
    let (api, session) = setup(MockHttpClient::new(), None);
    let outcome = RouteGuard::new(&api).check(&session, &AppRoute::Home).await;

    assert_eq!(outcome.action, GuardAction::Redirect(AppRoute::Login));
    assert_eq!(outcome.notice, None);
    assert!(api.client().requests.borrow().is_empty());
}

#[tokio::test]
async fn test_no_token_check_is_idempotent() {
    let (api, session) = setup(MockHttpClient::new(), None);
    let guard = RouteGuard::new(&api);

    for route in PRIVATE_ROUTES.iter() {
        let first = guard.check(&session, route).await;
        let second = guard.check(&session, route).await;
        assert_eq!(first, second);
        assert_eq!(first.action, GuardAction::Redirect(AppRoute::Login));
        assert!(!first.session_cleared);
    }
    assert!(api.client().requests.borrow().is_empty());
}

#[tokio::test]
async fn test_new_account_redirects_to_profile_completion() {
    let client = MockHttpClient::new();
    mock_status(&client, 200, "new");
    mock_profile(&client);
    let (api, session) = setup(client, Some("t1"));

    let outcome = RouteGuard::new(&api).check(&session, &AppRoute::Home).await;

    assert_eq!(
        outcome.action,
        GuardAction::Redirect(AppRoute::ProfileCompletion)
    );
    assert_eq!(
        session.borrow().current().map(|i| i.display_name.clone()),
        Some("Ada".to_string())
    );
}

#[tokio::test]
async fn test_existing_account_leaves_profile_completion() {
    let client = MockHttpClient::new();
    mock_status(&client, 200, r#""existing""#);
    mock_profile(&client);
    let (api, session) = setup(client, Some("t1"));

    let guard = RouteGuard::new(&api);
    let outcome = guard.check(&session, &AppRoute::ProfileCompletion).await;
    assert_eq!(outcome.action, GuardAction::Redirect(AppRoute::Home));

    let outcome = guard.check(&session, &AppRoute::Home).await;
    assert_eq!(outcome.action, GuardAction::Allow);
    assert_eq!(outcome.notice, None);
}

#[tokio::test]
async fn test_profile_failure_still_allows_completion() {
    let client = MockHttpClient::new();
    mock_status(&client, 200, "existing");
    client.mock(HttpMethod::Get, &format!("{BASE}/api/user/profile"), 500, "boom");
    let (api, session) = setup(client, Some("t1"));

    let guard = RouteGuard::new(&api);
    let outcome = guard.check(&session, &AppRoute::Home).await;
    assert_eq!(
        outcome.action,
        GuardAction::Redirect(AppRoute::ProfileCompletion)
    );

    let outcome = guard.check(&session, &AppRoute::ProfileCompletion).await;
    assert_eq!(outcome.action, GuardAction::Allow);
    assert!(session.borrow().load().is_some());
    assert!(session.borrow().current().is_none());
}

#[tokio::test]
async fn test_rejected_token_clears_session() {
    let client = MockHttpClient::new();
    mock_status(&client, 401, "Invalid token: expired");
    let (api, session) = setup(client, Some("stale"));

    let outcome = RouteGuard::new(&api).check(&session, &AppRoute::Home).await;

    assert_eq!(outcome.action, GuardAction::Redirect(AppRoute::Login));
    assert_eq!(outcome.notice, Some(GuardNotice::SessionExpired));
    assert!(outcome.session_cleared);
    assert!(session.borrow().load().is_none());
    // 状态失败后不再拉取资料
    assert_eq!(api.client().count(&format!("{BASE}/api/user/profile")), 0);
}

#[tokio::test]
async fn test_concurrent_checks_clear_session_once() {
    let client = MockHttpClient::new();
    mock_status(&client, 401, "Invalid token: expired");
    let (api, session) = setup(YieldingClient(client), Some("stale"));
    let guard = RouteGuard::new(&api);

    let chat_route = AppRoute::Chat("bob@x.com".into());
    let (a, b, c) = futures::join!(
        guard.check(&session, &AppRoute::Home),
        guard.check(&session, &chat_route),
        guard.check(&session, &AppRoute::EditProfile),
    );

    let cleared = [&a, &b, &c].iter().filter(|o| o.session_cleared).count();
    assert_eq!(cleared, 1);
    for outcome in [a, b, c] {
        assert_eq!(outcome.action, GuardAction::Redirect(AppRoute::Login));
    }
    assert!(session.borrow().load().is_none());

    // 之后的检查不再访问后端
    let before = api.client().0.requests.borrow().len();
    let again = guard.check(&session, &AppRoute::Home).await;
    assert_eq!(again.action, GuardAction::Redirect(AppRoute::Login));
    assert!(!again.session_cleared);
    assert_eq!(api.client().0.requests.borrow().len(), before);
}
