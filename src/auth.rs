//! 认证流程：登录、注册、OTP 验证、OAuth 与退出
//!
//! 每个流程只返回下一步的路由或要展示的消息，导航由调用方执行。

use log::{info, warn};
use skillswap_shared::{Identity, UNKNOWN_DISPLAY_NAME};

use crate::api::SkillSwapApi;
use crate::countdown::Cooldown;
use crate::error::ApiErrorKind;
use crate::request::HttpClient;
use crate::route::AppRoute;
use crate::session::SessionAccess;
use crate::storage::KeyValueStore;

pub const LOGIN_FAILED: &str = "Username and password mismatch";
pub const ACCOUNT_EXISTS: &str = "Username already exists";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const INVALID_OTP: &str = "Invalid verification code";
pub const GOOGLE_AUTH_FAILED: &str = "Google authentication failed";
pub const BACKEND_UNREACHABLE: &str = "Error communicating with backend";
pub const GOOGLE_SIGN_IN_FAILED: &str = "Google Sign-In failed";

/// 登录成功后的落点；守卫会把老账号继续转到主页
const AFTER_SIGN_IN: AppRoute = AppRoute::ProfileCompletion;

// =========================================================
// 结果类型
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// OTP 已发送，前往验证页
    Submitted(AppRoute),
    /// 后端要求等待，启动本地倒计时
    CoolingDown(Cooldown),
    /// 倒计时期间的提交被忽略
    Ignored,
    Failed(String),
}

/// OAuth 提供方回调的统一结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthResult {
    Success { credential: String },
    Failure { reason: String },
}

// =========================================================
// 流程实现
// =========================================================

pub struct AuthFlows<'a, C: HttpClient, S: KeyValueStore, A: SessionAccess + ?Sized> {
    api: &'a SkillSwapApi<C, S>,
    session: &'a A,
}

impl<'a, C, S, A> AuthFlows<'a, C, S, A>
where
    C: HttpClient,
    S: KeyValueStore,
    A: SessionAccess + ?Sized,
{
    pub fn new(api: &'a SkillSwapApi<C, S>, session: &'a A) -> Self {
        Self { api, session }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AppRoute, String> {
        match self.api.login(email, password).await {
            Ok(token) => {
                self.session
                    .establish(&token, Identity::new(email, UNKNOWN_DISPLAY_NAME));
                info!("signed in as {}", email);
                Ok(AFTER_SIGN_IN)
            }
            Err(err) => {
                warn!("login failed: {}", err);
                Err(LOGIN_FAILED.to_string())
            }
        }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        cooldown: &Cooldown,
    ) -> RegisterOutcome {
        if cooldown.is_waiting() {
            return RegisterOutcome::Ignored;
        }

        match self.api.register(email, password).await {
            Ok(_) => {
                self.session.remember_email(email);
                RegisterOutcome::Submitted(AppRoute::EmailVerify)
            }
            Err(err) => match err.kind {
                ApiErrorKind::RateLimited { seconds } => {
                    RegisterOutcome::CoolingDown(Cooldown::start(seconds))
                }
                _ if err.message.contains("already exists") => {
                    RegisterOutcome::Failed(ACCOUNT_EXISTS.to_string())
                }
                _ => RegisterOutcome::Failed(err.message_or(REGISTRATION_FAILED)),
            },
        }
    }

    /// `email` 为空时使用注册时保存的邮箱
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<AppRoute, String> {
        let email = Some(email.trim().to_string())
            .filter(|e| !e.is_empty())
            .or_else(|| self.session.persisted_email())
            .unwrap_or_default();

        match self.api.verify_otp(&email, otp.trim()).await {
            Ok(_) => Ok(AppRoute::Login),
            Err(err) => {
                warn!("otp verification failed: {}", err);
                Err(INVALID_OTP.to_string())
            }
        }
    }

    /// 处理 OAuth 提供方的回调结果
    pub async fn oauth(&self, result: OAuthResult) -> Result<AppRoute, String> {
        let credential = match result {
            OAuthResult::Success { credential } => credential,
            OAuthResult::Failure { reason } => {
                warn!("oauth provider failure: {}", reason);
                return Err(GOOGLE_SIGN_IN_FAILED.to_string());
            }
        };

        match self.api.google_auth(&credential).await {
            Ok(res) => {
                self.session.establish(&res.token, res.identity());
                info!("signed in with google as {}", res.email);
                Ok(AFTER_SIGN_IN)
            }
            Err(err) if err.kind == ApiErrorKind::Network => {
                warn!("google auth unreachable: {}", err);
                Err(BACKEND_UNREACHABLE.to_string())
            }
            Err(err) => Err(err.message_or(GOOGLE_AUTH_FAILED)),
        }
    }

    pub fn sign_out(&self) -> AppRoute {
        self.session.clear();
        info!("signed out");
        AppRoute::Login
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MockHttpClient;
    use crate::session::SessionStore;
    use crate::storage::{EMAIL_KEY, MemoryStore, TOKEN_KEY};
    use serde_json::json;
    use skillswap_shared::protocol::HttpMethod;
    use std::cell::RefCell;

    const BASE: &str = "http://api.test";

    struct Fixture {
        storage: MemoryStore,
        api: SkillSwapApi<MockHttpClient, MemoryStore>,
        session: RefCell<SessionStore<MemoryStore>>,
    }

    impl Fixture {
        fn new() -> Self {
            let storage = MemoryStore::new();
            Self {
                api: SkillSwapApi::new(BASE, MockHttpClient::new(), storage.clone()),
                session: RefCell::new(SessionStore::new(storage.clone())),
                storage,
            }
        }

        fn flows(&self) -> AuthFlows<'_, MockHttpClient, MemoryStore, RefCell<SessionStore<MemoryStore>>> {
            AuthFlows::new(&self.api, &self.session)
        }

        fn mock(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
            self.api
                .client()
                .mock(method, &format!("{BASE}{path}"), status, body);
        }
    }

    #[tokio::test]
    async fn test_login_sets_session() {
        let fx = Fixture::new();
        fx.mock(HttpMethod::Post, "/login", 200, "jwt-1");

        let next = fx.flows().login("a@b.com", "pw").await;

        assert_eq!(next, Ok(AppRoute::ProfileCompletion));
        assert_eq!(fx.storage.get(TOKEN_KEY).as_deref(), Some("jwt-1"));
        assert_eq!(fx.storage.get(EMAIL_KEY).as_deref(), Some("a@b.com"));
        let session = fx.session.borrow();
        assert_eq!(session.current().map(|i| i.display_name.as_str()), Some("Unknown"));
    }

    #[tokio::test]
    async fn test_login_failure_message() {
        let fx = Fixture::new();
        fx.mock(HttpMethod::Post, "/login", 400, "Invalid credentials");

        let next = fx.flows().login("a@b.com", "bad").await;
        assert_eq!(next, Err(LOGIN_FAILED.to_string()));
        assert!(fx.storage.get(TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn test_register_rate_limited() {
        let fx = Fixture::new();
        fx.mock(
            HttpMethod::Post,
            "/register",
            400,
            "Please wait 30 seconds before requesting a new OTP",
        );

        let outcome = fx
            .flows()
            .register("a@b.com", "pw", &Cooldown::default())
            .await;
        let RegisterOutcome::CoolingDown(cooldown) = outcome else {
            panic!("expected cooldown, got {outcome:?}");
        };
        assert_eq!(cooldown.remaining(), 30);

        // 倒计时期间不再发出请求
        let again = fx.flows().register("a@b.com", "pw", &cooldown).await;
        assert_eq!(again, RegisterOutcome::Ignored);
        assert_eq!(fx.api.client().count(&format!("{BASE}/register")), 1);
    }

    #[tokio::test]
    async fn test_register_messages() {
        let fx = Fixture::new();
        fx.mock(HttpMethod::Post, "/register", 400, "Email already exists");
        let outcome = fx
            .flows()
            .register("a@b.com", "pw", &Cooldown::default())
            .await;
        assert_eq!(outcome, RegisterOutcome::Failed(ACCOUNT_EXISTS.to_string()));

        fx.mock(HttpMethod::Post, "/register", 400, "Invalid email format");
        let outcome = fx
            .flows()
            .register("a@b.com", "pw", &Cooldown::default())
            .await;
        assert_eq!(outcome, RegisterOutcome::Failed("Invalid email format".to_string()));
    }

    #[tokio::test]
    async fn test_register_then_verify_with_remembered_email() {
        let fx = Fixture::new();
        fx.mock(HttpMethod::Post, "/register", 200, "OTP sent to your email");
        fx.mock(HttpMethod::Post, "/otp/verify", 200, "Email verified");

        let outcome = fx
            .flows()
            .register("new@b.com", "pw", &Cooldown::default())
            .await;
        assert_eq!(outcome, RegisterOutcome::Submitted(AppRoute::EmailVerify));

        let next = fx.flows().verify_otp("", " 123456 ").await;
        assert_eq!(next, Ok(AppRoute::Login));

        let reqs = fx.api.client().requests.borrow();
        let body: serde_json::Value = serde_json::from_str(reqs[1].3.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"email": "new@b.com", "otp": "123456"}));
    }

    #[tokio::test]
    async fn test_verify_failure() {
        let fx = Fixture::new();
        fx.mock(HttpMethod::Post, "/otp/verify", 400, "Invalid OTP");
        let next = fx.flows().verify_otp("a@b.com", "000000").await;
        assert_eq!(next, Err(INVALID_OTP.to_string()));
    }

    #[tokio::test]
    async fn test_oauth_success() {
        let fx = Fixture::new();
        fx.api.client().mock_response(
            &format!("{BASE}/api/auth/google"),
            200,
            json!({"token": "g-jwt", "email": "g@mail.com", "username": "Grace"}),
        );

        let next = fx
            .flows()
            .oauth(OAuthResult::Success {
                credential: "id-token".into(),
            })
            .await;

        assert_eq!(next, Ok(AppRoute::ProfileCompletion));
        assert_eq!(fx.storage.get(TOKEN_KEY).as_deref(), Some("g-jwt"));
        assert_eq!(
            fx.session.borrow().current(),
            Some(&Identity::new("g@mail.com", "Grace"))
        );
    }

    #[tokio::test]
    async fn test_oauth_failures() {
        let fx = Fixture::new();
        let next = fx
            .flows()
            .oauth(OAuthResult::Failure {
                reason: "popup_closed".into(),
            })
            .await;
        assert_eq!(next, Err(GOOGLE_SIGN_IN_FAILED.to_string()));
        assert!(fx.api.client().requests.borrow().is_empty());

        fx.api.client().mock_response(
            &format!("{BASE}/api/auth/google"),
            401,
            json!({"error": "Invalid Google token"}),
        );
        let success = OAuthResult::Success {
            credential: "bad".into(),
        };
        let next = fx.flows().oauth(success.clone()).await;
        assert_eq!(next, Err("Invalid Google token".to_string()));

        fx.api.client().mock_response(&format!("{BASE}/api/auth/google"), 500, json!({}));
        let next = fx.flows().oauth(success.clone()).await;
        assert_eq!(next, Err(GOOGLE_AUTH_FAILED.to_string()));

        fx.api.client().go_offline();
        let next = fx.flows().oauth(success).await;
        assert_eq!(next, Err(BACKEND_UNREACHABLE.to_string()));
    }

    #[tokio::test]
    async fn test_sign_out_clears_everything() {
        let fx = Fixture::new();
        fx.session
            .borrow_mut()
            .set("t1", Identity::new("a@b.com", "Ada"));

        assert_eq!(fx.flows().sign_out(), AppRoute::Login);
        assert!(fx.storage.is_empty());
        assert!(fx.session.borrow().load().is_none());
    }
}
