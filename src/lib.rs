//! SkillSwap 客户端核心
//!
//! 与渲染无关的会话、路由守卫、轮询加载器以及各页面的状态与流程。
//! 浏览器端 (`frontend/`) 只负责把这些状态接到 DOM 上。

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod countdown;
pub mod error;
pub mod guard;
pub mod home;
pub mod navigate;
pub mod poll;
pub mod profile;
pub mod request;
pub mod route;
pub mod session;
pub mod storage;

pub use api::SkillSwapApi;
pub use config::ClientConfig;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use guard::{GuardAction, GuardOutcome, RouteGuard};
pub use navigate::{Navigator, Ticket};
pub use poll::{PollHandle, PollingLoader};
pub use request::{HttpClient, HttpRequest, HttpResponse};
pub use route::AppRoute;
pub use session::{Session, SessionAccess, SessionStore};
pub use storage::KeyValueStore;
