//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑，不依赖 DOM。定义应用的所有路由及其属性。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    Register,
    /// OTP 验证码输入
    EmailVerify,
    /// 主页：匹配、通知、好友
    Home,
    /// 新用户完善资料
    ProfileCompletion,
    /// 查看其他用户的资料
    ProfileView(String),
    EditProfile,
    /// 与某位好友聊天，参数为好友邮箱（已解码）
    Chat(String),
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举，忽略查询串、片段和末尾斜杠
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] | [""] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["email"] => Self::EmailVerify,
            ["home"] => Self::Home,
            ["profile"] => Self::ProfileCompletion,
            ["profile", id] if !id.is_empty() => Self::ProfileView(decode(id)),
            ["editprofile"] => Self::EditProfile,
            ["chat", email] if !email.is_empty() => Self::Chat(decode(email)),
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::EmailVerify => "/email".to_string(),
            Self::Home => "/home".to_string(),
            Self::ProfileCompletion => "/profile".to_string(),
            Self::ProfileView(id) => format!("/profile/{}", urlencoding::encode(id)),
            Self::EditProfile => "/editprofile".to_string(),
            Self::Chat(email) => format!("/chat/{}", urlencoding::encode(email)),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 未登录也可访问的路由
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login | Self::Register | Self::EmailVerify)
    }

    /// 认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path(""), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/email?x=1"), AppRoute::EmailVerify);
        assert_eq!(AppRoute::from_path("/profile/"), AppRoute::ProfileCompletion);
        assert_eq!(
            AppRoute::from_path("/profile/42"),
            AppRoute::ProfileView("42".into())
        );
        assert_eq!(
            AppRoute::from_path("/chat/bob%40x.com"),
            AppRoute::Chat("bob@x.com".into())
        );
        assert_eq!(AppRoute::from_path("/chat"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/profile/1/extra"), AppRoute::NotFound);
    }

    #[test]
    fn test_chat_path_is_stable() {
        let route = AppRoute::Chat("bob+1@x.com".into());
        assert_eq!(AppRoute::from_path(&route.to_path()), route);
    }

    #[test]
    fn test_public_routes() {
        assert!(AppRoute::Login.is_public());
        assert!(AppRoute::EmailVerify.is_public());
        assert!(!AppRoute::Home.is_public());
        assert!(!AppRoute::NotFound.is_public());
    }
}
