use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod date;
pub mod protocol;
mod serde_helper;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

/// 后端未返回用户名时使用的占位显示名
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 账号状态：`GET /api/user/status` 返回 `"new"` 或 `"existing"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// 尚未完成资料填写
    New,
    /// 资料已存在
    Existing,
}

/// 当前登录用户的身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub display_name: String,
}

impl Identity {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
        }
    }

    /// 头像首字母
    pub fn initial(&self) -> String {
        initial_of(&self.display_name)
    }
}

/// 取名字首字母（大写），空名字返回空串
pub fn initial_of(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}

/// 用户资料摘要
///
/// 每次进入相关页面时重新拉取，不跨页面缓存。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "username", default = "unknown_name", deserialize_with = "serde_helper::name_or_unknown")]
    pub display_name: String,
    #[serde(default, deserialize_with = "serde_helper::opt_string")]
    pub bio: String,
    #[serde(default, deserialize_with = "serde_helper::skill_names")]
    pub skills_offered: Vec<String>,
    #[serde(default, deserialize_with = "serde_helper::skill_names")]
    pub skills_wanted: Vec<String>,
}

impl UserProfileSummary {
    pub fn identity(&self) -> Identity {
        Identity::new(self.email.clone(), self.display_name.clone())
    }
}

fn unknown_name() -> String {
    UNKNOWN_DISPLAY_NAME.to_string()
}

/// `GET /api/users/matches` 的响应包装
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatchList {
    #[serde(default)]
    pub matches: Vec<UserProfileSummary>,
}

/// 待处理的好友请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub request_id: String,
    #[serde(rename = "senderUsername", default = "unknown_name", deserialize_with = "serde_helper::name_or_unknown")]
    pub sender_display_name: String,
    #[serde(default)]
    pub sender_email: String,
    #[serde(rename = "isRead", default)]
    pub read: bool,
}

/// 好友（后端好友列表的只读投影）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(rename = "username", default = "unknown_name", deserialize_with = "serde_helper::name_or_unknown")]
    pub display_name: String,
    #[serde(default, deserialize_with = "serde_helper::skill_names")]
    pub skills_offered: Vec<String>,
    #[serde(default, deserialize_with = "serde_helper::skill_names")]
    pub skills_wanted: Vec<String>,
    #[serde(default, deserialize_with = "serde_helper::opt_string")]
    pub bio: String,
}

/// 聊天消息，创建后不可变；顺序以后端返回顺序为准
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender_email: String,
    pub content: String,
    /// 后端以 `LocalDateTime` 字符串形式返回（UTC，无时区后缀）
    #[serde(rename = "timestamp")]
    pub timestamp_utc: String,
    #[serde(rename = "isRead", default)]
    pub read: bool,
}

impl ChatMessage {
    pub fn timestamp(&self) -> Option<date::Timestamp> {
        date::Timestamp::parse(&self.timestamp_utc)
    }
}

/// `{ "count": n }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnreadCount {
    #[serde(default)]
    pub count: u32,
}

/// 单个好友的未读消息摘要
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendChatSummary {
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_timestamp: Option<String>,
    #[serde(default = "default_true")]
    pub last_message_is_read: bool,
}

fn default_true() -> bool {
    true
}

/// 好友邮箱 -> 未读摘要
pub type UnreadPerFriend = BTreeMap<String, FriendChatSummary>;

/// `POST /api/auth/google` 的成功响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleAuthResponse {
    pub token: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl GoogleAuthResponse {
    pub fn identity(&self) -> Identity {
        Identity::new(
            self.email.clone(),
            self.username
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(unknown_name),
        )
    }
}

// =========================================================
// 资料表单载荷 (Profile Payloads)
// =========================================================

/// 提供的技能（完整资料）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OfferedSkill {
    pub name: String,
    pub level: String,
    pub description: String,
    pub availability: String,
}

/// 想学的技能（完整资料）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WantedSkill {
    pub name: String,
    pub level: String,
}

/// 仅含名称的技能（编辑资料）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NamedSkill {
    pub name: String,
}

/// 新用户首次完善资料：`POST /api/profile`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub full_name: String,
    pub profile_picture: String,
    pub location: String,
    pub age: u32,
    pub skills_offered: Vec<OfferedSkill>,
    pub skills_wanted: Vec<WantedSkill>,
    pub bio: String,
    pub known_languages: Vec<String>,
    pub rating: f64,
}

/// 编辑资料：`PUT /api/profile`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub full_name: String,
    pub bio: String,
    pub skills_offered: Vec<NamedSkill>,
    pub skills_wanted: Vec<NamedSkill>,
}
