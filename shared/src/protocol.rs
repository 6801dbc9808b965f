//! 后端 REST 接口目录
//!
//! 每个请求类型描述一个端点：方法、路径、请求体和响应类型。
//! 路径必须与后端保持一致。

use crate::{
    ChatMessage, Friend, FriendRequest, GoogleAuthResponse, MatchList, ProfileDraft,
    ProfileUpdate, UnreadCount, UnreadPerFriend, UserProfileSummary, UserStatus,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::borrow::Cow;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Whether the request itself is serialized as a JSON body.
    const HAS_BODY: bool = false;
    /// The URL path, with path parameters already encoded.
    fn path(&self) -> Cow<'static, str>;
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

// =========================================================
// 认证 (Auth)
// =========================================================

/// 邮箱密码登录，成功时响应体就是 token 字符串
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = true;
    fn path(&self) -> Cow<'static, str> {
        "/login".into()
    }
}

/// 注册并触发 OTP 邮件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for RegisterRequest {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = true;
    fn path(&self) -> Cow<'static, str> {
        "/register".into()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

impl ApiRequest for VerifyOtpRequest {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = true;
    fn path(&self) -> Cow<'static, str> {
        "/otp/verify".into()
    }
}

/// 用 OAuth 凭据换取本站 token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleAuthRequest {
    pub token: String,
}

impl ApiRequest for GoogleAuthRequest {
    type Response = GoogleAuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = true;
    fn path(&self) -> Cow<'static, str> {
        "/api/auth/google".into()
    }
}

// =========================================================
// 用户与资料 (User & Profile)
// =========================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStatusRequest;

impl ApiRequest for UserStatusRequest {
    type Response = UserStatus;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> Cow<'static, str> {
        "/api/user/status".into()
    }
}

/// 当前用户自己的资料
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MyProfileRequest;

impl ApiRequest for MyProfileRequest {
    type Response = UserProfileSummary;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> Cow<'static, str> {
        "/api/user/profile".into()
    }
}

impl ApiRequest for ProfileDraft {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = true;
    fn path(&self) -> Cow<'static, str> {
        "/api/profile".into()
    }
}

impl ApiRequest for ProfileUpdate {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Put;
    const HAS_BODY: bool = true;
    fn path(&self) -> Cow<'static, str> {
        "/api/profile".into()
    }
}

/// 查看其他用户的资料
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileByIdRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for ProfileByIdRequest {
    type Response = UserProfileSummary;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> Cow<'static, str> {
        format!("/api/profile/{}", segment(&self.id)).into()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchesRequest;

impl ApiRequest for MatchesRequest {
    type Response = MatchList;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> Cow<'static, str> {
        "/api/users/matches".into()
    }
}

// =========================================================
// 好友 (Friends)
// =========================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FriendRequestsRequest;

impl ApiRequest for FriendRequestsRequest {
    type Response = Vec<FriendRequest>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> Cow<'static, str> {
        "/api/friend/requests".into()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnreadFriendRequestCountRequest;

impl ApiRequest for UnreadFriendRequestCountRequest {
    type Response = UnreadCount;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> Cow<'static, str> {
        "/api/friend/requests/unread-count".into()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkFriendRequestsReadRequest;

impl ApiRequest for MarkFriendRequestsReadRequest {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> Cow<'static, str> {
        "/api/friend/requests/mark-read".into()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequest {
    pub receiver_email: String,
}

impl ApiRequest for SendFriendRequest {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = true;
    fn path(&self) -> Cow<'static, str> {
        "/api/friend/request".into()
    }
}

/// 对好友请求的处理：接受或拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FriendRequestDecision {
    Accept,
    Reject,
}

impl FriendRequestDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendRequestDecision::Accept => "accept",
            FriendRequestDecision::Reject => "reject",
        }
    }
}

/// 路径参数之外没有请求体
#[derive(Debug, Clone, Serialize)]
pub struct RespondFriendRequest {
    #[serde(skip)]
    pub request_id: String,
    #[serde(skip)]
    pub decision: FriendRequestDecision,
}

impl RespondFriendRequest {
    pub fn new(request_id: impl Into<String>, decision: FriendRequestDecision) -> Self {
        Self {
            request_id: request_id.into(),
            decision,
        }
    }
}

impl ApiRequest for RespondFriendRequest {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> Cow<'static, str> {
        format!(
            "/api/friend/request/{}/{}",
            segment(&self.request_id),
            self.decision.as_str()
        )
        .into()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FriendsRequest;

impl ApiRequest for FriendsRequest {
    type Response = Vec<Friend>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> Cow<'static, str> {
        "/api/friend/friends".into()
    }
}

// =========================================================
// 消息 (Messages)
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    #[serde(skip)]
    pub friend_email: String,
}

impl ApiRequest for MessagesRequest {
    type Response = Vec<ChatMessage>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> Cow<'static, str> {
        format!("/api/messages/{}", segment(&self.friend_email)).into()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_email: String,
    pub content: String,
}

impl ApiRequest for SendMessageRequest {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Post;
    const HAS_BODY: bool = true;
    fn path(&self) -> Cow<'static, str> {
        "/api/message".into()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkMessagesReadRequest {
    #[serde(skip)]
    pub friend_email: String,
}

impl ApiRequest for MarkMessagesReadRequest {
    type Response = String;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> Cow<'static, str> {
        format!("/api/messages/mark-read/{}", segment(&self.friend_email)).into()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnreadMessageCountRequest;

impl ApiRequest for UnreadMessageCountRequest {
    type Response = UnreadCount;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> Cow<'static, str> {
        "/api/messages/unread-count".into()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnreadCountsPerFriendRequest;

impl ApiRequest for UnreadCountsPerFriendRequest {
    type Response = UnreadPerFriend;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> Cow<'static, str> {
        "/api/messages/unread-counts-per-friend".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_parameters_are_encoded() {
        let req = MessagesRequest {
            friend_email: "a b@c.com".to_string(),
        };
        assert_eq!(req.path(), "/api/messages/a%20b%40c.com");

        let req = RespondFriendRequest::new("r-1", FriendRequestDecision::Accept);
        assert_eq!(req.path(), "/api/friend/request/r-1/accept");
    }

    #[test]
    fn test_path_only_requests_serialize_empty() {
        let req = ProfileByIdRequest { id: "42".into() };
        assert_eq!(serde_json::to_string(&req).unwrap(), "{}");
        assert_eq!(req.path(), "/api/profile/42");
    }

    #[test]
    fn test_message_body_is_camel_case() {
        let req = SendMessageRequest {
            receiver_email: "f@x.com".into(),
            content: "hello".into(),
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"receiverEmail":"f@x.com","content":"hello"}"#
        );
    }
}
