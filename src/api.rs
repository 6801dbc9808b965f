//! SkillSwap 后端客户端
//!
//! 所有请求都从持久化存储读取 token 并附加 Bearer 头。

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use skillswap_shared::protocol::*;
use skillswap_shared::{
    BEARER_PREFIX, ChatMessage, Friend, FriendRequest, GoogleAuthResponse, HEADER_AUTHORIZATION,
    MatchList, ProfileDraft, ProfileUpdate, UnreadCount, UnreadPerFriend, UserProfileSummary,
    UserStatus,
};

use crate::error::{ApiError, ApiResult};
use crate::request::{HttpClient, HttpRequest};
use crate::storage::{KeyValueStore, TOKEN_KEY};

#[derive(Clone, Debug)]
pub struct SkillSwapApi<C: HttpClient, S: KeyValueStore> {
    base_url: String,
    client: C,
    storage: S,
}

impl<C: HttpClient, S: KeyValueStore> SkillSwapApi<C, S> {
    pub fn new(base_url: &str, client: C, storage: S) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client,
            storage,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送一个类型化请求
    ///
    /// 非 2xx 响应转换为 [`ApiError`]；网络错误原样向上传递。
    pub async fn call<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        let path = req.path();
        let mut http = HttpRequest::new(&self.url(&path), R::METHOD);

        if let Some(token) = self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty()) {
            http = http.with_header(HEADER_AUTHORIZATION, &format!("{BEARER_PREFIX}{token}"));
        }

        if R::HAS_BODY {
            let body = serde_json::to_string(req).map_err(|e| ApiError::decode(e.to_string()))?;
            http = http
                .with_header("Content-Type", "application/json")
                .with_body(body);
        }

        let resp = self.client.send(http).await.inspect_err(|e| {
            warn!("{} {} failed: {}", R::METHOD.as_str(), path, e);
        })?;

        if !resp.is_success() {
            let err = ApiError::from_response(resp.status, &resp.body);
            debug!(
                "{} {} -> {} [{}] {}",
                R::METHOD.as_str(),
                path,
                resp.status,
                err.error_code(),
                err.message
            );
            return Err(err);
        }

        decode_body(&resp.body)
    }

    // --- 认证 ---

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        self.call(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn register(&self, email: &str, password: &str) -> ApiResult<String> {
        self.call(&RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> ApiResult<String> {
        self.call(&VerifyOtpRequest {
            email: email.to_string(),
            otp: otp.to_string(),
        })
        .await
    }

    pub async fn google_auth(&self, credential: &str) -> ApiResult<GoogleAuthResponse> {
        self.call(&GoogleAuthRequest {
            token: credential.to_string(),
        })
        .await
    }

    // --- 用户与资料 ---

    pub async fn user_status(&self) -> ApiResult<UserStatus> {
        self.call(&UserStatusRequest).await
    }

    pub async fn my_profile(&self) -> ApiResult<UserProfileSummary> {
        self.call(&MyProfileRequest).await
    }

    pub async fn create_profile(&self, draft: &ProfileDraft) -> ApiResult<String> {
        self.call(draft).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<String> {
        self.call(update).await
    }

    pub async fn profile(&self, id: &str) -> ApiResult<UserProfileSummary> {
        self.call(&ProfileByIdRequest { id: id.to_string() }).await
    }

    pub async fn matches(&self) -> ApiResult<MatchList> {
        self.call(&MatchesRequest).await
    }

    // --- 好友 ---

    pub async fn friend_requests(&self) -> ApiResult<Vec<FriendRequest>> {
        self.call(&FriendRequestsRequest).await
    }

    pub async fn unread_friend_request_count(&self) -> ApiResult<UnreadCount> {
        self.call(&UnreadFriendRequestCountRequest).await
    }

    pub async fn mark_friend_requests_read(&self) -> ApiResult<String> {
        self.call(&MarkFriendRequestsReadRequest).await
    }

    pub async fn send_friend_request(&self, receiver_email: &str) -> ApiResult<String> {
        self.call(&SendFriendRequest {
            receiver_email: receiver_email.to_string(),
        })
        .await
    }

    pub async fn respond_friend_request(
        &self,
        request_id: &str,
        decision: FriendRequestDecision,
    ) -> ApiResult<String> {
        self.call(&RespondFriendRequest::new(request_id, decision))
            .await
    }

    pub async fn friends(&self) -> ApiResult<Vec<Friend>> {
        self.call(&FriendsRequest).await
    }

    // --- 消息 ---

    pub async fn messages(&self, friend_email: &str) -> ApiResult<Vec<ChatMessage>> {
        self.call(&MessagesRequest {
            friend_email: friend_email.to_string(),
        })
        .await
    }

    pub async fn send_message(&self, receiver_email: &str, content: &str) -> ApiResult<String> {
        self.call(&SendMessageRequest {
            receiver_email: receiver_email.to_string(),
            content: content.to_string(),
        })
        .await
    }

    pub async fn mark_messages_read(&self, friend_email: &str) -> ApiResult<String> {
        self.call(&MarkMessagesReadRequest {
            friend_email: friend_email.to_string(),
        })
        .await
    }

    pub async fn unread_message_count(&self) -> ApiResult<UnreadCount> {
        self.call(&UnreadMessageCountRequest).await
    }

    pub async fn unread_counts_per_friend(&self) -> ApiResult<UnreadPerFriend> {
        self.call(&UnreadCountsPerFriendRequest).await
    }
}

/// 解析成功响应体
///
/// 后端部分端点返回纯文本（token、状态、提示消息），
/// JSON 解析失败时再按字符串解释一次。
fn decode_body<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(err) => serde_json::from_value(Value::String(body.trim().to_string()))
            .map_err(|_| ApiError::decode(err.to_string())),
    }
}
