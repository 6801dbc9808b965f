//! 一对一聊天
//!
//! 一次轮询依次执行：自己的资料 -> 好友列表 -> 定位好友 -> 消息 -> 标记已读。
//! 好友不存在时不会请求消息。

use std::fmt;
use std::ops::ControlFlow;

use log::{debug, warn};
use skillswap_shared::{ChatMessage, Friend, UserProfileSummary};

use crate::api::SkillSwapApi;
use crate::error::ApiError;
use crate::request::HttpClient;
use crate::storage::KeyValueStore;

pub const FRIEND_NOT_FOUND: &str = "Friend not found";
const SEND_FAILED: &str = "Failed to send message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    FriendNotFound,
    Api(ApiError),
}

impl ChatError {
    /// 终止性错误：停止轮询
    pub fn is_terminal(&self) -> bool {
        match self {
            ChatError::FriendNotFound => true,
            ChatError::Api(err) => err.is_session_invalid(),
        }
    }
}

impl From<ApiError> for ChatError {
    fn from(err: ApiError) -> Self {
        ChatError::Api(err)
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::FriendNotFound => f.write_str(FRIEND_NOT_FOUND),
            ChatError::Api(err) => f.write_str(&err.message_or(err.error_code())),
        }
    }
}

impl std::error::Error for ChatError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSnapshot {
    pub me: UserProfileSummary,
    pub friend: Friend,
    /// 后端返回顺序
    pub messages: Vec<ChatMessage>,
}

pub async fn fetch_chat<C: HttpClient, S: KeyValueStore>(
    api: &SkillSwapApi<C, S>,
    friend_email: &str,
) -> Result<ChatSnapshot, ChatError> {
    let me = api.my_profile().await?;
    let friend = api
        .friends()
        .await?
        .into_iter()
        .find(|f| f.email == friend_email)
        .ok_or(ChatError::FriendNotFound)?;
    let messages = api.messages(friend_email).await?;

    // 已读标记失败不影响本次展示
    if let Err(err) = api.mark_messages_read(friend_email).await {
        warn!("mark-read for {} failed: {}", friend_email, err);
    }

    Ok(ChatSnapshot {
        me,
        friend,
        messages,
    })
}

// =========================================================
// 视图状态
// =========================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatView {
    pub snapshot: Option<ChatSnapshot>,
    pub error: Option<String>,
    pub loading: bool,
    /// 轮询已因终止性错误停止
    pub stopped: bool,
    pub session_invalid: bool,
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, result: Result<ChatSnapshot, ChatError>) -> ControlFlow<()> {
        self.loading = false;
        match result {
            Ok(snapshot) => {
                debug!("chat refreshed: {} messages", snapshot.messages.len());
                self.snapshot = Some(snapshot);
                self.error = None;
                ControlFlow::Continue(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                if !err.is_terminal() {
                    return ControlFlow::Continue(());
                }
                warn!("chat stopped: {}", err);
                self.stopped = true;
                self.session_invalid = matches!(&err, ChatError::Api(e) if e.is_session_invalid());
                ControlFlow::Break(())
            }
        }
    }

    pub fn is_own(&self, message: &ChatMessage) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|s| s.me.email == message.sender_email)
    }

    /// 消息发送者的显示名
    pub fn sender_name<'a>(&'a self, message: &'a ChatMessage) -> &'a str {
        match &self.snapshot {
            Some(s) if s.me.email == message.sender_email => &s.me.display_name,
            Some(s) => &s.friend.display_name,
            None => &message.sender_email,
        }
    }
}

// =========================================================
// 发送消息
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 内容为空，未发出请求
    Dropped,
    Sent,
    Failed(ApiError),
}

pub async fn submit_message<C: HttpClient, S: KeyValueStore>(
    api: &SkillSwapApi<C, S>,
    friend_email: &str,
    draft: &str,
) -> SubmitOutcome {
    let content = draft.trim();
    if content.is_empty() {
        return SubmitOutcome::Dropped;
    }
    match api.send_message(friend_email, content).await {
        Ok(_) => SubmitOutcome::Sent,
        Err(err) => SubmitOutcome::Failed(err),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposerState {
    pub input: String,
    pub error: Option<String>,
}

impl ComposerState {
    /// 写回发送结果，返回是否需要立即刷新消息列表
    pub fn apply(&mut self, outcome: SubmitOutcome) -> bool {
        match outcome {
            SubmitOutcome::Dropped => false,
            SubmitOutcome::Sent => {
                self.input.clear();
                self.error = None;
                true
            }
            SubmitOutcome::Failed(err) => {
                self.error = Some(err.message_or(SEND_FAILED));
                false
            }
        }
    }
}
