use std::fmt;

use serde::{Deserialize, Serialize};

// =========================================================
// 错误种类枚举
// =========================================================

/// 错误种类
/// 决定调用方的处理方式：清除会话、倒计时、原样展示或内联提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiErrorKind {
    /// 401/403: token 无效或已过期，会话需要销毁
    Unauthorized,
    /// 注册 OTP 冷却中，`seconds` 为需要等待的秒数
    RateLimited { seconds: u32 },
    /// 其他 4xx: 业务校验失败（重复账号、重复好友请求等）
    Rejected,
    /// 404: 资源未找到
    NotFound,
    /// 5xx
    Server,
    /// 请求未能送达（连接失败、CORS 等）
    Network,
    /// 成功响应但响应体无法解析
    Decode,
}

impl ApiErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Unauthorized => "UNAUTHORIZED",
            ApiErrorKind::RateLimited { .. } => "RATE_LIMITED",
            ApiErrorKind::Rejected => "REJECTED",
            ApiErrorKind::NotFound => "RESOURCE_NOT_FOUND",
            ApiErrorKind::Server => "SERVER_ERROR",
            ApiErrorKind::Network => "NETWORK_ERROR",
            ApiErrorKind::Decode => "DECODE_ERROR",
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 后端调用失败
///
/// `message` 是后端返回的原始文本，展示时不做改写。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    /// HTTP 状态码；请求未送达时为 `None`
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    // --- Convenience constructors ---

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthorized, message)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// 根据非 2xx 响应构造错误
    ///
    /// 响应体可能是纯文本、JSON 字符串或 `{"error": "..."}`。
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_message(body);
        let kind = if let Some(seconds) = parse_wait_seconds(&message) {
            ApiErrorKind::RateLimited { seconds }
        } else {
            match status {
                401 | 403 => ApiErrorKind::Unauthorized,
                404 => ApiErrorKind::NotFound,
                400..=499 => ApiErrorKind::Rejected,
                _ => ApiErrorKind::Server,
            }
        };
        Self::new(kind, message).with_status(status)
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// 会话已失效，调用方应清除会话并回到登录页
    pub fn is_session_invalid(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    /// 下一次轮询可能恢复的错误，只做内联提示
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::Network | ApiErrorKind::Server | ApiErrorKind::Decode
        )
    }

    /// 优先使用后端消息，为空时使用给定的兜底文案
    pub fn message_or(&self, fallback: &str) -> String {
        if self.message.trim().is_empty() {
            fallback.to_string()
        } else {
            self.message.clone()
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// =========================================================
// 消息提取
// =========================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Text(String),
    Object { error: String },
    Message { message: String },
}

fn extract_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Text(text)) => text,
        Ok(ErrorBody::Object { error }) => error,
        Ok(ErrorBody::Message { message }) => message,
        // 其他 JSON 结构里没有可展示的消息
        Err(_) if serde_json::from_str::<serde_json::Value>(body).is_ok() => String::new(),
        Err(_) => body.trim().to_string(),
    }
}

/// 从 "Please wait N seconds ..." 中提取 N（消息中的第一个整数）
pub fn parse_wait_seconds(message: &str) -> Option<u32> {
    if !(message.contains("Please wait") && message.contains("seconds")) {
        return None;
    }
    let digits: String = message
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
