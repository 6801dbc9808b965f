use std::collections::HashMap;

use skillswap_shared::protocol::HttpMethod;

use crate::error::ApiError;

#[cfg(test)]
use std::cell::RefCell;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 客户端特性
/// (?Send) 是因为浏览器 fetch 的 Future 不是 Send 的
///
/// 只有请求未能送达时才返回 `Err`；任何状态码都以 `Ok` 返回。
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError>;
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
pub struct MockHttpClient {
    // (Method URL, (Status, Response Body))
    responses: RefCell<HashMap<String, (u16, String)>>,
    // 记录发出的请求 (URL, Method, Headers, Body)
    pub requests: RefCell<Vec<(String, String, HashMap<String, String>, Option<String>)>>,
    offline: std::cell::Cell<bool>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            offline: std::cell::Cell::new(false),
        }
    }

    fn key(method: HttpMethod, url: &str) -> String {
        format!("{} {}", method.as_str(), url)
    }

    /// 为任意方法注册 JSON 响应
    pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
        for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete] {
            self.mock(method, url, status, &body.to_string());
        }
    }

    /// 为指定方法注册原始文本响应
    pub fn mock(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
        self.responses
            .borrow_mut()
            .insert(Self::key(method, url), (status, body.to_string()));
    }

    /// 之后的所有请求都以网络错误失败
    pub fn go_offline(&self) {
        self.offline.set(true);
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.0.clone()).collect()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests.borrow().iter().filter(|r| r.0 == url).count()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push((
            req.url.clone(),
            req.method.as_str().to_string(),
            req.headers.clone(),
            req.body.clone(),
        ));

        if self.offline.get() {
            return Err(ApiError::network("Failed to fetch"));
        }

        let responses = self.responses.borrow();
        if let Some((status, body)) = responses.get(&Self::key(req.method, &req.url)) {
            Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            })
        } else {
            Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            })
        }
    }
}
