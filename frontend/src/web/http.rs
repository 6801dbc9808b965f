//! HTTP 传输层
//!
//! 使用 `web_sys::fetch` 实现核心库的 [`HttpClient`]，不做任何重试或超时处理。

use std::collections::HashMap;

use skillswap::{ApiError, HttpClient, HttpRequest, HttpResponse};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

/// 浏览器 fetch 客户端
///
/// 无状态，可随意复制；状态码非 2xx 仍返回 `Ok`，由 API 层分类。
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHttpClient;

fn build_headers(pairs: &HashMap<String, String>) -> Result<Headers, ApiError> {
    let headers =
        Headers::new().map_err(|e| ApiError::network(format!("创建 Headers 失败: {:?}", e)))?;
    for (key, value) in pairs {
        headers
            .set(key, value)
            .map_err(|e| ApiError::network(format!("设置 Header 失败: {:?}", e)))?;
    }
    Ok(headers)
}

async fn read_text(response: &Response) -> Result<String, ApiError> {
    let promise = response
        .text()
        .map_err(|e| ApiError::decode(format!("{:?}", e)))?;
    let text = JsFuture::from(promise)
        .await
        .map_err(|e| ApiError::decode(format!("{:?}", e)))?;
    text.as_string()
        .ok_or_else(|| ApiError::decode("响应体不是字符串"))
}

#[async_trait::async_trait(?Send)]
impl HttpClient for BrowserHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&build_headers(&req.headers)?.into());
        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| ApiError::network(format!("{:?}", e)))?;
        let window = web_sys::window().ok_or_else(|| ApiError::network("无法获取 window 对象"))?;

        // fetch 只在请求未送达时 reject（断网、CORS 等）
        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| ApiError::network(format!("{:?}", e)))?;
        let response: Response = value
            .dyn_into()
            .map_err(|e| ApiError::decode(format!("Response 类型转换失败: {:?}", e)))?;

        Ok(HttpResponse {
            status: response.status(),
            body: read_text(&response).await?,
        })
    }
}
