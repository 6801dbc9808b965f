//! Google Identity Services 绑定
//!
//! 依赖页面已加载 `https://accounts.google.com/gsi/client`。
//! 提供方的回调被统一转换为 [`OAuthResult`]。

use js_sys::{Object, Reflect};
use skillswap::auth::OAuthResult;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["google", "accounts", "id"], js_name = initialize)]
    fn gis_initialize(config: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["google", "accounts", "id"], js_name = renderButton)]
    fn gis_render_button(parent: &web_sys::HtmlElement, options: &JsValue) -> Result<(), JsValue>;
}

fn object(pairs: &[(&str, &JsValue)]) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    for (key, value) in pairs {
        Reflect::set(&obj, &JsValue::from_str(key), value)?;
    }
    Ok(obj.into())
}

fn to_result(response: JsValue) -> OAuthResult {
    match Reflect::get(&response, &JsValue::from_str("credential"))
        .ok()
        .and_then(|v| v.as_string())
    {
        Some(credential) if !credential.is_empty() => OAuthResult::Success { credential },
        _ => OAuthResult::Failure {
            reason: "missing credential".to_string(),
        },
    }
}

/// 在 `parent` 中渲染登录按钮
///
/// 脚本未加载时返回错误，调用方按登录失败处理。
pub fn render_sign_in_button<F>(client_id: &str, parent: &web_sys::HtmlElement, on_result: F) -> Result<(), String>
where
    F: Fn(OAuthResult) + 'static,
{
    let callback = Closure::<dyn Fn(JsValue)>::new(move |response: JsValue| on_result(to_result(response)));

    let config = object(&[
        ("client_id", &JsValue::from_str(client_id)),
        ("callback", callback.as_ref()),
    ])
    .map_err(|e| format!("{:?}", e))?;
    gis_initialize(&config).map_err(|e| format!("{:?}", e))?;

    let options = object(&[
        ("theme", &JsValue::from_str("outline")),
        ("size", &JsValue::from_str("large")),
        ("width", &JsValue::from_f64(320.0)),
    ])
    .map_err(|e| format!("{:?}", e))?;
    gis_render_button(parent, &options).map_err(|e| format!("{:?}", e))?;

    // 提供方在页面整个生命周期内都可能回调
    callback.forget();
    Ok(())
}
