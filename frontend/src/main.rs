//! 浏览器入口：`trunk serve` 构建 wasm 后挂载到 `<body>`

use leptos::prelude::*;
use skillswap_frontend::App;

// 单线程 wasm 下使用 lol_alloc 以减小体积
#[cfg(target_arch = "wasm32")]
use lol_alloc::{AssumeSingleThreaded, FreeListAllocator};

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: AssumeSingleThreaded<FreeListAllocator> =
    unsafe { AssumeSingleThreaded::new(FreeListAllocator::new()) };

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
