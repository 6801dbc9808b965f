//! 轮询加载器与组件生命周期的绑定

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use futures::Future;
use leptos::prelude::*;
use leptos::task::spawn_local;
use skillswap::{PollHandle, PollingLoader};

/// 在当前组件内启动轮询，组件卸载时自动停用
///
/// 返回的句柄可用于发起计划外的刷新。
pub fn use_polling<F, Fut, T, E, A>(period: Duration, fetch: F, apply: A) -> Arc<PollHandle>
where
    F: FnMut() -> Fut + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
    A: FnMut(Result<T, E>) -> ControlFlow<()> + 'static,
    T: 'static,
    E: 'static,
{
    let sleep = |d: Duration| gloo_timers::future::sleep(d);
    let (handle, task) = PollingLoader::new(period).activate(sleep, fetch, apply);
    spawn_local(task);

    let handle = Arc::new(handle);
    let on_unmount = handle.clone();
    on_cleanup(move || on_unmount.deactivate());
    handle
}
